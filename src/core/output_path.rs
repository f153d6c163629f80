//! 输出路径选择
//!
//! 从不覆盖已有文件：期望路径被占用时依次尝试 `stem_1.ext` … `stem_9999.ext`。

use crate::error::{AudioError, AudioResult};
use std::fs;
use std::path::{Path, PathBuf};

/// 数字后缀尝试上限
pub const MAX_SUFFIX_ATTEMPTS: u32 = 9999;

/// 返回第一个不存在的候选路径
pub fn next_available_path(path: &Path) -> AudioResult<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..=MAX_SUFFIX_ATTEMPTS)
        .map(|i| parent.join(format!("{stem}_{i}{extension}")))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| AudioError::OutputPathExhausted(path.to_path_buf()))
}

/// 确保输出文件的父目录存在
pub fn ensure_parent_dir(path: &Path) -> AudioResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| AudioError::from(e).in_file(parent))?;
    }
    Ok(())
}
