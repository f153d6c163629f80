//! 文件扫描模块
//!
//! 递归收集目录中的 WAV 文件，并按文件名或修改时间排序。

use super::cli::AppConfig;
use super::constants::WAV_EXTENSION;
use super::utils;
use crate::core::OrderMode;
use crate::{AudioError, AudioResult};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// 扫描得到的一个 WAV 文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavEntry {
    pub path: PathBuf,
    /// 小写文件名，用作排序键
    pub name: String,
    pub modified: SystemTime,
}

impl WavEntry {
    fn from_path(path: PathBuf) -> AudioResult<Self> {
        let modified = path
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| AudioError::from(e).in_file(&path))?;
        Ok(Self {
            name: utils::extract_filename_lossy(&path).to_lowercase(),
            path,
            modified,
        })
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WAV_EXTENSION))
}

/// 递归扫描目录中的 WAV 文件（未排序）
pub fn scan_wav_files(dir_path: &Path) -> AudioResult<Vec<WavEntry>> {
    if !dir_path.exists() {
        return Err(AudioError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("目录不存在: {}", dir_path.display()),
        )));
    }

    if !dir_path.is_dir() {
        return Err(AudioError::InvalidInput(format!(
            "路径不是目录: {}",
            dir_path.display()
        )));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf);
            let err = AudioError::from(std::io::Error::other(e.to_string()));
            match path {
                Some(p) => err.in_file(p),
                None => err,
            }
        })?;

        if entry.file_type().is_file() && is_wav(entry.path()) {
            entries.push(WavEntry::from_path(entry.into_path())?);
        }
    }

    Ok(entries)
}

/// 按指定方式排序（修改时间相同时按文件名）
pub fn sort_entries(entries: &mut [WavEntry], order: OrderMode) {
    match order {
        OrderMode::ByName => entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.path.cmp(&b.path))),
        OrderMode::ByModTime => entries.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
}

/// 扫描并排序，返回合并顺序的路径列表
pub fn collect_inputs(dir_path: &Path, order: OrderMode) -> AudioResult<Vec<WavEntry>> {
    let mut entries = scan_wav_files(dir_path)?;
    sort_entries(&mut entries, order);
    Ok(entries)
}

/// 显示文件扫描结果
pub fn show_scan_results(config: &AppConfig, entries: &[WavEntry]) {
    if config.json {
        return;
    }

    let source = config.merge.source_dir.display();
    if entries.is_empty() {
        println!("⚠️  在目录 {source} 中没有找到 WAV 文件");
        return;
    }

    println!("📁 扫描目录: {source}");
    println!(
        "🎵 找到 {} 个 WAV 文件 (顺序: {})",
        entries.len(),
        config.merge.order
    );

    if config.verbose {
        for (i, entry) in entries.iter().enumerate() {
            let modified: DateTime<Local> = entry.modified.into();
            println!(
                "   {}. {}  [{}]",
                i + 1,
                utils::extract_filename_lossy(&entry.path),
                modified.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    println!();
}
