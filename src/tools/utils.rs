//! 工具函数模块
//!
//! 提供显示用的数值格式化、文件路径处理等通用工具函数。

/// 显示用数值格式化
pub mod display {
    use crate::processing::linear_to_db;

    /// 将线性峰值格式化为 dBFS 字符串（用于表格输出）
    pub fn peak_db_string(value: f64) -> String {
        if value > 0.0 {
            format!("{:.2} dBFS", linear_to_db(value))
        } else {
            "-inf dBFS".to_string()
        }
    }

    /// 秒数格式化为 `mm:ss.mmm`（超过一小时时为 `h:mm:ss.mmm`）
    pub fn format_duration(seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let ms = total_ms % 1000;
        let total_s = total_ms / 1000;
        let (h, m, s) = (total_s / 3600, (total_s / 60) % 60, total_s % 60);
        if h > 0 {
            format!("{h}:{m:02}:{s:02}.{ms:03}")
        } else {
            format!("{m:02}:{s:02}.{ms:03}")
        }
    }
}

/// 文件路径处理工具函数
pub mod path {
    use std::path::Path;

    /// 提取文件名（返回String，用于日志显示）
    #[inline]
    pub fn extract_filename_lossy(path: &Path) -> String {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

// 重新导出为平级函数
pub use display::{format_duration, peak_db_string};
pub use path::extract_filename_lossy;
