//! 核心流水线模块
//!
//! 两遍合并：扫描遍统计总长度和峰值，写入遍流式写出。

pub mod config;
pub mod merge_pass;
pub mod output_path;
pub mod pipeline;
pub mod reporter;
pub mod scan_pass;

// 重新导出公共接口
pub use config::{MergeConfig, OrderMode};
pub use merge_pass::{WriteResult, merge, normalization_scale};
pub use output_path::{ensure_parent_dir, next_available_path};
pub use pipeline::{RunReport, run};
pub use reporter::{LogLevel, MergeReporter, Phase, RecordingReporter, SilentReporter};
pub use scan_pass::{RunTotals, scan};
