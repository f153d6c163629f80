//! 工具模块集合
//!
//! 包含CLI、文件扫描、终端输出等工具模块，支持main.rs的流程控制。

pub mod cli;
pub mod console;
pub mod constants;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use cli::{AppConfig, build_command, parse_args, parse_args_from, show_startup_info};
pub use console::{ConsoleReporter, print_summary, summary_table};
pub use scanner::{WavEntry, collect_inputs, scan_wav_files, show_scan_results, sort_entries};
pub use utils::path;
