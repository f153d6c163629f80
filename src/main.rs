//! AcousticMerge - 主程序入口
//!
//! 纯流程控制器：解析参数、收集输入、运行合并流水线、输出汇总。

use acoustic_merge::{
    MergeReporter,
    error::{AudioError, ErrorCategory},
    tools::{self, AppConfig, ConsoleReporter},
};
use std::path::PathBuf;
use std::process;

/// 错误退出码定义
mod exit_codes {
    /// 通用错误（I/O 等）
    pub const GENERAL_ERROR: i32 = 1;
    /// 参数/输入集合错误
    pub const INPUT_ERROR: i32 = 2;
    /// 容器或样本格式错误
    pub const FORMAT_ERROR: i32 = 3;
    /// 输出路径错误
    pub const OUTPUT_ERROR: i32 = 4;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &AudioError) -> &'static str {
    // 优先通过具体错误类型匹配，提供更精确的建议
    match error.root() {
        AudioError::NoInputFiles(_) => {
            "把待合并的 WAV 文件放入 --src 目录（会递归查找） / Put WAV files into the --src directory (searched recursively)"
        }
        AudioError::FormatMismatch(_) => {
            "统一所有文件的采样率和声道数，或使用 --strict-format false / Align sample rate and channels, or pass --strict-format false"
        }
        AudioError::UnsupportedFormat { .. } => {
            "仅支持 16 位线性 PCM，请先转换文件 / Only 16-bit linear PCM is supported, convert the file first"
        }
        AudioError::InvalidInput(_) => {
            "检查命令行参数是否正确，使用 --help 查看完整用法 / Check if command-line arguments are correct, use --help to see full usage"
        }
        // 对于其他错误，使用分类建议
        _ => match ErrorCategory::from_audio_error(error) {
            ErrorCategory::Io => {
                "检查文件路径是否正确，文件是否存在且可读写 / Check if file path is correct, file exists and is accessible"
            }
            ErrorCategory::Format => {
                "文件可能损坏或不是有效的 WAV 文件 / File may be corrupted or not a valid WAV file"
            }
            ErrorCategory::Input => {
                "请检查输入目录和参数设置 / Please check input directory and parameter settings"
            }
            ErrorCategory::Output => {
                "清理输出目录中的旧文件或使用 --out 指定新路径 / Clean up old outputs or choose another path with --out"
            }
        },
    }
}

/// 错误处理和建议
fn handle_error(error: AudioError, reporter: &mut dyn MergeReporter) -> ! {
    let category = ErrorCategory::from_audio_error(&error);
    reporter.error(&format!(
        "错误 / Error [{}]: {error}",
        category.display_name()
    ));
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let exit_code = match category {
        ErrorCategory::Input => exit_codes::INPUT_ERROR,
        ErrorCategory::Format => exit_codes::FORMAT_ERROR,
        ErrorCategory::Output => exit_codes::OUTPUT_ERROR,
        ErrorCategory::Io => exit_codes::GENERAL_ERROR,
    };

    process::exit(exit_code);
}

/// 应用程序主逻辑（便于测试和复用）
fn run(config: &AppConfig, reporter: &mut ConsoleReporter) -> Result<(), AudioError> {
    // 1. 收集并排序输入文件
    let entries = tools::collect_inputs(&config.merge.source_dir, config.merge.order)?;
    tools::show_scan_results(config, &entries);

    // 2. 两遍合并
    let files: Vec<PathBuf> = entries.into_iter().map(|e| e.path).collect();
    let report = acoustic_merge::core::run(&files, &config.merge, reporter)?;

    // 3. 汇总
    tools::print_summary(config, &report);
    Ok(())
}

fn main() {
    // 1. 解析命令行参数（空运行或 --help 时 clap 打印帮助并退出）
    let config = tools::parse_args();

    // 2. 显示启动信息
    tools::show_startup_info(&config);

    // 3. 执行主逻辑，统一处理错误
    let mut reporter = ConsoleReporter::new(&config);
    if let Err(error) = run(&config, &mut reporter) {
        handle_error(error, &mut reporter);
    }
}
