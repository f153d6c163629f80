//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::{bar_limits, defaults};
use crate::core::{MergeConfig, OrderMode};
use clap::{Arg, ArgAction, Command, value_parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 交给合并流水线的配置
    pub merge: MergeConfig,

    /// 是否显示详细信息
    pub verbose: bool,

    /// 以 JSON 输出最终汇总
    pub json: bool,

    /// 进度条宽度（字符）
    pub bar_width: usize,

    pub no_color: bool,

    pub no_emoji: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            merge: MergeConfig::default(),
            verbose: false,
            json: false,
            bar_width: defaults::BAR_WIDTH,
            no_color: false,
            no_emoji: false,
        }
    }
}

/// 构建命令定义
pub fn build_command() -> Command {
    Command::new("acoustic-merge")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("AcousticMerge Team")
        .arg_required_else_help(true)
        .after_help(
            "示例 / Examples:\n  \
             acoustic-merge /merge                  使用默认路径合并\n  \
             acoustic-merge /merge --gain-pct 150   合并并放大 ×1.5\n  \
             acoustic-merge --order mtime /merge    按修改时间排序后合并\n  \
             acoustic-merge --dry-run --src X       只检查并显示汇总",
        )
        .arg(
            Arg::new("src")
                .long("src")
                .value_name("DIR")
                .help("WAV 文件所在目录（递归收集）")
                .default_value(defaults::SOURCE_DIR)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("FILE")
                .help("输出 WAV 文件（已存在时自动改为 merged_1.wav 等）")
                .default_value(defaults::OUTPUT_PATH)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("gain-pct")
                .long("gain-pct")
                .value_name("PERCENT")
                .help("增益百分比：100=原样，150=×1.5，200=×2.0")
                .default_value("100")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("order")
                .long("order")
                .value_name("name|mtime")
                .help("合并顺序：按文件名或按修改时间")
                .default_value("name")
                .value_parser(|s: &str| s.parse::<OrderMode>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("strict-format")
                .long("strict-format")
                .value_name("BOOL")
                .help("要求所有文件格式一致（PCM16/采样率/声道），否则报错")
                .num_args(0..=1)
                .default_value("true")
                .default_missing_value("true")
                .value_parser(value_parser!(bool)),
        )
        .arg(
            Arg::new("normalize")
                .long("normalize")
                .value_name("DBFS")
                .help("峰值归一化目标（dBFS），例如 -1.0")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("crossfade-ms")
                .long("crossfade-ms")
                .value_name("MS")
                .help("文件衔接处的交叉淡化时长（毫秒），0=关闭")
                .default_value("0")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("只检查并显示汇总，不写出文件")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("merge")
                .long("merge")
                .help("使用默认路径直接合并（也可写作 /merge）")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("bar-width")
                .long("bar-width")
                .value_name("N")
                .help("进度条宽度（字符）")
                .default_value("80")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("关闭彩色输出")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-emoji")
                .long("no-emoji")
                .help("关闭 emoji")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("以 JSON 输出最终汇总")
                .action(ArgAction::SetTrue),
        )
}

/// 把 Windows 风格的别名改写为 clap 能识别的形式
///
/// `/merge` → `--merge`，`/?`、`-?` → `--help`
fn rewrite_aliases<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            match arg.to_str() {
                Some(s) if s.eq_ignore_ascii_case("/merge") => OsString::from("--merge"),
                Some("/?") | Some("-?") => OsString::from("--help"),
                _ => arg,
            }
        })
        .collect()
}

/// 从给定参数解析配置（第一个元素为程序名）
pub fn parse_args_from<I, T>(args: I) -> Result<AppConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let matches = build_command().try_get_matches_from(rewrite_aliases(args))?;

    let merge = MergeConfig {
        source_dir: matches
            .get_one::<PathBuf>("src")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(defaults::SOURCE_DIR)),
        output_path: matches
            .get_one::<PathBuf>("out")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_PATH)),
        gain_percent: matches
            .get_one::<f64>("gain-pct")
            .copied()
            .unwrap_or(defaults::GAIN_PERCENT),
        order: matches
            .get_one::<OrderMode>("order")
            .copied()
            .unwrap_or_default(),
        strict_format: matches
            .get_one::<bool>("strict-format")
            .copied()
            .unwrap_or(true),
        normalize_db: matches.get_one::<f64>("normalize").copied(),
        crossfade_ms: matches.get_one::<u32>("crossfade-ms").copied().unwrap_or(0),
        dry_run: matches.get_flag("dry-run"),
    };

    let bar_width = matches
        .get_one::<usize>("bar-width")
        .copied()
        .unwrap_or(defaults::BAR_WIDTH)
        .max(bar_limits::MIN_BAR_WIDTH);

    Ok(AppConfig {
        merge,
        verbose: matches.get_flag("verbose"),
        json: matches.get_flag("json"),
        bar_width,
        no_color: matches.get_flag("no-color"),
        no_emoji: matches.get_flag("no-emoji"),
    })
}

/// 解析命令行参数并创建配置（出错或请求帮助时由 clap 打印并退出）
pub fn parse_args() -> AppConfig {
    parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

/// 显示程序启动信息
pub fn show_startup_info(config: &AppConfig) {
    if config.json {
        return;
    }

    let merge = &config.merge;
    let rocket = if config.no_emoji { "" } else { "🚀 " };
    println!("{rocket}AcousticMerge v{VERSION} 启动");
    if config.verbose {
        println!("📝 {DESCRIPTION}");
    }

    let normalize = merge
        .normalize_db
        .map(|db| format!("{db:.2} dBFS"))
        .unwrap_or_else(|| "off".to_string());
    let crossfade = if merge.crossfade_enabled() {
        format!("{} ms", merge.crossfade_ms)
    } else {
        "off".to_string()
    };
    let strict = if merge.strict_format { "strict" } else { "lenient" };

    print_kv("Source", &merge.source_dir.display().to_string());
    print_kv("Output", &merge.output_path.display().to_string());
    print_kv("Gain", &format!("{:.0}%", merge.gain_percent));
    print_kv("Order", merge.order.as_str());
    print_kv("Normalize", &normalize);
    print_kv("Crossfade", &crossfade);
    print_kv("Format", &format!("PCM16 ({strict})"));
    if merge.dry_run {
        print_kv("Mode", "dry-run");
    }
    println!();
}

fn print_kv(key: &str, value: &str) {
    println!("   {key:<12} {value}");
}
