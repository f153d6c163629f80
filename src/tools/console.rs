//! 终端输出模块
//!
//! [`ConsoleReporter`] 把流水线的进度和日志渲染到终端：每个阶段一个 indicatif 进度条，
//! 日志行带 `[INFO]`/`[OK]`/`[WARNING]`/`[ERROR]` 标签和可选 emoji。

use super::cli::AppConfig;
use super::utils::{format_duration, peak_db_string};
use crate::core::{LogLevel, MergeReporter, Phase, RunReport};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// 终端进度/日志输出
pub struct ConsoleReporter {
    no_color: bool,
    no_emoji: bool,
    bar_width: usize,
    /// JSON 模式：隐藏进度条，日志改走 stderr，stdout 只留给 JSON
    quiet: bool,
    active: Option<(Phase, ProgressBar)>,
}

impl ConsoleReporter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            no_color: config.no_color,
            no_emoji: config.no_emoji,
            bar_width: config.bar_width,
            quiet: config.json,
            active: None,
        }
    }

    fn bar_style(&self) -> ProgressStyle {
        let bar = if self.no_color {
            format!("{{bar:{}}}", self.bar_width)
        } else {
            format!("{{bar:{}.green}}", self.bar_width)
        };
        ProgressStyle::with_template(&format!(
            "{{prefix:<15}} [{bar}] {{percent:>3}}% ({{pos}}/{{len}})"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
    }

    fn start_bar(&mut self, phase: Phase, total: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        if self.quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.set_draw_target(ProgressDrawTarget::stderr());
        }
        bar.set_style(self.bar_style());
        let prefix = if self.no_emoji {
            phase.label().to_string()
        } else {
            format!("🟩 {}", phase.label())
        };
        bar.set_prefix(prefix);
        bar
    }

    fn format_line(&self, level: LogLevel, message: &str) -> String {
        let emoji = match level {
            LogLevel::Info => "ℹ️ ",
            LogLevel::Ok => "✅",
            LogLevel::Warn => "⚠️ ",
            LogLevel::Error => "🛑",
        };
        let color = match level {
            LogLevel::Info => None,
            LogLevel::Ok => Some(GREEN),
            LogLevel::Warn => Some(YELLOW),
            LogLevel::Error => Some(RED),
        };

        let mut line = String::new();
        if !self.no_emoji {
            line.push_str(emoji);
            line.push(' ');
        }
        let body = format!("[{level}] {message}");
        match color {
            Some(c) if !self.no_color => line.push_str(&format!("{c}{body}{RESET}")),
            _ => line.push_str(&body),
        }
        line
    }

    fn print_line(&self, level: LogLevel, line: &str) {
        let to_stderr = self.quiet || matches!(level, LogLevel::Warn | LogLevel::Error);
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl MergeReporter for ConsoleReporter {
    fn on_progress(&mut self, phase: Phase, current: usize, total: usize) {
        if total == 0 {
            return;
        }
        let switch = self.active.as_ref().is_none_or(|(p, _)| *p != phase);
        if switch {
            if let Some((_, old)) = self.active.take() {
                old.finish();
            }
            let bar = self.start_bar(phase, total);
            self.active = Some((phase, bar));
        }

        if let Some((_, bar)) = &self.active {
            bar.set_position(current.min(total) as u64);
            if current >= total {
                bar.finish();
            }
        }
    }

    fn on_log(&mut self, level: LogLevel, message: &str) {
        let line = self.format_line(level, message);
        match &self.active {
            Some((_, bar)) if !bar.is_finished() => bar.suspend(|| self.print_line(level, &line)),
            _ => self.print_line(level, &line),
        }
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        if let Some((_, bar)) = self.active.take() {
            bar.abandon();
        }
    }
}

/// 生成运行汇总表
pub fn summary_table(config: &AppConfig, report: &RunReport) -> Table {
    let merge = &config.merge;
    let totals = &report.totals;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key / 项目", "Value / 值"]);

    let output = match &report.output {
        Some(written) => written.output_path.display().to_string(),
        None => "(dry-run)".to_string(),
    };
    let normalize = match merge.normalize_db {
        Some(db) => format!("{db:.2} dBFS (scale={:.6})", report.scale),
        None => "off".to_string(),
    };
    let crossfade = if merge.crossfade_enabled() {
        format!(
            "{} ms ({} / {} boundaries)",
            merge.crossfade_ms,
            totals.blended_boundaries,
            totals.file_count.saturating_sub(1)
        )
    } else {
        "off".to_string()
    };

    let rows = [
        ("Source / 输入", merge.source_dir.display().to_string()),
        ("Output / 输出", output),
        ("Files / 文件数", totals.file_count.to_string()),
        ("Gain / 增益", format!("{:.0}%", merge.gain_percent)),
        ("Order / 顺序", merge.order.to_string()),
        ("Normalize / 归一化", normalize),
        ("Crossfade / 交叉淡化", crossfade),
        ("Format / 格式", totals.format.to_string()),
        (
            "Duration / 时长",
            format!(
                "{} ({} samples)",
                format_duration(totals.duration_seconds()),
                totals.total_samples
            ),
        ),
        (
            "Peak / 峰值",
            format!("{:.4} ({})", totals.peak, peak_db_string(totals.peak)),
        ),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

/// 输出最终汇总（表格或 JSON）
pub fn print_summary(config: &AppConfig, report: &RunReport) {
    if config.json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
        return;
    }
    println!();
    println!("{}", summary_table(config, report));
}
