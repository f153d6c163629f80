//! 合并流水线入口
//!
//! 校验配置 → 探测参考格式 → 扫描 → （dry-run 到此为止）→ 选择输出路径 → 写出。

use super::config::MergeConfig;
use super::merge_pass::{self, WriteResult, normalization_scale};
use super::output_path::{ensure_parent_dir, next_available_path};
use super::reporter::MergeReporter;
use super::scan_pass::{self, RunTotals};
use crate::audio::probe_file;
use crate::error::{AudioError, AudioResult};
use crate::processing::linear_to_db;
use serde::Serialize;
use std::path::PathBuf;

/// 一次运行的汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub totals: RunTotals,
    /// 归一化系数（未归一化时为 1）
    pub scale: f32,
    /// dry-run 时为 None
    pub output: Option<WriteResult>,
}

impl RunReport {
    pub fn is_dry_run(&self) -> bool {
        self.output.is_none()
    }
}

/// 按给定顺序合并 `files`
pub fn run(
    files: &[PathBuf],
    config: &MergeConfig,
    reporter: &mut dyn MergeReporter,
) -> AudioResult<RunReport> {
    config.validate()?;

    let Some(first) = files.first() else {
        return Err(AudioError::NoInputFiles(config.source_dir.clone()));
    };

    let reference = probe_file(first).map_err(|e| e.in_file(first))?;
    reference.ensure_pcm16().map_err(|e| e.in_file(first))?;
    reporter.info(&format!("参考格式 / reference format: {reference}"));

    // 在解码任何样本之前发现格式问题
    if config.strict_format {
        for path in &files[1..] {
            let format = probe_file(path).map_err(|e| e.in_file(path))?;
            scan_pass::verify_format(path, &format, &reference, true, reporter)?;
        }
    }

    let totals = scan_pass::scan(files, config, &reference, reporter)?;
    reporter.info(&format!(
        "总时长 / duration: {:.3} s ({} samples), peak {:.3} ({:.2} dBFS)",
        totals.duration_seconds(),
        totals.total_samples,
        totals.peak,
        linear_to_db(totals.peak)
    ));
    if totals.fade_window > 0 {
        reporter.info(&format!(
            "交叉淡化 / crossfade: {} samples, {} of {} boundaries blended",
            totals.fade_window,
            totals.blended_boundaries,
            totals.file_count.saturating_sub(1)
        ));
    }

    let scale = normalization_scale(config.normalize_db, totals.peak);
    if let Some(target) = config.normalize_target()
        && totals.peak > 0.0
    {
        reporter.info(&format!(
            "normalized: peak {:.3} -> {:.3} (scale={:.6})",
            totals.peak,
            (totals.peak * scale as f64).min(target),
            scale
        ));
    }

    if config.dry_run {
        reporter.ok("dry-run: 不写出文件 / writing disabled");
        return Ok(RunReport {
            totals,
            scale,
            output: None,
        });
    }

    let output_path = next_available_path(&config.output_path)?;
    ensure_parent_dir(&output_path)?;
    if output_path != config.output_path {
        reporter.info(&format!(
            "{} 已存在，改为写入 / exists, writing to {}",
            config.output_path.display(),
            output_path.display()
        ));
    }

    let written = merge_pass::merge(files, config, &totals, &output_path, reporter)?;
    reporter.ok(&format!("Output saved: {}", written.output_path.display()));

    Ok(RunReport {
        totals,
        scale,
        output: Some(written),
    })
}
