//! 第一遍：扫描
//!
//! 解码全部输入，按与写入遍完全相同的边界折叠统计输出样本总数和峰值，
//! 供写入遍计算归一化系数和文件头长度。

use super::config::MergeConfig;
use super::reporter::{MergeReporter, Phase};
use crate::audio::{PcmFormat, decode_file};
use crate::error::{AudioError, AudioResult};
use crate::processing::crossfade::{self, AmplitudeSink, CrossfadeFold};
use crate::processing::sample_conversion::samples_to_amplitudes;
use serde::Serialize;
use std::path::PathBuf;

/// 扫描结果，整次运行只写一次
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunTotals {
    /// 计划输出的交错样本总数（已扣除交叉淡化重叠）
    pub total_samples: u64,
    /// 施加增益和交叉淡化之后的峰值幅度
    pub peak: f64,
    /// 实际交叉淡化的边界数
    pub blended_boundaries: usize,
    /// 淡化窗口（交错样本数）
    pub fade_window: usize,
    pub file_count: usize,
    /// 参考格式（第一个文件）
    pub format: PcmFormat,
}

impl RunTotals {
    pub fn duration_seconds(&self) -> f64 {
        self.format.duration_seconds(self.total_samples)
    }
}

/// 只计数和取峰值的 sink
#[derive(Debug, Default)]
struct PeakMeter {
    peak: f64,
    samples: u64,
}

impl AmplitudeSink for PeakMeter {
    fn emit(&mut self, run: &[f32]) -> AudioResult<()> {
        self.samples += run.len() as u64;
        self.peak = self.peak.max(crossfade::slice_peak(run));
        Ok(())
    }

    fn emit_blend(&mut self, tail: &[f32], head: &[f32]) -> AudioResult<()> {
        self.samples += tail.len().min(head.len()) as u64;
        self.peak = self.peak.max(crossfade::blend_peak(tail, head));
        Ok(())
    }
}

/// 检查文件格式：必须是 PCM16；与参考格式不一致时 strict 模式报错，否则警告
pub(crate) fn verify_format(
    path: &std::path::Path,
    format: &PcmFormat,
    reference: &PcmFormat,
    strict: bool,
    reporter: &mut dyn MergeReporter,
) -> AudioResult<()> {
    format.ensure_pcm16().map_err(|e| e.in_file(path))?;

    if let Some(diff) = format.mismatch_against(reference) {
        if strict {
            return Err(AudioError::FormatMismatch(diff).in_file(path));
        }
        reporter.warn(&format!(
            "{}: 格式与参考文件不同 ({diff})，按原始交错数据拼接 / format differs from reference, merged as raw interleaved data",
            path.display()
        ));
    }
    Ok(())
}

/// 执行扫描
pub fn scan(
    files: &[PathBuf],
    config: &MergeConfig,
    reference: &PcmFormat,
    reporter: &mut dyn MergeReporter,
) -> AudioResult<RunTotals> {
    let gain = config.gain();
    let window = crossfade::fade_window_samples(
        reference.sample_rate,
        reference.channels,
        config.crossfade_ms,
    );

    let mut fold = CrossfadeFold::new(window);
    let mut meter = PeakMeter::default();
    let total = files.len();

    for (index, path) in files.iter().enumerate() {
        let wav = decode_file(path).map_err(|e| e.in_file(path))?;
        verify_format(path, &wav.format, reference, config.strict_format, reporter)?;

        let amplitudes = samples_to_amplitudes(&wav.samples, gain);
        fold.step(&amplitudes, index + 1 == total, &mut meter)?;

        reporter.on_progress(Phase::Scan, index + 1, total);
    }
    fold.finish(&mut meter)?;

    Ok(RunTotals {
        total_samples: meter.samples,
        peak: meter.peak,
        blended_boundaries: fold.blended_boundaries(),
        fade_window: fold.window(),
        file_count: total,
        format: *reference,
    })
}
