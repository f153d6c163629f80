//! 第二遍：写出
//!
//! 重新解码每个文件，按扫描遍相同的折叠规则产出幅度，
//! 乘以归一化系数后转换为 16 位样本，流式写入输出文件。

use super::config::MergeConfig;
use super::reporter::{MergeReporter, Phase};
use super::scan_pass::{RunTotals, verify_format};
use crate::audio::{WavStreamWriter, decode_file};
use crate::error::AudioResult;
use crate::processing::crossfade::{AmplitudeSink, CrossfadeFold};
use crate::processing::sample_conversion::{amplitudes_to_fixed_into, samples_to_amplitudes};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 写出结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteResult {
    pub output_path: PathBuf,
    pub samples_written: u64,
    /// 头部中声明的样本数
    pub planned_samples: u64,
    /// 实际使用的归一化系数
    pub scale: f32,
    pub duration_seconds: f64,
}

impl WriteResult {
    /// 写入数与计划数是否一致
    pub fn is_consistent(&self) -> bool {
        self.samples_written == self.planned_samples
    }
}

/// 归一化系数
///
/// 设置了目标且峰值为正时为 `min(target, 1.0) / peak`，否则为 1。
/// 系数可能大于 1（放大安静的素材）。
pub fn normalization_scale(normalize_db: Option<f64>, peak: f64) -> f32 {
    match normalize_db {
        Some(db) if peak > 0.0 => {
            let target = crate::processing::db_to_linear(db).min(1.0);
            (target / peak) as f32
        }
        _ => 1.0,
    }
}

/// 把折叠产出的幅度转换后写入文件
struct WriterSink<'a, W: Write> {
    writer: &'a mut WavStreamWriter<W>,
    scale: f32,
    scratch: Vec<i16>,
}

impl<W: Write> AmplitudeSink for WriterSink<'_, W> {
    fn emit(&mut self, run: &[f32]) -> AudioResult<()> {
        amplitudes_to_fixed_into(run, self.scale, &mut self.scratch);
        self.writer.write_samples(&self.scratch)
    }
}

/// 执行写出
pub fn merge(
    files: &[PathBuf],
    config: &MergeConfig,
    totals: &RunTotals,
    output_path: &Path,
    reporter: &mut dyn MergeReporter,
) -> AudioResult<WriteResult> {
    let format = totals.format;
    let scale = normalization_scale(config.normalize_db, totals.peak);
    let gain = config.gain();

    let mut writer = WavStreamWriter::create(
        output_path,
        format.sample_rate,
        format.channels,
        totals.total_samples,
    )
    .map_err(|e| e.in_file(output_path))?;

    let mut fold = CrossfadeFold::new(totals.fade_window);
    let total = files.len();
    {
        let mut sink = WriterSink {
            writer: &mut writer,
            scale,
            scratch: Vec::new(),
        };

        for (index, path) in files.iter().enumerate() {
            let wav = decode_file(path).map_err(|e| e.in_file(path))?;
            // 文件可能在两遍之间被替换
            verify_format(path, &wav.format, &format, config.strict_format, reporter)?;

            let amplitudes = samples_to_amplitudes(&wav.samples, gain);
            fold.step(&amplitudes, index + 1 == total, &mut sink)
                .map_err(|e| e.in_file(output_path))?;

            reporter.on_progress(Phase::Merge, index + 1, total);
        }
        fold.finish(&mut sink).map_err(|e| e.in_file(output_path))?;
    }

    let planned = writer.planned_samples();
    let written = writer.finish().map_err(|e| e.in_file(output_path))?;

    if written != planned {
        reporter.warn(&format!(
            "写入样本数与计划不符 / written samples={written}, planned={planned}"
        ));
    }

    Ok(WriteResult {
        output_path: output_path.to_path_buf(),
        samples_written: written,
        planned_samples: planned,
        scale,
        duration_seconds: format.duration_seconds(written),
    })
}
