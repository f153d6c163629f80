//! 音频格式信息模块
//!
//! 定义 `fmt ` 块解析出的格式描述符，以及合并流水线对它的约束。

use crate::error::{AudioError, AudioResult};
use serde::Serialize;
use std::fmt;

/// 线性 PCM 的格式代码（WAVE_FORMAT_PCM）
pub const WAVE_FORMAT_PCM: u16 = 1;

/// 流水线唯一支持的位深度
pub const PCM16_BITS: u16 = 16;

/// 每个 PCM16 样本占用的字节数
pub const PCM16_BYTES: usize = 2;

/// 格式描述符
///
/// 每个输入文件解析一次，之后不可变；第一个文件的描述符作为整次运行的参考格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PcmFormat {
    pub format_code: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// 创建 PCM16 格式，byte_rate 与 block_align 由声道数和采样率推导
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        let block_align = channels.saturating_mul(PCM16_BYTES as u16);
        Self {
            format_code: WAVE_FORMAT_PCM,
            channels,
            sample_rate,
            byte_rate: sample_rate.saturating_mul(block_align as u32),
            block_align,
            bits_per_sample: PCM16_BITS,
        }
    }

    /// 检查是否为流水线可处理的 PCM16
    pub fn ensure_pcm16(&self) -> AudioResult<()> {
        if self.format_code != WAVE_FORMAT_PCM || self.bits_per_sample != PCM16_BITS {
            return Err(AudioError::UnsupportedFormat {
                format_code: self.format_code,
                bits_per_sample: self.bits_per_sample,
            });
        }
        if self.channels == 0 {
            return Err(AudioError::InvalidInput("声道数不能为0".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidInput("采样率不能为0".to_string()));
        }
        Ok(())
    }

    /// 与参考格式比较（格式代码、声道数、采样率、位深），返回差异描述
    ///
    /// byte_rate / block_align 是派生字段，不参与比较。
    pub fn mismatch_against(&self, reference: &PcmFormat) -> Option<String> {
        let mut diffs = Vec::new();
        if self.format_code != reference.format_code {
            diffs.push(format!(
                "fmt {} != {}",
                self.format_code, reference.format_code
            ));
        }
        if self.channels != reference.channels {
            diffs.push(format!("{} ch != {} ch", self.channels, reference.channels));
        }
        if self.sample_rate != reference.sample_rate {
            diffs.push(format!(
                "{} Hz != {} Hz",
                self.sample_rate, reference.sample_rate
            ));
        }
        if self.bits_per_sample != reference.bits_per_sample {
            diffs.push(format!(
                "{} bps != {} bps",
                self.bits_per_sample, reference.bits_per_sample
            ));
        }

        if diffs.is_empty() {
            None
        } else {
            Some(diffs.join(", "))
        }
    }

    /// 获取声道数（usize类型）
    #[inline]
    pub fn channels_usize(&self) -> usize {
        self.channels as usize
    }

    /// 交错样本数对应的时长（秒）
    pub fn duration_seconds(&self, interleaved_samples: u64) -> f64 {
        let per_second = self.sample_rate as u64 * self.channels as u64;
        if per_second == 0 {
            0.0
        } else {
            interleaved_samples as f64 / per_second as f64
        }
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {} bps",
            self.sample_rate, self.channels, self.bits_per_sample
        )?;
        if self.format_code == WAVE_FORMAT_PCM && self.bits_per_sample == PCM16_BITS {
            write!(f, " (PCM16)")?;
        }
        Ok(())
    }
}
