//! 流式 WAV 写入器
//!
//! 头部（RIFF + fmt + data 块头）在写入任何样本之前一次性写出，
//! data 长度取自预先计算的总样本数。写入器不会回头修补头部，
//! 因此调用方写入的样本总数必须与计划值一致，头部才自洽。

use super::format::{PCM16_BYTES, PcmFormat};
use crate::error::{self, AudioResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// RIFF + fmt(16) + data 块头的固定长度
pub const HEADER_LEN: usize = 44;

/// fmt 块长度（标准 PCM）
const FMT_CHUNK_LEN: u32 = 16;

/// 生成 44 字节 PCM16 头部
fn encode_header(format: &PcmFormat, data_bytes: u32) -> [u8; HEADER_LEN] {
    let riff_size = 4 + (8 + FMT_CHUNK_LEN) + (8 + data_bytes);

    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    header[20..22].copy_from_slice(&format.format_code.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align.to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_bytes.to_le_bytes());
    header
}

/// 计划样本数对应的 data 字节数，超出 RIFF 32 位长度字段时报错
fn planned_data_bytes(total_samples: u64) -> AudioResult<u32> {
    let data_bytes = total_samples.saturating_mul(PCM16_BYTES as u64);
    let max_data = u32::MAX as u64 - (HEADER_LEN as u64 - 8);
    if data_bytes > max_data {
        return Err(error::invalid_input(
            "输出过大",
            format!("{total_samples} 个样本超出 RIFF 4 GiB 上限"),
        ));
    }
    Ok(data_bytes as u32)
}

/// 写句柄：头部已写出，之后只追加样本
pub struct WavStreamWriter<W: Write> {
    inner: W,
    planned_samples: u64,
    written_samples: u64,
    scratch: Vec<u8>,
}

impl WavStreamWriter<BufWriter<File>> {
    /// 创建（或截断）输出文件并立即写出完整头部
    pub fn create<P: AsRef<Path>>(
        path: P,
        sample_rate: u32,
        channels: u16,
        total_samples: u64,
    ) -> AudioResult<Self> {
        // 先校验再创建文件，避免留下空文件
        validate_layout(sample_rate, channels)?;
        planned_data_bytes(total_samples)?;

        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file), sample_rate, channels, total_samples)
    }

    /// 刷新缓冲并返回实际写入的样本数
    pub fn finish(self) -> AudioResult<u64> {
        let written = self.written_samples;
        self.into_inner()?;
        Ok(written)
    }
}

impl<W: Write> WavStreamWriter<W> {
    /// 在任意输出流上写出头部
    pub fn new(
        mut inner: W,
        sample_rate: u32,
        channels: u16,
        total_samples: u64,
    ) -> AudioResult<Self> {
        validate_layout(sample_rate, channels)?;
        let data_bytes = planned_data_bytes(total_samples)?;

        let format = PcmFormat::pcm16(sample_rate, channels);
        inner.write_all(&encode_header(&format, data_bytes))?;

        Ok(Self {
            inner,
            planned_samples: total_samples,
            written_samples: 0,
            scratch: Vec::new(),
        })
    }

    /// 追加一段交错的 16 位样本
    pub fn write_samples(&mut self, samples: &[i16]) -> AudioResult<()> {
        if samples.is_empty() {
            return Ok(());
        }

        self.scratch.clear();
        self.scratch.reserve(samples.len() * PCM16_BYTES);
        for sample in samples {
            self.scratch.extend_from_slice(&sample.to_le_bytes());
        }
        self.inner.write_all(&self.scratch)?;
        self.written_samples += samples.len() as u64;
        Ok(())
    }

    /// 已写入的样本数
    #[inline]
    pub fn samples_written(&self) -> u64 {
        self.written_samples
    }

    /// 头部中声明的样本数
    #[inline]
    pub fn planned_samples(&self) -> u64 {
        self.planned_samples
    }

    /// 刷新并取回底层输出流
    pub fn into_inner(mut self) -> AudioResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn validate_layout(sample_rate: u32, channels: u16) -> AudioResult<()> {
    if channels == 0 {
        return Err(error::invalid_input("输出格式", "声道数不能为0"));
    }
    if sample_rate == 0 {
        return Err(error::invalid_input("输出格式", "采样率不能为0"));
    }
    Ok(())
}
