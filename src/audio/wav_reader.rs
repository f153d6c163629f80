//! WAV 容器解析
//!
//! 按顺序扫描 RIFF 子块：解析 `fmt ` 描述符，整块读取 `data` 中的小端 16 位样本，
//! 未知块按声明长度跳过，奇数长度块后跟一个填充字节。

use super::format::{PCM16_BITS, PCM16_BYTES, PcmFormat};
use crate::error::{self, AudioError, AudioResult};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

/// `fmt ` 块中描述符字段的最小字节数
const FMT_FIELDS_LEN: usize = 16;

/// 解码结果：格式描述符 + 交错排列的样本缓冲
#[derive(Debug, Clone, PartialEq)]
pub struct WavData {
    pub format: PcmFormat,
    pub samples: Vec<i16>,
}

impl WavData {
    /// 帧数（每帧包含每个声道一个样本）
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.channels_usize().max(1)
    }
}

struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

impl ChunkHeader {
    fn id_lossy(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// 解析到哪一步为止
#[derive(Clone, Copy, PartialEq)]
enum ScanDepth {
    /// 读到 `fmt ` 即返回，不读取样本
    FormatOnly,
    /// 完整解码
    Full,
}

/// 打开并完整解码 WAV 文件
pub fn decode_file<P: AsRef<Path>>(path: P) -> AudioResult<WavData> {
    let file = File::open(path.as_ref())?;
    decode_reader(BufReader::new(file))
}

/// 从任意字节流完整解码 WAV
pub fn decode_reader<R: Read>(mut reader: R) -> AudioResult<WavData> {
    let (format, samples) = scan_chunks(&mut reader, ScanDepth::Full)?;
    let format = format.ok_or(AudioError::NoAudioData)?;
    match samples {
        Some(samples) if !samples.is_empty() => Ok(WavData { format, samples }),
        _ => Err(AudioError::NoAudioData),
    }
}

/// 只解析格式描述符（strict 校验用，不读取样本数据）
pub fn probe_file<P: AsRef<Path>>(path: P) -> AudioResult<PcmFormat> {
    let file = File::open(path.as_ref())?;
    probe_reader(BufReader::new(file))
}

/// 从任意字节流解析格式描述符
pub fn probe_reader<R: Read>(mut reader: R) -> AudioResult<PcmFormat> {
    let (format, _) = scan_chunks(&mut reader, ScanDepth::FormatOnly)?;
    format.ok_or(AudioError::NoAudioData)
}

fn scan_chunks<R: Read>(
    reader: &mut R,
    depth: ScanDepth,
) -> AudioResult<(Option<PcmFormat>, Option<Vec<i16>>)> {
    read_envelope(reader)?;

    let mut format: Option<PcmFormat> = None;
    let mut samples: Option<Vec<i16>> = None;

    while let Some(header) = read_chunk_header(reader)? {
        match &header.id {
            FMT_TAG => {
                format = Some(read_format_chunk(reader, header.size)?);
                if depth == ScanDepth::FormatOnly {
                    return Ok((format, None));
                }
            }
            DATA_TAG => {
                let current = format.as_ref().ok_or(AudioError::FormatOrder)?;
                if current.bits_per_sample != PCM16_BITS {
                    return Err(AudioError::UnsupportedFormat {
                        format_code: current.format_code,
                        bits_per_sample: current.bits_per_sample,
                    });
                }
                // 多个 data 块时以最后一个为准
                samples = Some(read_data_chunk(reader, header.size)?);
            }
            _ => skip_exact(reader, header.size as u64, &header.id_lossy())?,
        }

        // RIFF 字对齐：奇数长度块后有一个填充字节（文件末尾缺失时容忍）
        if header.size % 2 == 1 {
            let mut pad = [0u8; 1];
            read_up_to(reader, &mut pad)?;
        }
    }

    Ok((format, samples))
}

fn read_envelope<R: Read>(reader: &mut R) -> AudioResult<()> {
    let mut header = [0u8; 12];
    let got = read_up_to(reader, &mut header)?;
    if got < header.len() {
        return Err(AudioError::BadEnvelope(format!(
            "文件头只有 {got} 字节，至少需要 12 字节"
        )));
    }
    if &header[0..4] != RIFF_TAG {
        return Err(AudioError::BadEnvelope("缺少 RIFF 标识".to_string()));
    }
    // header[4..8] 是 RIFF 总长度，不可靠，忽略
    if &header[8..12] != WAVE_TAG {
        return Err(AudioError::BadEnvelope("缺少 WAVE 标识".to_string()));
    }
    Ok(())
}

/// 读取子块头；恰好在块边界遇到 EOF 时返回 None
fn read_chunk_header<R: Read>(reader: &mut R) -> AudioResult<Option<ChunkHeader>> {
    let mut raw = [0u8; 8];
    match read_up_to(reader, &mut raw)? {
        0 => Ok(None),
        8 => Ok(Some(ChunkHeader {
            id: [raw[0], raw[1], raw[2], raw[3]],
            size: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        })),
        n => Err(error::truncated("子块头", format!("只剩 {n} 字节"))),
    }
}

fn read_format_chunk<R: Read>(reader: &mut R, size: u32) -> AudioResult<PcmFormat> {
    if (size as usize) < FMT_FIELDS_LEN {
        return Err(error::truncated(
            "fmt 块",
            format!("声明 {size} 字节，至少需要 {FMT_FIELDS_LEN} 字节"),
        ));
    }

    let mut raw = [0u8; FMT_FIELDS_LEN];
    let got = read_up_to(reader, &mut raw)?;
    if got < FMT_FIELDS_LEN {
        return Err(error::truncated(
            "fmt 块",
            format!("声明 {size} 字节，实际只有 {got} 字节"),
        ));
    }

    // 扩展字段（cbSize 等）不使用
    skip_exact(reader, size as u64 - FMT_FIELDS_LEN as u64, "fmt ")?;

    Ok(PcmFormat {
        format_code: u16::from_le_bytes([raw[0], raw[1]]),
        channels: u16::from_le_bytes([raw[2], raw[3]]),
        sample_rate: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        byte_rate: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
        block_align: u16::from_le_bytes([raw[12], raw[13]]),
        bits_per_sample: u16::from_le_bytes([raw[14], raw[15]]),
    })
}

fn read_data_chunk<R: Read>(reader: &mut R, size: u32) -> AudioResult<Vec<i16>> {
    // take + read_to_end：按实际读到的字节增长缓冲，避免按伪造的长度预分配
    let mut bytes = Vec::new();
    reader.by_ref().take(size as u64).read_to_end(&mut bytes)?;
    if bytes.len() < size as usize {
        return Err(error::truncated(
            "data 块",
            format!("声明 {size} 字节，实际只有 {} 字节", bytes.len()),
        ));
    }

    Ok(convert_s16le(&bytes))
}

/// 小端字节 → i16（奇数长度时忽略最后一个字节）
fn convert_s16le(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(PCM16_BYTES)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

fn skip_exact<R: Read>(reader: &mut R, len: u64, chunk: &str) -> AudioResult<()> {
    if len == 0 {
        return Ok(());
    }
    let skipped = io::copy(&mut reader.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(error::truncated(
            &format!("'{chunk}' 块"),
            format!("声明 {len} 字节，实际只有 {skipped} 字节"),
        ));
    }
    Ok(())
}

/// 尽量填满缓冲区，返回实际读到的字节数（EOF 时可能小于缓冲区长度）
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
