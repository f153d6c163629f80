//! 音频容器模块
//!
//! RIFF/WAVE PCM16 的解析（完整解码或只读格式）与流式写出。

pub mod format;
pub mod wav_reader;
pub mod wav_writer;

pub use format::{PCM16_BITS, PcmFormat, WAVE_FORMAT_PCM};
pub use wav_reader::{WavData, decode_file, decode_reader, probe_file, probe_reader};
pub use wav_writer::WavStreamWriter;
