//! AcousticMerge - PCM16 WAV 合并工具
//!
//! 把一个目录中的 16 位 PCM WAV 文件按顺序拼接为单个输出文件。
//!
//! ## 核心特性
//! - 两遍处理：第一遍统计总样本数与峰值，第二遍流式写出，头部一次写对
//! - 增益（百分比）与峰值归一化（dBFS 目标）
//! - 文件边界线性交叉淡化，扫描与写入使用同一折叠逻辑，长度严格一致
//! - 从不覆盖已有输出文件

pub mod audio;
pub mod core;
pub mod error;
pub mod processing;
pub mod tools;

// 重新导出核心类型
pub use audio::{PcmFormat, WavData, WavStreamWriter};
pub use core::{
    LogLevel, MergeConfig, MergeReporter, OrderMode, Phase, RecordingReporter, RunReport,
    RunTotals, SilentReporter, WriteResult, run,
};
pub use error::{AudioError, AudioResult, ErrorCategory};
