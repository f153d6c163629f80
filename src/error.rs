//! 统一错误处理框架
//!
//! 合并流水线的全部致命错误类型定义。除"写入样本数与计划不符"之外，
//! 所有错误都会终止本次运行。

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// 音频合并相关的统一错误类型
#[derive(Debug)]
pub enum AudioError {
    /// 外层 RIFF/WAVE 标识不匹配
    BadEnvelope(String),

    /// data 块出现在 fmt 块之前
    FormatOrder,

    /// 非线性 PCM 或非 16 位样本
    UnsupportedFormat {
        format_code: u16,
        bits_per_sample: u16,
    },

    /// strict 模式下与参考格式不一致
    FormatMismatch(String),

    /// 没有找到 data 块（或 data 块为空）
    NoAudioData,

    /// 声明的长度超出了剩余字节
    TruncatedFile(String),

    /// 输入目录中没有 WAV 文件
    NoInputFiles(PathBuf),

    /// 在有限次数的数字后缀尝试内找不到空闲的输出文件名
    OutputPathExhausted(PathBuf),

    /// 参数或配置不合法
    InvalidInput(String),

    /// 文件I/O错误
    IoError(io::Error),

    /// 附带出错文件路径的包装错误
    InFile {
        path: PathBuf,
        source: Box<AudioError>,
    },
}

impl AudioError {
    /// 为错误附加文件路径（已包装的错误不会重复包装）
    pub fn in_file<P: AsRef<Path>>(self, path: P) -> Self {
        match self {
            AudioError::InFile { .. } => self,
            other => AudioError::InFile {
                path: path.as_ref().to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// 剥离路径包装，返回最内层的错误
    pub fn root(&self) -> &AudioError {
        match self {
            AudioError::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::BadEnvelope(msg) => write!(f, "不是有效的 RIFF/WAVE 文件: {msg}"),
            AudioError::FormatOrder => write!(f, "data 块出现在 fmt 块之前"),
            AudioError::UnsupportedFormat {
                format_code,
                bits_per_sample,
            } => write!(
                f,
                "仅支持 PCM16 (fmt=1, bps=16)，实际为 fmt={format_code}, bps={bits_per_sample}"
            ),
            AudioError::FormatMismatch(msg) => write!(f, "格式与参考文件不一致 (strict): {msg}"),
            AudioError::NoAudioData => write!(f, "没有音频数据 (data 块)"),
            AudioError::TruncatedFile(msg) => write!(f, "文件被截断: {msg}"),
            AudioError::NoInputFiles(dir) => {
                write!(f, "目录 {} 中没有 WAV 文件", dir.display())
            }
            AudioError::OutputPathExhausted(path) => {
                write!(f, "无法为 {} 找到空闲的输出文件名", path.display())
            }
            AudioError::InvalidInput(msg) => write!(f, "输入验证失败: {msg}"),
            AudioError::IoError(err) => write!(f, "文件I/O错误: {err}"),
            AudioError::InFile { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::IoError(err) => Some(err),
            AudioError::InFile { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for AudioError {
    fn from(err: io::Error) -> Self {
        AudioError::IoError(err)
    }
}

/// 音频处理操作的标准Result类型
pub type AudioResult<T> = Result<T, AudioError>;

// ==================== 错误转换Helper函数 ====================

/// 创建截断错误的helper函数
#[inline]
pub fn truncated<E: fmt::Display>(context: &str, detail: E) -> AudioError {
    AudioError::TruncatedFile(format!("{context}: {detail}"))
}

/// 创建输入验证错误的helper函数
#[inline]
pub fn invalid_input<E: fmt::Display>(context: &str, detail: E) -> AudioError {
    AudioError::InvalidInput(format!("{context}: {detail}"))
}

// ==================== 错误分类系统 ====================
// 用于选择退出码和提示信息

/// 错误类别枚举
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorCategory {
    /// 容器或样本格式问题
    Format,
    /// 参数、配置或输入集合问题
    Input,
    /// I/O相关错误（文件不存在、权限不足等）
    Io,
    /// 输出路径问题
    Output,
}

impl ErrorCategory {
    /// 从AudioError提取错误类别
    pub fn from_audio_error(e: &AudioError) -> Self {
        match e.root() {
            AudioError::BadEnvelope(_)
            | AudioError::FormatOrder
            | AudioError::UnsupportedFormat { .. }
            | AudioError::FormatMismatch(_)
            | AudioError::NoAudioData
            | AudioError::TruncatedFile(_) => Self::Format,
            AudioError::NoInputFiles(_) | AudioError::InvalidInput(_) => Self::Input,
            AudioError::OutputPathExhausted(_) => Self::Output,
            AudioError::IoError(_) | AudioError::InFile { .. } => Self::Io,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Format => "格式错误",
            Self::Input => "输入错误",
            Self::Io => "I/O错误",
            Self::Output => "输出错误",
        }
    }
}
