//! 进度与日志回调
//!
//! 核心从不直接打印，所有进度和日志都通过注入的 [`MergeReporter`] 发出。

use std::fmt;

/// 处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// 第一遍：统计总长度与峰值
    Scan,
    /// 第二遍：写出
    Merge,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Scan => "PASS1 scan",
            Phase::Merge => "PASS2 merge",
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Ok,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogLevel::Info => "INFO",
            LogLevel::Ok => "OK",
            LogLevel::Warn => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(tag)
    }
}

/// 进度/日志接收端
pub trait MergeReporter {
    /// 每处理完一个文件调用一次
    fn on_progress(&mut self, phase: Phase, current: usize, total: usize);

    fn on_log(&mut self, level: LogLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.on_log(LogLevel::Info, message);
    }

    fn ok(&mut self, message: &str) {
        self.on_log(LogLevel::Ok, message);
    }

    fn warn(&mut self, message: &str) {
        self.on_log(LogLevel::Warn, message);
    }

    fn error(&mut self, message: &str) {
        self.on_log(LogLevel::Error, message);
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl MergeReporter for SilentReporter {
    fn on_progress(&mut self, _phase: Phase, _current: usize, _total: usize) {}

    fn on_log(&mut self, _level: LogLevel, _message: &str) {}
}

/// 记录所有事件，便于嵌入方和测试检查
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub progress: Vec<(Phase, usize, usize)>,
    pub logs: Vec<(LogLevel, String)>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定级别的日志
    pub fn messages(&self, level: LogLevel) -> Vec<&str> {
        self.logs
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// 指定阶段的进度事件
    pub fn progress_of(&self, phase: Phase) -> Vec<(usize, usize)> {
        self.progress
            .iter()
            .filter(|(p, _, _)| *p == phase)
            .map(|&(_, current, total)| (current, total))
            .collect()
    }
}

impl MergeReporter for RecordingReporter {
    fn on_progress(&mut self, phase: Phase, current: usize, total: usize) {
        self.progress.push((phase, current, total));
    }

    fn on_log(&mut self, level: LogLevel, message: &str) {
        self.logs.push((level, message.to_string()));
    }
}
