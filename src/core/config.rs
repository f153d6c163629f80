//! 合并配置
//!
//! 核心只读消费的配置包：增益、排序方式、strict 格式校验、归一化目标、
//! 交叉淡化时长、dry-run。

use crate::error::{self, AudioResult};
use crate::processing::sample_conversion::db_to_linear;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 输入文件排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OrderMode {
    /// 按文件名（不区分大小写）
    #[default]
    #[serde(rename = "name")]
    ByName,
    /// 按修改时间
    #[serde(rename = "mtime")]
    ByModTime,
}

impl OrderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderMode::ByName => "name",
            OrderMode::ByModTime => "mtime",
        }
    }
}

impl FromStr for OrderMode {
    type Err = crate::error::AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(OrderMode::ByName),
            "mtime" => Ok(OrderMode::ByModTime),
            other => Err(error::invalid_input("未知的 --order", other)),
        }
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 合并配置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeConfig {
    /// WAV 文件所在目录（递归收集）
    pub source_dir: PathBuf,
    /// 期望的输出路径（被占用时自动追加数字后缀）
    pub output_path: PathBuf,
    /// 增益百分比：100 = 原样，150 = ×1.5
    pub gain_percent: f64,
    pub order: OrderMode,
    /// 要求所有文件与参考格式一致
    pub strict_format: bool,
    /// 峰值归一化目标（dBFS），None 表示不归一化
    pub normalize_db: Option<f64>,
    /// 交叉淡化时长（毫秒），0 表示关闭
    pub crossfade_ms: u32,
    /// 只扫描，不写出
    pub dry_run: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("Raw"),
            output_path: PathBuf::from("Result").join("merged.wav"),
            gain_percent: 100.0,
            order: OrderMode::ByName,
            strict_format: true,
            normalize_db: None,
            crossfade_ms: 0,
            dry_run: false,
        }
    }
}

impl MergeConfig {
    /// 线性增益系数
    #[inline]
    pub fn gain(&self) -> f32 {
        (self.gain_percent / 100.0) as f32
    }

    /// 归一化目标的线性值（不超过满刻度 1.0）
    pub fn normalize_target(&self) -> Option<f64> {
        self.normalize_db.map(|db| db_to_linear(db).min(1.0))
    }

    #[inline]
    pub fn crossfade_enabled(&self) -> bool {
        self.crossfade_ms > 0
    }

    /// 校验数值参数
    pub fn validate(&self) -> AudioResult<()> {
        if !self.gain_percent.is_finite() || self.gain_percent < 0.0 {
            return Err(error::invalid_input(
                "--gain-pct 必须是非负有限数",
                self.gain_percent,
            ));
        }
        if let Some(db) = self.normalize_db
            && !db.is_finite()
        {
            return Err(error::invalid_input("--normalize 必须是有限数", db));
        }
        Ok(())
    }
}
