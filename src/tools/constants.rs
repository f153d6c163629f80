//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 默认配置值
pub mod defaults {
    /// 默认输入目录
    pub const SOURCE_DIR: &str = "Raw";

    /// 默认输出文件（相对于工作目录）
    pub const OUTPUT_PATH: &str = "Result/merged.wav";

    /// 默认增益百分比
    pub const GAIN_PERCENT: f64 = 100.0;

    /// 默认进度条宽度（字符）
    pub const BAR_WIDTH: usize = 80;
}

/// 进度条限制
pub mod bar_limits {
    /// 最小进度条宽度
    ///
    /// 更窄的进度条无法表达进度
    pub const MIN_BAR_WIDTH: usize = 10;
}

/// 输入文件扩展名（不区分大小写）
pub const WAV_EXTENSION: &str = "wav";
