//! 样本处理模块
//!
//! 定点/浮点转换与文件边界的交叉淡化。

pub mod crossfade;
pub mod sample_conversion;

pub use crossfade::{AmplitudeSink, BoundaryKind, CrossfadeFold, fade_window_samples};
pub use sample_conversion::{db_to_linear, linear_to_db, to_amplitude, to_fixed};
