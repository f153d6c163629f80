//! 文件边界交叉淡化
//!
//! 线性插值：`out[k] = (1 − k/n)·tail[k] + (k/n)·head[k]`。
//! 直接作用于交错流，`k` 与 `n` 都按交错样本计数。
//!
//! [`CrossfadeFold`] 把每个文件划分为互不重叠的三段
//! {混合头部, 中段, 保留尾部}，扫描与写入两遍使用同一个折叠逻辑，
//! 因此扫描得到的样本总数与写入的样本数严格一致。

use crate::error::AudioResult;

/// 淡化窗口的交错样本数：`round(rate × ms / 1000) × channels`
pub fn fade_window_samples(sample_rate: u32, channels: u16, crossfade_ms: u32) -> usize {
    if crossfade_ms == 0 {
        return 0;
    }
    let frames = (sample_rate as f64 * crossfade_ms as f64 / 1000.0).round() as usize;
    frames * channels as usize
}

#[inline]
fn blend_sample(tail: f32, head: f32, k: usize, n: usize) -> f32 {
    let alpha = k as f64 / n as f64;
    ((1.0 - alpha) * tail as f64 + alpha * head as f64) as f32
}

/// 混合前一文件尾部与后一文件头部的前 `n` 个样本
///
/// `n` 超过任一输入长度时按较短者截断。
pub fn blend(tail: &[f32], head: &[f32], n: usize) -> Vec<f32> {
    let n = n.min(tail.len()).min(head.len());
    (0..n).map(|k| blend_sample(tail[k], head[k], k, n)).collect()
}

/// 混合段的峰值（不分配内存）
pub fn blend_peak(tail: &[f32], head: &[f32]) -> f64 {
    let n = tail.len().min(head.len());
    (0..n)
        .map(|k| (blend_sample(tail[k], head[k], k, n) as f64).abs())
        .fold(0.0, f64::max)
}

/// 未混合段的峰值
pub fn slice_peak(amplitudes: &[f32]) -> f64 {
    amplitudes
        .iter()
        .map(|&a| (a as f64).abs())
        .fold(0.0, f64::max)
}

/// 边界处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// 第一个文件，之前没有边界
    Opening,
    /// 保留的尾部与本文件头部做了交叉淡化
    Blended,
    /// 直接拼接（淡化关闭或某一侧长度不足一个窗口）
    Abutted,
}

/// 边界决策：纯函数，只取决于保留尾部、下一个文件长度和窗口大小
pub fn boundary_decision(
    carried_tail: Option<usize>,
    next_len: usize,
    window: usize,
    is_first: bool,
) -> BoundaryKind {
    if is_first {
        return BoundaryKind::Opening;
    }
    match carried_tail {
        Some(tail_len) if window > 0 && tail_len >= window && next_len >= window => {
            BoundaryKind::Blended
        }
        _ => BoundaryKind::Abutted,
    }
}

/// 是否需要保留本文件末尾一个窗口留给下一个边界
#[inline]
pub fn holds_tail(remaining_len: usize, window: usize, is_last: bool) -> bool {
    window > 0 && !is_last && remaining_len >= window
}

/// 折叠输出端：接收按文件顺序产出的幅度片段
pub trait AmplitudeSink {
    /// 未混合片段
    fn emit(&mut self, run: &[f32]) -> AudioResult<()>;

    /// 混合片段（默认实现先混合再走 [`emit`](Self::emit)）
    fn emit_blend(&mut self, tail: &[f32], head: &[f32]) -> AudioResult<()> {
        let mixed = blend(tail, head, tail.len().min(head.len()));
        self.emit(&mixed)
    }
}

/// 交叉淡化折叠状态
///
/// 每一遍各自持有一个实例，两遍之间不共享。
#[derive(Debug, Default)]
pub struct CrossfadeFold {
    window: usize,
    carry: Option<Vec<f32>>,
    files_seen: usize,
    blended: usize,
}

impl CrossfadeFold {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// 已完成交叉淡化的边界数
    #[inline]
    pub fn blended_boundaries(&self) -> usize {
        self.blended
    }

    #[inline]
    pub fn has_carry(&self) -> bool {
        self.carry.is_some()
    }

    /// 处理一个文件
    ///
    /// 已保留的尾部要么与本文件头部混合，要么原样输出；随后输出本文件的中段，
    /// 如果不是最后一个文件且剩余长度足够，再把末尾一个窗口保留给下一个边界。
    pub fn step<S: AmplitudeSink + ?Sized>(
        &mut self,
        amplitudes: &[f32],
        is_last: bool,
        sink: &mut S,
    ) -> AudioResult<BoundaryKind> {
        let n = self.window;
        let carry = self.carry.take();
        let kind = boundary_decision(
            carry.as_ref().map(Vec::len),
            amplitudes.len(),
            n,
            self.files_seen == 0,
        );
        self.files_seen += 1;

        let mut start = 0;
        match (kind, carry) {
            (BoundaryKind::Blended, Some(tail)) => {
                sink.emit_blend(&tail, &amplitudes[..n])?;
                self.blended += 1;
                start = n;
            }
            (_, Some(tail)) => sink.emit(&tail)?,
            (_, None) => {}
        }

        let remaining = amplitudes.len() - start;
        if holds_tail(remaining, n, is_last) {
            let split = amplitudes.len() - n;
            sink.emit(&amplitudes[start..split])?;
            self.carry = Some(amplitudes[split..].to_vec());
        } else {
            sink.emit(&amplitudes[start..])?;
        }

        Ok(kind)
    }

    /// 输出仍保留着的尾部（最后一个文件未标记 is_last 时兜底）
    pub fn finish<S: AmplitudeSink + ?Sized>(&mut self, sink: &mut S) -> AudioResult<()> {
        if let Some(tail) = self.carry.take() {
            sink.emit(&tail)?;
        }
        Ok(())
    }
}
