//! 样本格式转换
//!
//! 定点 16 位样本与归一化浮点幅度 [-1, 1] 之间的互相转换。
//! 输入端除以 32768 并乘以增益；输出端乘以缩放系数、钳位、再乘以 32767 取整。

/// 输入归一化因子 (2^15)
pub const I16_NORMALIZATION: f32 = 32768.0;

/// 输出满刻度
pub const I16_FULL_SCALE: f64 = 32767.0;

/// i16 → 幅度，并施加增益
#[inline]
pub fn to_amplitude(sample: i16, gain: f32) -> f32 {
    sample as f32 / I16_NORMALIZATION * gain
}

/// 幅度 → i16
///
/// 乘以 `scale` 后钳位到 [-1, 1]，增益或归一化推出满刻度的样本在这里削顶。
#[inline]
pub fn to_fixed(amplitude: f32, scale: f32) -> i16 {
    let value = (amplitude as f64 * scale as f64).clamp(-1.0, 1.0);
    // `as` 对超界值饱和、对 NaN 取 0
    (value * I16_FULL_SCALE).round() as i16
}

/// 整段样本转换为幅度
pub fn samples_to_amplitudes(samples: &[i16], gain: f32) -> Vec<f32> {
    samples.iter().map(|&s| to_amplitude(s, gain)).collect()
}

/// 整段幅度转换为定点样本，复用调用方的缓冲区
pub fn amplitudes_to_fixed_into(amplitudes: &[f32], scale: f32, out: &mut Vec<i16>) {
    out.clear();
    out.extend(amplitudes.iter().map(|&a| to_fixed(a, scale)));
}

/// dBFS → 线性比例
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// 线性比例 → dBFS
#[inline]
pub fn linear_to_db(value: f64) -> f64 {
    if value > 0.0 {
        20.0 * value.log10()
    } else {
        -f64::INFINITY
    }
}
