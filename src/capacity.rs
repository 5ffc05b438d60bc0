//! # 容量规划模块
//!
//! 在改动任何像素之前回答两个问题：这幅图最多能藏多少字节，
//! 以及给定的载荷、起点与步长组合是否放得下。
//! 所有嵌入方法共用同一个 [`validate_span`]，首位与末位槽位
//! 的越界同样会被拒绝。

use crate::constants::LENGTH_PREFIX_BITS;
use crate::error::{Result, StegoError};

/// 校验一段等距槽位是否完全落在 `bound` 之内。
///
/// `start` 为首个槽位下标，`slots` 为所需槽位数，`stride` 为相邻槽位
/// 的间距。要求 `start + (slots - 1) * stride < bound`。
/// 所有算术均为受检运算，恶意输入不会回绕。
pub fn validate_span(start: usize, slots: usize, stride: usize, bound: usize) -> Result<()> {
    debug_assert!(stride >= 1);
    if slots == 0 {
        return Ok(());
    }
    let last = (slots - 1)
        .checked_mul(stride)
        .and_then(|span| start.checked_add(span));
    match last {
        Some(last) if last < bound => Ok(()),
        _ => Err(StegoError::Capacity {
            required: slots,
            available: available_slots(start, stride, bound),
        }),
    }
}

/// `start` 起、间距 `stride` 的可用槽位数。
pub fn available_slots(start: usize, stride: usize, bound: usize) -> usize {
    if start >= bound {
        0
    } else {
        (bound - 1 - start) / stride + 1
    }
}

/// direct 方法的最大载荷（字节）：每个像素字节承载一位，
/// 前 32 位留给长度前缀。
pub fn direct_capacity(data_len: usize) -> usize {
    data_len.saturating_sub(LENGTH_PREFIX_BITS) / 8
}

/// channel 方法的最大载荷（字节）：每个颜色通道承载一位，
/// 长度记录在密钥中，不占用载体。
pub fn channel_capacity(pixel_count: usize) -> usize {
    pixel_count * 3 / 8
}

/// stride 方法在给定步长下的最大载荷（字节）。
pub fn stride_capacity(pixel_count: usize, step: usize) -> usize {
    available_slots(0, step, pixel_count) / 8
}
