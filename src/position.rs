//! # 起始位置选择模块
//!
//! 编码方随机选取嵌入起点，让载荷的位置本身也成为需要密钥才能知晓
//! 的信息。核心算法只接受显式的起点参数；随机性集中在这里，由处理
//! 层调用，测试与命令行则可以传入固定值获得确定性结果。

use rand::Rng;

/// 在 `0..=max_start` 中随机选取一个嵌入起点。
pub fn random_start(max_start: usize) -> usize {
    rand::rng().random_range(0..=max_start)
}
