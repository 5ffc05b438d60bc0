//! # 错误类型模块
//!
//! 定义隐写编解码过程中所有可能的失败情形。
//! 核心模块统一返回本模块中的 [`StegoError`]；
//! 高层处理逻辑（`handler`）在其上用 `anyhow` 附加文件路径等上下文。

use thiserror::Error;

/// 隐写编解码的统一错误类型。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 文件打开、读取或写入失败。
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// 文件缺少 "BM" 签名。
    #[error("not a BMP file (missing 'BM' signature)")]
    BadSignature,

    /// 头部字段不完整或取值不合法。
    #[error("malformed BMP header: {0}")]
    MalformedHeader(&'static str),

    /// 位深不是 24、存在压缩或高度为负。
    #[error("unsupported BMP format: {0}")]
    UnsupportedFormat(&'static str),

    /// 像素区比头部声明的要短。
    #[error("pixel data truncated: expected {expected} bytes, found {found}")]
    ShortPixelData { expected: usize, found: usize },

    /// 载荷与起始位置超出了可用的嵌入槽位。
    #[error("payload does not fit: {required} bit slots required, only {available} available")]
    Capacity { required: usize, available: usize },

    /// 嵌入或提取的目标下标越界。
    #[error("target index {index} is outside the pixel buffer (length {len})")]
    OutOfBounds { index: usize, len: usize },

    /// 解码出的载荷长度不可信。
    #[error("decoded payload length {0} is implausible")]
    InvalidLength(u64),

    /// 像素数据在取满声明长度之前就已结束。
    #[error("hidden data ends after {recovered} of {declared} declared bytes")]
    TruncatedPayload { declared: usize, recovered: usize },

    /// 密钥文件缺失字段或格式不符。
    #[error("malformed key file: {0}")]
    KeyFormat(String),
}

pub type Result<T> = std::result::Result<T, StegoError>;
