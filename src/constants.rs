/// BMP 文件头（"BM" 头）的大小（字节）。
pub const FILE_HEADER_SIZE: usize = 14;

/// BITMAPINFOHEADER 的标准大小（字节）。
pub const INFO_HEADER_SIZE: usize = 40;

/// 每像素的字节数（24 位 BMP，B、G、R 各占一个字节）。
pub const BYTES_PER_PIXEL: usize = 3;

/// 嵌入的长度前缀所占的位数。
/// direct 方法将载荷的字节长度以 32 位无符号整数（低位在前）写入载体。
pub const LENGTH_PREFIX_BITS: usize = 32;

/// 解码时允许的最大载荷长度（字节）。
/// 当密钥或起始位置错误时，读出的长度往往只是噪声；
/// 超过该上限的长度一律视为无效。
pub const MAX_DECODED_LENGTH: usize = 1000;

/// channel 方法允许隐藏的最大载荷长度（字节）。
pub const CHANNEL_MAX_PAYLOAD: usize = 100;
