//! # bmp_hide 库
//!
//! 本库包含 BMP LSB 隐写工具的核心逻辑。

// 声明库包含的所有模块。

pub mod bmp;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod key;
pub mod position;
pub mod steganography;
