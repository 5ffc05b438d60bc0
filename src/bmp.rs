//! # BMP 容器模块
//!
//! 按字段逐一解析与写出未压缩 24 位 BMP：文件头、信息头、像素区。
//! 解析不依赖任何内存结构布局，所有多字节字段均按小端序读取。
//!
//! 像素区有两种在盘布局：紧凑布局（`width * height * 3` 字节）与
//! 行对齐布局（每行补齐到 4 字节边界）。二者不可互换：
//! 容器以哪种布局读入，就必须以同一布局写出。

use crate::constants::{BYTES_PER_PIXEL, FILE_HEADER_SIZE, INFO_HEADER_SIZE};
use crate::error::{Result, StegoError};
use std::fs;
use std::path::Path;

/// 像素区的在盘布局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 连续的 BGR 三元组，不含任何行填充。
    Contiguous,
    /// 每行补齐到 4 字节边界（BMP 标准布局）。
    PaddedRows,
}

/// 一幅载入内存的 24 位 BMP 图像。
///
/// `prefix` 保存像素区之前的全部原始字节（文件头、信息头以及可能存在的
/// 间隙），保存时原样写回，保证头部逐字节不变。像素缓冲由容器独占，
/// 嵌入操作直接在其上改写。
#[derive(Debug, Clone)]
pub struct BmpImage {
    prefix: Vec<u8>,
    width: u32,
    height: u32,
    layout: PixelLayout,
    pub pixels: Vec<u8>,
}

fn field<const N: usize>(raw: &[u8], offset: usize) -> Result<[u8; N]> {
    raw.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or(StegoError::MalformedHeader("file ends inside the header"))
}

fn u16_le(raw: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(field(raw, offset)?))
}

fn u32_le(raw: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(field(raw, offset)?))
}

fn i32_le(raw: &[u8], offset: usize) -> Result<i32> {
    Ok(i32::from_le_bytes(field(raw, offset)?))
}

fn padded_row_stride(width: u32) -> usize {
    let row = width as usize * BYTES_PER_PIXEL;
    row + (4 - row % 4) % 4
}

impl BmpImage {
    /// 从文件读入一幅 24 位未压缩 BMP。
    pub fn load(path: &Path, layout: PixelLayout) -> Result<Self> {
        let raw = fs::read(path)?;
        Self::parse(&raw, layout)
    }

    /// 从原始文件字节解析容器。
    ///
    /// 校验 "BM" 签名、位深、压缩方式与尺寸字段，随后按 `layout`
    /// 要求的长度截取像素区。像素区不足时显式报错，而不是读到哪算哪。
    pub fn parse(raw: &[u8], layout: PixelLayout) -> Result<Self> {
        let signature: [u8; 2] = field(raw, 0)?;
        if &signature != b"BM" {
            return Err(StegoError::BadSignature);
        }

        let data_offset = u32_le(raw, 10)? as usize;
        let width = i32_le(raw, 18)?;
        let height = i32_le(raw, 22)?;
        let bits_per_pixel = u16_le(raw, 28)?;
        let compression = u32_le(raw, 30)?;

        if bits_per_pixel != 24 {
            return Err(StegoError::UnsupportedFormat(
                "only 24-bit BMP files are supported",
            ));
        }
        if compression != 0 {
            return Err(StegoError::UnsupportedFormat(
                "compressed BMP files are not supported",
            ));
        }
        if height < 0 {
            return Err(StegoError::UnsupportedFormat(
                "top-down (negative height) BMP files are not supported",
            ));
        }
        if width <= 0 || height == 0 {
            return Err(StegoError::MalformedHeader(
                "image dimensions must be positive",
            ));
        }
        if data_offset < FILE_HEADER_SIZE + INFO_HEADER_SIZE || data_offset > raw.len() {
            return Err(StegoError::MalformedHeader(
                "pixel data offset is out of range",
            ));
        }

        let width = width as u32;
        let height = height as u32;
        let expected = match layout {
            PixelLayout::Contiguous => width as usize * height as usize * BYTES_PER_PIXEL,
            PixelLayout::PaddedRows => padded_row_stride(width) * height as usize,
        };
        let region = &raw[data_offset..];
        if region.len() < expected {
            return Err(StegoError::ShortPixelData {
                expected,
                found: region.len(),
            });
        }

        Ok(Self {
            prefix: raw[..data_offset].to_vec(),
            width,
            height,
            layout,
            pixels: region[..expected].to_vec(),
        })
    }

    /// 将容器写回磁盘：头部原样写出，像素区沿用读入时的布局。
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = Vec::with_capacity(self.prefix.len() + self.pixels.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&self.pixels);
        fs::write(path, out)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// 图像的像素总数。
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 行对齐布局下一行占用的字节数。
    pub fn row_stride(&self) -> usize {
        padded_row_stride(self.width)
    }

    /// 行尾的填充字节数：`(4 - (width * 3) % 4) % 4`。
    pub fn row_padding(&self) -> usize {
        (4 - (self.width as usize * BYTES_PER_PIXEL) % 4) % 4
    }

    /// 紧凑布局下，像素 (x, y) 首个通道字节（蓝色）的下标。
    pub fn channel_index(&self, x: u32, y: u32) -> usize {
        debug_assert_eq!(self.layout, PixelLayout::Contiguous);
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// 按行优先编号的像素 `pixel` 的红色通道在像素缓冲中的下标。
    /// 行对齐布局下会跳过每行末尾的填充字节。
    pub fn red_channel_index(&self, pixel: usize) -> usize {
        match self.layout {
            PixelLayout::Contiguous => pixel * BYTES_PER_PIXEL + 2,
            PixelLayout::PaddedRows => {
                let row = pixel / self.width as usize;
                let col = pixel % self.width as usize;
                row * self.row_stride() + col * BYTES_PER_PIXEL + 2
            }
        }
    }
}

/// 构造一个最小的 24 位 BMP 文件字节序列，供各模块的测试使用。
#[cfg(test)]
pub(crate) fn test_file(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
    test_file_with(width, height, 24, 0, pixels)
}

#[cfg(test)]
pub(crate) fn test_file_with(
    width: i32,
    height: i32,
    bits_per_pixel: u16,
    compression: u32,
    pixels: &[u8],
) -> Vec<u8> {
    let mut raw = Vec::with_capacity(54 + pixels.len());
    raw.extend_from_slice(b"BM");
    raw.extend_from_slice(&((54 + pixels.len()) as u32).to_le_bytes());
    raw.extend_from_slice(&[0u8; 4]);
    raw.extend_from_slice(&54u32.to_le_bytes());
    raw.extend_from_slice(&40u32.to_le_bytes());
    raw.extend_from_slice(&width.to_le_bytes());
    raw.extend_from_slice(&height.to_le_bytes());
    raw.extend_from_slice(&1u16.to_le_bytes());
    raw.extend_from_slice(&bits_per_pixel.to_le_bytes());
    raw.extend_from_slice(&compression.to_le_bytes());
    raw.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
    raw.extend_from_slice(&[0u8; 16]);
    raw.extend_from_slice(pixels);
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contiguous_pixels() {
        let pixels: Vec<u8> = (0..24).collect();
        let raw = test_file(4, 2, &pixels);

        let image = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        assert_eq!(image.pixel_count(), 8);
        assert_eq!(image.pixels, pixels);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut raw = test_file(4, 2, &[0; 24]);
        raw[0] = b'X';

        let err = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap_err();
        assert!(matches!(err, StegoError::BadSignature));
    }

    #[test]
    fn rejects_non_24_bit_depth() {
        let raw = test_file_with(4, 2, 32, 0, &[0; 32]);

        let err = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_compressed_files() {
        let raw = test_file_with(4, 2, 24, 1, &[0; 24]);

        let err = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_top_down_images() {
        let raw = test_file(4, -2, &[0; 24]);

        let err = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_short_pixel_region() {
        let raw = test_file(4, 2, &[0; 20]);

        let err = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap_err();
        assert!(matches!(
            err,
            StegoError::ShortPixelData {
                expected: 24,
                found: 20
            }
        ));
    }

    #[test]
    fn rejects_header_shorter_than_declared() {
        let raw = test_file(4, 2, &[0; 24]);

        let err = BmpImage::parse(&raw[..20], PixelLayout::Contiguous).unwrap_err();
        assert!(matches!(err, StegoError::MalformedHeader(_)));
    }

    #[test]
    fn accounts_for_row_padding() {
        // 宽 3 像素一行占 9 字节，需补 3 字节到 12。
        let raw = test_file(3, 2, &[0xAA; 24]);

        let image = BmpImage::parse(&raw, PixelLayout::PaddedRows).unwrap();
        assert_eq!(image.row_stride(), 12);
        assert_eq!(image.row_padding(), 3);
        assert_eq!(image.pixels.len(), 24);
        // 第二行第一个像素的红色通道要跳过第一行的填充。
        assert_eq!(image.red_channel_index(3), 14);
    }

    #[test]
    fn red_channel_index_is_linear_without_padding() {
        let raw = test_file(4, 2, &[0; 24]);

        let image = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap();
        assert_eq!(image.red_channel_index(0), 2);
        assert_eq!(image.red_channel_index(5), 17);
    }

    #[test]
    fn save_round_trips_byte_for_byte() {
        let pixels: Vec<u8> = (0..48).map(|i| i as u8 ^ 0x5C).collect();
        let raw = test_file(4, 4, &pixels);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.bmp");

        let image = BmpImage::parse(&raw, PixelLayout::Contiguous).unwrap();
        image.save(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), raw);
    }
}
