use crate::bmp::BmpImage;
use crate::capacity::validate_span;
use crate::constants::{LENGTH_PREFIX_BITS, MAX_DECODED_LENGTH};
use crate::error::{Result, StegoError};

fn payload_bits(payload: &[u8]) -> impl Iterator<Item = u8> + '_ {
    payload
        .iter()
        .flat_map(|&byte| (0..8).map(move |bit| (byte >> bit) & 1))
}

fn prefix_bits(length: u32) -> impl Iterator<Item = u8> {
    (0..LENGTH_PREFIX_BITS).map(move |bit| ((length >> bit) & 1) as u8)
}

fn write_bit(pix: &mut [u8], index: usize, bit: u8) -> Result<()> {
    let len = pix.len();
    match pix.get_mut(index) {
        Some(byte) => {
            *byte = (*byte & 0xFE) | bit;
            Ok(())
        }
        None => Err(StegoError::OutOfBounds { index, len }),
    }
}

fn read_bit(pix: &[u8], index: usize) -> Result<u8> {
    pix.get(index)
        .map(|byte| byte & 1)
        .ok_or(StegoError::OutOfBounds {
            index,
            len: pix.len(),
        })
}

fn check_declared_length(length: usize) -> Result<()> {
    if length == 0 || length > MAX_DECODED_LENGTH {
        return Err(StegoError::InvalidLength(length as u64));
    }
    Ok(())
}

/// direct 方法：自 `start` 起每个像素字节承载一位，先写 32 位长度前缀
/// （低位在前），再逐字节写入载荷（每字节同样低位在前）。
pub fn embed_direct(pix: &mut [u8], start: usize, payload: &[u8]) -> Result<()> {
    let slots = LENGTH_PREFIX_BITS + payload.len() * 8;
    validate_span(start, slots, 1, pix.len())?;

    for (slot, bit) in prefix_bits(payload.len() as u32)
        .chain(payload_bits(payload))
        .enumerate()
    {
        write_bit(pix, start + slot, bit)?;
    }
    Ok(())
}

/// direct 方法的逆过程：读出长度前缀并校验其可信度，
/// 再按声明的长度取回载荷字节。
pub fn extract_direct(pix: &[u8], start: usize) -> Result<Vec<u8>> {
    if pix.len() < LENGTH_PREFIX_BITS || start > pix.len() - LENGTH_PREFIX_BITS {
        return Err(StegoError::OutOfBounds {
            index: start,
            len: pix.len(),
        });
    }

    let mut length: u32 = 0;
    for bit in 0..LENGTH_PREFIX_BITS {
        length |= (read_bit(pix, start + bit)? as u32) << bit;
    }
    check_declared_length(length as usize)?;

    collect_bytes(pix, length as usize, |slot| {
        Some(start + LENGTH_PREFIX_BITS + slot)
    })
}

/// channel 方法：自 `start` 字节（某个像素的蓝色通道）起，
/// 每个颜色通道承载一位；长度不写入载体，由密钥记录。
pub fn embed_channel(pix: &mut [u8], start: usize, payload: &[u8]) -> Result<()> {
    validate_span(start, payload.len() * 8, 1, pix.len())?;

    for (slot, bit) in payload_bits(payload).enumerate() {
        write_bit(pix, start + slot, bit)?;
    }
    Ok(())
}

/// channel 方法的逆过程：按密钥给出的起点与长度取回载荷。
pub fn extract_channel(pix: &[u8], start: usize, length: usize) -> Result<Vec<u8>> {
    check_declared_length(length)?;
    collect_bytes(pix, length, |slot| start.checked_add(slot))
}

/// stride 方法：按步长跳过像素，仅改写所选像素红色通道的最低位。
/// 长度与步长均由密钥记录。
pub fn embed_stride(image: &mut BmpImage, step: usize, payload: &[u8]) -> Result<()> {
    debug_assert!(step >= 1);
    validate_span(0, payload.len() * 8, step, image.pixel_count())?;

    for (slot, bit) in payload_bits(payload).enumerate() {
        let index = image.red_channel_index(slot * step);
        write_bit(&mut image.pixels, index, bit)?;
    }
    Ok(())
}

/// stride 方法的逆过程。
pub fn extract_stride(image: &BmpImage, step: usize, length: usize) -> Result<Vec<u8>> {
    debug_assert!(step >= 1);
    check_declared_length(length)?;

    let pixel_count = image.pixel_count();
    collect_bytes(&image.pixels, length, |slot| {
        slot.checked_mul(step)
            .filter(|&pixel| pixel < pixel_count)
            .map(|pixel| image.red_channel_index(pixel))
    })
}

fn collect_bytes(
    pix: &[u8],
    length: usize,
    mut slot_index: impl FnMut(usize) -> Option<usize>,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(length);
    for byte_idx in 0..length {
        let mut value = 0u8;
        for bit in 0..8 {
            let truncated = StegoError::TruncatedPayload {
                declared: length,
                recovered: byte_idx,
            };
            let Some(index) = slot_index(byte_idx * 8 + bit) else {
                return Err(truncated);
            };
            let Some(byte) = pix.get(index) else {
                return Err(truncated);
            };
            value |= (byte & 1) << bit;
        }
        out.push(value);
    }
    Ok(out)
}
