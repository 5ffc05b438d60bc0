//! # 命令处理逻辑模块
//!
//! 包含处理 `hide` 和 `recover` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、容量检查、调用核心隐写算法以及向用户报告结果。
//!
//! 处理流程是严格线性的：载入 → 校验 → 修改内存中的像素 → 写盘。
//! 容量校验发生在任何像素被改动之前；只有嵌入完全成功后才会写出
//! 目标图像，失败的编码不会留下半成品文件。

use crate::bmp::BmpImage;
use crate::capacity::{channel_capacity, direct_capacity, stride_capacity};
use crate::cli::{HideArgs, Method, RecoverArgs};
use crate::constants::{BYTES_PER_PIXEL, CHANNEL_MAX_PAYLOAD, LENGTH_PREFIX_BITS};
use crate::key::{self, PlacementKey};
use crate::position::random_start;
use crate::steganography::{
    embed_channel, embed_direct, embed_stride, extract_channel, extract_direct, extract_stride,
};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、检查隐写空间是否足够、选定嵌入起点、
/// 调用相应方法的核心隐写函数，最后写出结果图像与密钥文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件，或文本文件为空。
/// * 输出文件已存在且未指定 `--force`。
/// * 图像没有足够的空间容纳文本，或指定的起点放不下整个载荷。
/// * 无法写入目标图像或密钥文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let payload = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;
    anyhow::ensure!(!payload.is_empty(), "The text file is empty, nothing to hide.");

    ensure_writable(&args.dest, args.force)?;

    let mut image = BmpImage::load(&args.image, args.method.layout()).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let key = match args.method {
        Method::Direct => hide_direct(&mut image, &payload, args.start)?,
        Method::Channel => hide_channel(&mut image, &payload, args.start_x.zip(args.start_y))?,
        Method::Stride => hide_stride(&mut image, &payload, args.step)?,
    };

    image.save(&args.dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            args.dest.to_string_lossy().red().bold()
        )
    })?;

    let key_path = key_path(&args.key, args.method);
    key.write(&key_path).with_context(|| {
        format!(
            "Unable to write key file: {}",
            key_path.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        args.dest.to_string_lossy().green().bold()
    );
    println!(
        "Key information saved to: {}",
        key_path.to_string_lossy().green().bold()
    );

    Ok(())
}

/// direct 方法：自长度前缀起逐字节写入，起点记录在密钥中。
fn hide_direct(image: &mut BmpImage, payload: &[u8], start: Option<usize>) -> Result<PlacementKey> {
    let data_len = image.pixels.len();
    let capacity = direct_capacity(data_len);
    anyhow::ensure!(
        payload.len() <= capacity,
        "Not enough space in the image to hide the text. \nRequired: {} bytes, Capacity: {} bytes",
        payload.len().to_string().red().bold(),
        capacity.to_string().green().bold()
    );

    let required_bits = LENGTH_PREFIX_BITS + payload.len() * 8;
    let start = start.unwrap_or_else(|| random_start(data_len - required_bits));
    embed_direct(&mut image.pixels, start, payload)?;

    Ok(PlacementKey::Direct { start })
}

/// channel 方法：从选定像素起沿颜色通道连续写入，
/// 坐标与长度记录在密钥中。
fn hide_channel(
    image: &mut BmpImage,
    payload: &[u8],
    origin: Option<(u32, u32)>,
) -> Result<PlacementKey> {
    anyhow::ensure!(
        payload.len() <= CHANNEL_MAX_PAYLOAD,
        "Text too long! Maximum {} bytes allowed for the channel method.",
        CHANNEL_MAX_PAYLOAD.to_string().green().bold()
    );
    let capacity = channel_capacity(image.pixel_count());
    anyhow::ensure!(
        payload.len() <= capacity,
        "Not enough space in the image to hide the text. \nRequired: {} bytes, Capacity: {} bytes",
        payload.len().to_string().red().bold(),
        capacity.to_string().green().bold()
    );

    let (x, y) = match origin {
        Some((x, y)) => {
            anyhow::ensure!(
                x < image.width() && y < image.height(),
                "Start pixel ({}, {}) is outside the image.",
                x.to_string().red().bold(),
                y.to_string().red().bold()
            );
            (x, y)
        }
        None => {
            let max_start_pixel = (image.pixels.len() - payload.len() * 8) / BYTES_PER_PIXEL;
            let pixel = random_start(max_start_pixel);
            (
                (pixel % image.width() as usize) as u32,
                (pixel / image.width() as usize) as u32,
            )
        }
    };

    let start = image.channel_index(x, y);
    embed_channel(&mut image.pixels, start, payload)?;

    Ok(PlacementKey::Channel {
        x,
        y,
        length: payload.len(),
    })
}

/// stride 方法：按步长跳过像素，仅使用红色通道，
/// 步长与长度记录在密钥中。
fn hide_stride(image: &mut BmpImage, payload: &[u8], step: usize) -> Result<PlacementKey> {
    anyhow::ensure!(step >= 1, "The step must be at least 1.");
    let capacity = stride_capacity(image.pixel_count(), step);
    anyhow::ensure!(
        payload.len() <= capacity,
        "The message is too large for the given image and step. \nRequired: {} bytes, Capacity: {} bytes",
        payload.len().to_string().red().bold(),
        capacity.to_string().green().bold()
    );

    embed_stride(image, step, payload)?;

    Ok(PlacementKey::Stride {
        step,
        length: payload.len(),
    })
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取密钥与图像文件、调用相应方法的提取函数重建隐藏的文本，
/// 最后将结果写入输出文件或打印到标准输出。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取密钥文件，或密钥格式不符。
/// * 无法读取输入的图像文件。
/// * 图像中不存在可信的隐藏数据（长度非法、数据被截断或越界）。
/// * 无法写入目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    if let Some(path) = &args.text {
        ensure_writable(path, args.force)?;
    }

    let key_path = key_path(&args.key, args.method);
    let image = BmpImage::load(&args.image, args.method.layout()).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let text = match args.method {
        Method::Direct => {
            let start = key::read_direct(&key_path).with_context(|| key_context(&key_path))?;
            extract_direct(&image.pixels, start).with_context(|| extract_context(&args.image))?
        }
        Method::Channel => {
            let (x, y, length) =
                key::read_channel(&key_path).with_context(|| key_context(&key_path))?;
            anyhow::ensure!(
                x < image.width() && y < image.height(),
                "Key start pixel ({}, {}) is outside the image.",
                x.to_string().red().bold(),
                y.to_string().red().bold()
            );
            let start = image.channel_index(x, y);
            extract_channel(&image.pixels, start, length)
                .with_context(|| extract_context(&args.image))?
        }
        Method::Stride => {
            let (step, length) =
                key::read_stride(&key_path).with_context(|| key_context(&key_path))?;
            extract_stride(&image, step, length).with_context(|| extract_context(&args.image))?
        }
    };

    match &args.text {
        Some(path) => {
            fs::write(path, &text).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    path.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The text has been successfully recovered and saved: {}",
                path.to_string_lossy().green().bold()
            );
        }
        None => {
            println!("{}", String::from_utf8_lossy(&text));
        }
    }

    Ok(())
}

/// 解析密钥文件路径：显式给定的优先，否则用方法的默认文件名。
fn key_path(key: &Option<PathBuf>, method: Method) -> PathBuf {
    key.clone()
        .unwrap_or_else(|| PathBuf::from(method.default_key_name()))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. Use --force to overwrite.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn key_context(path: &Path) -> String {
    format!(
        "Unable to read key file '{}'. \nRecovery cannot proceed without the key produced at hide time.",
        path.to_string_lossy().red().bold()
    )
}

fn extract_context(image: &Path) -> String {
    format!(
        "Failed to recover hidden text from '{}'. \nThe image may not contain a hidden message, or the key does not match it.",
        image.to_string_lossy().red().bold()
    )
}
