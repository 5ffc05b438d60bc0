//! # 密钥文件模块
//!
//! 密钥是连接一次编码与一次解码的唯一桥梁：direct 方法记录起始字节
//! 下标（长度已编码在载体中）；channel 方法记录起始像素坐标与载荷
//! 长度；stride 方法记录步长与载荷长度。格式为纯文本，字段数量或
//! 格式不符即判定为密钥损坏，解码在缺少有效密钥时一律拒绝进行。

use crate::error::{Result, StegoError};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// 一次编码产生的定位信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKey {
    /// `"<start>"`：载荷（含长度前缀）从该字节下标开始。
    Direct { start: usize },
    /// `"<x> <y> <length>"`：起始像素坐标与载荷字节数。
    Channel { x: u32, y: u32, length: usize },
    /// `"STEP: <n>"` 与 `"LENGTH: <n>"` 两行：步长与载荷字节数。
    Stride { step: usize, length: usize },
}

impl PlacementKey {
    /// 将密钥写入文本文件。
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = match self {
            Self::Direct { start } => format!("{start}\n"),
            Self::Channel { x, y, length } => format!("{x} {y} {length}\n"),
            Self::Stride { step, length } => format!("STEP: {step}\nLENGTH: {length}\n"),
        };
        fs::write(path, text)?;
        Ok(())
    }
}

/// 读取 direct 方法的密钥：单个整数，即起始字节下标。
pub fn read_direct(path: &Path) -> Result<usize> {
    let fields = read_fields(path, 1)?;
    parse(&fields[0])
}

/// 读取 channel 方法的密钥：`x y length` 三个整数。
pub fn read_channel(path: &Path) -> Result<(u32, u32, usize)> {
    let fields = read_fields(path, 3)?;
    Ok((parse(&fields[0])?, parse(&fields[1])?, parse(&fields[2])?))
}

/// 读取 stride 方法的密钥：`STEP:` 与 `LENGTH:` 两行。
pub fn read_stride(path: &Path) -> Result<(usize, usize)> {
    let text = fs::read_to_string(path)?;
    let mut step = None;
    let mut length = None;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("STEP:") {
            step = Some(parse(rest.trim())?);
        } else if let Some(rest) = line.strip_prefix("LENGTH:") {
            length = Some(parse(rest.trim())?);
        }
    }
    match (step, length) {
        (Some(0), Some(_)) => Err(StegoError::KeyFormat("step must be at least 1".into())),
        (Some(step), Some(length)) => Ok((step, length)),
        _ => Err(StegoError::KeyFormat(
            "expected STEP and LENGTH lines".into(),
        )),
    }
}

fn parse<T: FromStr>(field: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| StegoError::KeyFormat(format!("invalid integer field '{field}'")))
}

fn read_fields(path: &Path, expected: usize) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let fields: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    if fields.len() != expected {
        return Err(StegoError::KeyFormat(format!(
            "expected {expected} fields, found {}",
            fields.len()
        )));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn direct_key_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("direct_key");

        PlacementKey::Direct { start: 1234 }.write(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1234\n");
        assert_eq!(read_direct(&path).unwrap(), 1234);
    }

    #[test]
    fn channel_key_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("channel_key");

        PlacementKey::Channel {
            x: 17,
            y: 3,
            length: 42,
        }
        .write(&path)
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "17 3 42\n");
        assert_eq!(read_channel(&path).unwrap(), (17, 3, 42));
    }

    #[test]
    fn stride_key_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stegano_key");

        PlacementKey::Stride {
            step: 5,
            length: 99,
        }
        .write(&path)
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "STEP: 5\nLENGTH: 99\n");
        assert_eq!(read_stride(&path).unwrap(), (5, 99));
    }

    #[test]
    fn wrong_field_count_is_a_key_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "1 2\n").unwrap();

        assert!(matches!(
            read_channel(&path).unwrap_err(),
            StegoError::KeyFormat(_)
        ));
        assert!(matches!(
            read_direct(&path).unwrap_err(),
            StegoError::KeyFormat(_)
        ));
    }

    #[test]
    fn non_integer_fields_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "12 abc 9\n").unwrap();

        assert!(matches!(
            read_channel(&path).unwrap_err(),
            StegoError::KeyFormat(_)
        ));
    }

    #[test]
    fn stride_key_requires_both_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "STEP: 4\n").unwrap();

        assert!(matches!(
            read_stride(&path).unwrap_err(),
            StegoError::KeyFormat(_)
        ));
    }

    #[test]
    fn stride_key_rejects_zero_step() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "STEP: 0\nLENGTH: 9\n").unwrap();

        assert!(matches!(
            read_stride(&path).unwrap_err(),
            StegoError::KeyFormat(_)
        ));
    }

    #[test]
    fn missing_key_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope");

        assert!(matches!(
            read_direct(&path).unwrap_err(),
            StegoError::Io(_)
        ));
    }
}
