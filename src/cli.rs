//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::bmp::PixelLayout;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// 一款面向未压缩 24 位 BMP 图像的 LSB 隐写命令行工具，提供三种嵌入方法，用于在图像中隐藏或恢复文本。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款面向未压缩 24 位 BMP 图像的 LSB 隐写命令行工具，提供三种嵌入方法，用于在图像中隐藏或恢复文本。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏) 和 recover (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 24 位 BMP 图像中隐藏文本文件内容。
    Hide(HideArgs),

    /// 依据密钥从经过隐写的图像中恢复隐藏的文本。
    Recover(RecoverArgs),
}

/// 三种嵌入方法。
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// 每个像素字节的最低位承载一位，载体自带 32 位长度前缀。
    Direct,
    /// 从指定像素起每个颜色通道承载一位，坐标与长度记录在密钥中。
    Channel,
    /// 按固定步长跳过像素，仅改写所选像素红色通道的最低位。
    Stride,
}

impl Method {
    /// 该方法默认的密钥文件名。
    pub fn default_key_name(self) -> &'static str {
        match self {
            Self::Direct => "direct_key",
            Self::Channel => "channel_key",
            Self::Stride => "stride_key",
        }
    }

    /// 该方法使用的像素区布局。
    pub fn layout(self) -> PixelLayout {
        match self {
            Self::Direct | Self::Channel => PixelLayout::Contiguous,
            Self::Stride => PixelLayout::PaddedRows,
        }
    }
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 隐写完成后，保存结果图像的输出路径。
    #[arg(short, long)]
    pub dest: PathBuf,

    /// 使用的嵌入方法。
    #[arg(short, long, value_enum)]
    pub method: Method,

    /// 密钥文件的保存路径；缺省为当前目录下的 "<method>_key"。
    #[arg(short, long)]
    pub key: Option<PathBuf>,

    /// stride 方法的像素步长。
    #[arg(long, default_value_t = 1)]
    pub step: usize,

    /// direct 方法的固定起始字节下标；缺省时随机选择。
    #[arg(long)]
    pub start: Option<usize>,

    /// channel 方法的固定起始像素横坐标；缺省时随机选择。
    #[arg(long, requires = "start_y")]
    pub start_x: Option<u32>,

    /// channel 方法的固定起始像素纵坐标。
    #[arg(long, requires = "start_x")]
    pub start_y: Option<u32>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文本后，保存文本内容的输出路径；缺省时打印到标准输出。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 使用的嵌入方法（须与隐藏时一致）。
    #[arg(short, long, value_enum)]
    pub method: Method,

    /// 密钥文件路径；缺省为当前目录下的 "<method>_key"。
    #[arg(short, long)]
    pub key: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}
