//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。只有一个命令，没有子命令：
//! `phonopy2euphonic [PHONOPY_YAML] [OUTPUT_JSON]`
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert

pub mod convert;

use clap::Parser;

/// phonopy2euphonic - phonopy 力常数转换为 euphonic JSON
#[derive(Parser)]
#[command(name = "phonopy2euphonic")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Convert phonopy force constants (phonopy.yaml + optional HDF5) to euphonic JSON",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub args: convert::ConvertArgs,
}
