//! # 转换参数 CLI 定义
//!
//! phonopy.yaml → euphonic JSON 的位置参数和选项。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// 随包分发的示例数据目录
pub const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// 未指定输入时使用的示例文件名
pub const SAMPLE_INPUT: &str = "Si-phonopy.yaml";

/// 转换参数
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// phonopy.yaml to read [default: <DATA_DIR>/Si-phonopy.yaml]
    pub phonopy_yaml: Option<PathBuf>,

    /// Output euphonic JSON file
    #[arg(default_value = "euphonic-fc.json")]
    pub output_json: PathBuf,

    /// HDF5 force constants to use instead of <seedname>-force_constants.hdf5
    #[arg(long, value_name = "PATH")]
    pub force_constants: Option<PathBuf>,

    /// Directory holding the bundled sample data
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Tolerance for matching supercell atoms to primitive atoms (fractional)
    #[arg(long, default_value_t = 1e-5)]
    pub symprec: f64,

    /// Tolerance for integral cell origins (fractional)
    #[arg(long, default_value_t = 1e-5)]
    pub cell_origins_tol: f64,

    /// Only report errors
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl ConvertArgs {
    /// 实际使用的输入路径
    pub fn input_path(&self) -> PathBuf {
        self.phonopy_yaml
            .clone()
            .unwrap_or_else(|| self.data_dir.join(SAMPLE_INPUT))
    }
}
