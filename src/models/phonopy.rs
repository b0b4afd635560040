//! # phonopy 力常数模型
//!
//! Loader 输出的源模型：原胞、超胞、两者之间的索引映射以及力常数张量。
//! 所有量已换算为 Å / amu / eV·Å⁻²。
//!
//! ## 依赖关系
//! - 由 `parsers/phonopy_yaml.rs` 构建
//! - 被 `converters/` 使用

use super::structure::Cell;
use super::units::PhysicalUnits;
use crate::error::{ConvertError, Result};
use crate::utils::linalg::{IMat3, Mat3};

/// 3x3 力常数块
pub type FcBlock = [[f64; 3]; 3];

/// 力常数张量，形状 (n_rows, n_cols, 3, 3)
///
/// phonopy 的 "full" 格式 n_rows == 超胞原子数，
/// "compact" 格式 n_rows == 原胞原子数（按 `p2s_map` 顺序）。
#[derive(Debug, Clone, PartialEq)]
pub struct ForceConstantArray {
    pub n_rows: usize,
    pub n_cols: usize,
    blocks: Vec<FcBlock>,
}

impl ForceConstantArray {
    pub fn new(n_rows: usize, n_cols: usize, blocks: Vec<FcBlock>) -> Result<Self> {
        if blocks.len() != n_rows * n_cols {
            return Err(ConvertError::InconsistentModel(format!(
                "force constants shape ({}, {}) needs {} blocks, found {}",
                n_rows,
                n_cols,
                n_rows * n_cols,
                blocks.len()
            )));
        }
        Ok(ForceConstantArray {
            n_rows,
            n_cols,
            blocks,
        })
    }

    /// 从按 (i, j, a, b) 展平的数组构建
    pub fn from_flat(n_rows: usize, n_cols: usize, data: &[f64]) -> Result<Self> {
        if data.len() != n_rows * n_cols * 9 {
            return Err(ConvertError::InconsistentModel(format!(
                "force constants shape ({}, {}, 3, 3) needs {} values, found {}",
                n_rows,
                n_cols,
                n_rows * n_cols * 9,
                data.len()
            )));
        }
        let blocks = data
            .chunks_exact(9)
            .map(|c| [[c[0], c[1], c[2]], [c[3], c[4], c[5]], [c[6], c[7], c[8]]])
            .collect();
        Self::new(n_rows, n_cols, blocks)
    }

    pub fn block(&self, i: usize, j: usize) -> &FcBlock {
        &self.blocks[i * self.n_cols + j]
    }

    pub fn is_compact(&self) -> bool {
        self.n_rows != self.n_cols
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            for block in &mut self.blocks {
                *block = block.map(|row| row.map(|x| x * factor));
            }
        }
        self
    }
}

/// 非解析修正参数（Born 有效电荷 / 介电张量）
#[derive(Debug, Clone, PartialEq)]
pub struct NacParams {
    pub born: Option<Vec<Mat3>>,
    pub dielectric: Option<Mat3>,
    /// 来源描述（YAML 段或 BORN 文件），仅用于报错
    pub origin: String,
}

/// 完整的 phonopy 模型
#[derive(Debug, Clone)]
pub struct PhonopyModel {
    pub unit_cell: Option<Cell>,
    pub primitive: Cell,
    pub supercell: Cell,

    /// phonopy 约定：超胞晶格行向量 = Sᵀ · 单胞晶格
    pub supercell_matrix: IMat3,

    /// 每个原胞原子在超胞中的索引
    pub p2s_map: Vec<usize>,

    /// 每个超胞原子对应原胞原子代表的超胞索引
    pub s2p_map: Vec<usize>,

    pub force_constants: ForceConstantArray,
    pub nac: Option<NacParams>,

    /// 源文件声明的单位
    pub source_units: PhysicalUnits,
}
