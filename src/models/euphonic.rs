//! # euphonic 目标数据模型
//!
//! euphonic `Crystal` 和 `ForceConstants` 的最小对应：只包含写出 JSON
//! 所需的字段，带单位的量用 [`Quantity`] 包装。
//!
//! ## 依赖关系
//! - 由 `converters/assemble.rs` 构建
//! - 被 `parsers/euphonic_json.rs` 序列化

use super::units::Unit;
use crate::utils::linalg::{self, IMat3, Mat3};

/// 带单位的数值
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity<T> {
    pub magnitude: T,
    pub unit: Unit,
}

impl<T> Quantity<T> {
    pub fn new(magnitude: T, unit: Unit) -> Self {
        Quantity { magnitude, unit }
    }
}

/// euphonic 晶体
#[derive(Debug, Clone, PartialEq)]
pub struct Crystal {
    pub cell_vectors: Quantity<Mat3>,
    pub atom_r: Vec<[f64; 3]>,
    pub atom_type: Vec<String>,
    pub atom_mass: Quantity<Vec<f64>>,
}

impl Crystal {
    pub fn n_atoms(&self) -> usize {
        self.atom_r.len()
    }
}

/// euphonic 力常数（cell phase 约定）
#[derive(Debug, Clone, PartialEq)]
pub struct ForceConstants {
    pub crystal: Crystal,

    /// 形状 (n_cells_in_sc, 3 * n_atoms, 3 * n_atoms)
    pub force_constants: Quantity<Vec<Vec<Vec<f64>>>>,

    /// 超胞晶格行向量 = sc_matrix · 原胞晶格
    pub sc_matrix: IMat3,

    /// 每个原胞像在超胞中的原点（原胞分数坐标）
    pub cell_origins: Vec<[i32; 3]>,
}

impl ForceConstants {
    pub fn n_cells_in_sc(&self) -> usize {
        linalg::det_i(&self.sc_matrix).unsigned_abs() as usize
    }
}
