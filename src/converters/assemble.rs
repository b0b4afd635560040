//! # phonopy → euphonic 模型组装
//!
//! 由 [`PhonopyModel`] 构建 euphonic 的晶体与力常数记录。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `converters/index_map.rs`, `converters/phases.rs`, `models/`

use super::index_map::s2p_index;
use super::phases::{PhaseInput, PhaseTransform};
use crate::error::{ConvertError, Result};
use crate::models::{Crystal, ForceConstants, PhonopyModel, Quantity, Unit};
use crate::utils::linalg::{self, IMat3};

/// 转换为 euphonic 力常数
///
/// 含非解析修正参数（Born 电荷 / 介电张量）的模型直接拒绝。
pub fn phonopy_to_euphonic(
    model: &PhonopyModel,
    transform: &dyn PhaseTransform,
) -> Result<ForceConstants> {
    if let Some(nac) = &model.nac {
        return Err(ConvertError::Unsupported(format!(
            "Born/dielectric loading not yet implemented (found in {})",
            nac.origin
        )));
    }

    let primitive = &model.primitive;
    let crystal = Crystal {
        cell_vectors: Quantity::new(primitive.lattice.matrix, Unit::Angstrom),
        atom_r: primitive.positions.clone(),
        atom_type: primitive.symbols.clone(),
        atom_mass: Quantity::new(primitive.masses.clone(), Unit::Amu),
    };

    if model.p2s_map.len() != crystal.n_atoms() {
        return Err(ConvertError::InconsistentModel(format!(
            "p2s_map has {} entries but the primitive cell has {} atoms",
            model.p2s_map.len(),
            crystal.n_atoms()
        )));
    }

    let sc_matrix = primitive_supercell_matrix(model)?;

    // 超胞分数坐标换算为原胞晶格单位
    let sc_to_prim = linalg::to_float(&sc_matrix);
    let sc_atom_r: Vec<[f64; 3]> = model
        .supercell
        .positions
        .iter()
        .map(|r| linalg::vec_mat(r, &sc_to_prim))
        .collect();

    let s2p_index = s2p_index(&model.p2s_map, &model.s2p_map)?;

    let converted = transform.convert(&PhaseInput {
        force_constants: &model.force_constants,
        atom_r: &primitive.positions,
        sc_atom_r: &sc_atom_r,
        p2s_map: &model.p2s_map,
        s2p_index: &s2p_index,
        sc_matrix: &sc_matrix,
    })?;

    Ok(ForceConstants {
        crystal,
        force_constants: Quantity::new(converted.force_constants, Unit::EvPerAngstromSquared),
        sc_matrix,
        cell_origins: converted.cell_origins,
    })
}

/// 相对原胞的超胞矩阵（euphonic 约定：超胞晶格 = M · 原胞晶格）
///
/// 原胞即单胞、超胞矩阵为对角时 M 就是 phonopy 的 `supercell_matrix`。
pub fn primitive_supercell_matrix(model: &PhonopyModel) -> Result<IMat3> {
    let inv_prim = linalg::inverse(&model.primitive.lattice.matrix).ok_or_else(|| {
        ConvertError::InconsistentModel("primitive lattice is singular".to_string())
    })?;
    let m = linalg::mat_mul(&model.supercell.lattice.matrix, &inv_prim);

    linalg::round_to_int(&m, 1e-4).ok_or_else(|| {
        ConvertError::InconsistentModel(format!(
            "supercell lattice is not an integer multiple of the primitive lattice: {:?}",
            m
        ))
    })
}
