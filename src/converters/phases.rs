//! # 力常数相位约定变换
//!
//! phonopy 的力常数以原子坐标为相位参考（atom phase），euphonic 以原胞
//! 原点为参考（cell phase）。变换把 (n_p, n_s, 3, 3) 的块重新排列为
//! (n_cells, 3 n_p, 3 n_p)：
//!
//! ```text
//! fc[n][3i + a][3 s2p(j) + b] = Φ(i, j)[a][b]
//! ```
//!
//! 其中 n 是原子 j 相对原子 i 所在原胞的原点，折回超胞后在
//! `cell_origins` 中的编号。
//!
//! ## 依赖关系
//! - 被 `converters/assemble.rs` 使用
//! - 使用 `models/phonopy.rs`, `utils/linalg.rs`
//! - 使用 `rayon` 按原胞原子并行

use crate::error::{ConvertError, Result};
use crate::models::{FcBlock, ForceConstantArray};
use crate::utils::linalg::{self, IMat3, Mat3};

use rayon::prelude::*;
use std::collections::HashMap;

/// 相位变换的输入
pub struct PhaseInput<'a> {
    /// (n_p 或 n_s, n_s, 3, 3)
    pub force_constants: &'a ForceConstantArray,
    /// 原胞原子分数坐标
    pub atom_r: &'a [[f64; 3]],
    /// 超胞原子坐标，以原胞晶格为单位
    pub sc_atom_r: &'a [[f64; 3]],
    /// 每个原胞原子在超胞中的索引
    pub p2s_map: &'a [usize],
    /// 每个超胞原子对应的原胞原子索引
    pub s2p_index: &'a [usize],
    /// 超胞晶格 = sc_matrix · 原胞晶格
    pub sc_matrix: &'a IMat3,
}

/// cell phase 约定的力常数
#[derive(Debug, Clone, PartialEq)]
pub struct CellPhaseFc {
    /// (n_cells, 3 n_p, 3 n_p)
    pub force_constants: Vec<Vec<Vec<f64>>>,
    pub cell_origins: Vec<[i32; 3]>,
}

/// 相位变换能力
pub trait PhaseTransform {
    fn convert(&self, input: &PhaseInput<'_>) -> Result<CellPhaseFc>;
}

/// atom phase → cell phase
#[derive(Debug, Clone)]
pub struct CellPhaseTransform {
    /// 原胞原点偏离整数的容差
    pub cell_origins_tol: f64,
}

impl Default for CellPhaseTransform {
    fn default() -> Self {
        CellPhaseTransform {
            cell_origins_tol: 1e-5,
        }
    }
}

impl PhaseTransform for CellPhaseTransform {
    fn convert(&self, input: &PhaseInput<'_>) -> Result<CellPhaseFc> {
        let n_p = input.atom_r.len();
        let n_s = input.sc_atom_r.len();
        let n_cells = linalg::det_i(input.sc_matrix).unsigned_abs() as usize;
        check_shapes(input, n_p, n_s, n_cells)?;

        let origins = self.cell_origins_per_atom(input)?;
        let wrap = SupercellWrap::new(input.sc_matrix)?;

        // 原胞原子 0 的所有像定义了超胞中的原胞原点
        let cell_origins: Vec<[i32; 3]> = input
            .s2p_index
            .iter()
            .zip(&origins)
            .filter(|(p, _)| **p == 0)
            .map(|(_, &o)| o)
            .collect();
        if cell_origins.len() != n_cells {
            return Err(ConvertError::InconsistentModel(format!(
                "primitive atom 0 has {} images in the supercell, expected {}",
                cell_origins.len(),
                n_cells
            )));
        }

        let mut cell_index: HashMap<[i32; 3], usize> = HashMap::with_capacity(n_cells);
        for (n, origin) in cell_origins.iter().enumerate() {
            if let Some(prev) = cell_index.insert(wrap.canonical(origin), n) {
                return Err(ConvertError::InconsistentModel(format!(
                    "cell origins {:?} and {:?} are the same supercell image",
                    cell_origins[prev], origin
                )));
            }
        }

        let rows: Vec<Vec<(usize, usize, FcBlock)>> = (0..n_p)
            .into_par_iter()
            .map(|i| {
                let row = if input.force_constants.is_compact() {
                    i
                } else {
                    input.p2s_map[i]
                };
                let home = origins[input.p2s_map[i]];

                (0..n_s)
                    .map(|j| {
                        let rel = [
                            origins[j][0] - home[0],
                            origins[j][1] - home[1],
                            origins[j][2] - home[2],
                        ];
                        let n = *cell_index.get(&wrap.canonical(&rel)).ok_or_else(|| {
                            ConvertError::InconsistentModel(format!(
                                "supercell atom {} (cell {:?}) matches no cell origin",
                                j, rel
                            ))
                        })?;
                        Ok((n, input.s2p_index[j], *input.force_constants.block(row, j)))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let dim = 3 * n_p;
        let mut fc = vec![vec![vec![0.0; dim]; dim]; n_cells];
        let mut filled = vec![false; n_cells * n_p * n_p];

        for (i, row) in rows.into_iter().enumerate() {
            for (n, jc, block) in row {
                let slot = (n * n_p + i) * n_p + jc;
                if std::mem::replace(&mut filled[slot], true) {
                    return Err(ConvertError::InconsistentModel(format!(
                        "atoms {} and {} interact twice in cell {}",
                        i, jc, n
                    )));
                }
                for a in 0..3 {
                    for b in 0..3 {
                        fc[n][3 * i + a][3 * jc + b] = block[a][b];
                    }
                }
            }
        }

        Ok(CellPhaseFc {
            force_constants: fc,
            cell_origins,
        })
    }
}

impl CellPhaseTransform {
    /// 每个超胞原子所在原胞的原点
    fn cell_origins_per_atom(&self, input: &PhaseInput<'_>) -> Result<Vec<[i32; 3]>> {
        input
            .sc_atom_r
            .iter()
            .zip(input.s2p_index)
            .enumerate()
            .map(|(j, (r, &p))| {
                let offset = [
                    r[0] - input.atom_r[p][0],
                    r[1] - input.atom_r[p][1],
                    r[2] - input.atom_r[p][2],
                ];
                if offset
                    .iter()
                    .any(|x| (x - x.round()).abs() > self.cell_origins_tol)
                {
                    return Err(ConvertError::NonIntegerCellOrigin { atom: j, offset });
                }
                Ok(offset.map(|x| x.round() as i32))
            })
            .collect()
    }
}

fn check_shapes(input: &PhaseInput<'_>, n_p: usize, n_s: usize, n_cells: usize) -> Result<()> {
    let fc = input.force_constants;
    let problem = if n_cells == 0 {
        Some("sc_matrix is singular".to_string())
    } else if input.p2s_map.len() != n_p {
        Some(format!("p2s_map has {} entries for {} atoms", input.p2s_map.len(), n_p))
    } else if input.s2p_index.len() != n_s {
        Some(format!("s2p index has {} entries for {} supercell atoms", input.s2p_index.len(), n_s))
    } else if n_s != n_p * n_cells {
        Some(format!(
            "{} supercell atoms is not {} atoms x {} cells",
            n_s, n_p, n_cells
        ))
    } else if fc.n_cols != n_s || (fc.n_rows != n_s && fc.n_rows != n_p) {
        Some(format!(
            "force constants shape ({}, {}) for {} atoms / {} supercell atoms",
            fc.n_rows, fc.n_cols, n_p, n_s
        ))
    } else if let Some(&bad) = input.p2s_map.iter().find(|&&s| s >= n_s) {
        Some(format!("p2s_map entry {} is outside the supercell", bad))
    } else if let Some(&bad) = input.s2p_index.iter().find(|&&p| p >= n_p) {
        Some(format!("s2p index entry {} is outside the primitive cell", bad))
    } else {
        None
    };

    match problem {
        Some(msg) => Err(ConvertError::InconsistentModel(msg)),
        None => Ok(()),
    }
}

/// 把原胞平移折回超胞的辅助结构
struct SupercellWrap {
    sc: Mat3,
    inv_sc: Mat3,
}

impl SupercellWrap {
    fn new(sc_matrix: &IMat3) -> Result<Self> {
        let sc = linalg::to_float(sc_matrix);
        let inv_sc = linalg::inverse(&sc).ok_or_else(|| {
            ConvertError::InconsistentModel("sc_matrix is singular".to_string())
        })?;
        Ok(SupercellWrap { sc, inv_sc })
    }

    /// 模超胞晶格平移后的代表元
    fn canonical(&self, v: &[i32; 3]) -> [i32; 3] {
        let u = linalg::vec_mat(&v.map(f64::from), &self.inv_sc);
        let u = u.map(|x| x - (x + 1e-8).floor());
        linalg::vec_mat(&u, &self.sc).map(|x| x.round() as i32)
    }
}
