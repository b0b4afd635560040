//! # 晶胞数据模型
//!
//! phonopy 的原胞、单胞和超胞共用的晶胞表示：晶格、分数坐标、元素与质量。
//!
//! ## 依赖关系
//! - 被 `models/phonopy.rs`, `parsers/phonopy_yaml.rs` 使用
//! - 使用 `utils/linalg.rs`

use crate::utils::linalg::{self, Mat3};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: Mat3,
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: Mat3) -> Self {
        Lattice { matrix }
    }

    /// 所有向量乘以同一因子（单位换算）
    pub fn scaled(&self, factor: f64) -> Self {
        Lattice {
            matrix: self.matrix.map(|row| row.map(|x| x * factor)),
        }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let norm = |v: [f64; 3]| (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt();
        let dot = |u: [f64; 3], v: [f64; 3]| -> f64 { u.iter().zip(v.iter()).map(|(x, y)| x * y).sum() };

        let (a, b, c) = (norm(a_vec), norm(b_vec), norm(c_vec));
        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        linalg::det(&self.matrix)
    }
}

/// 晶胞：晶格 + 按顺序排列的原子
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub lattice: Lattice,

    /// 分数坐标 [x, y, z]
    pub positions: Vec<[f64; 3]>,

    /// 元素符号
    pub symbols: Vec<String>,

    /// 原子质量 (amu)
    pub masses: Vec<f64>,
}

impl Cell {
    pub fn num_atoms(&self) -> usize {
        self.positions.len()
    }

    /// 化学式，按元素首次出现顺序
    pub fn formula(&self) -> String {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for symbol in &self.symbols {
            match counts.iter_mut().find(|(s, _)| *s == symbol.as_str()) {
                Some((_, n)) => *n += 1,
                None => counts.push((symbol.as_str(), 1)),
            }
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
