//! # 3x3 矩阵工具
//!
//! 晶格、超胞矩阵和分数坐标变换所需的少量线性代数。
//!
//! ## 依赖关系
//! - 被 `models/`, `parsers/`, `converters/` 使用
//! - 无外部模块依赖

pub type Mat3 = [[f64; 3]; 3];
pub type IMat3 = [[i32; 3]; 3];

/// 单位矩阵
pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 行列式
pub fn det(m: &Mat3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// 整数矩阵的行列式
pub fn det_i(m: &IMat3) -> i64 {
    let m = m.map(|row| row.map(i64::from));
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// 逆矩阵，奇异时返回 None
pub fn inverse(m: &Mat3) -> Option<Mat3> {
    let d = det(m);
    if d.abs() < 1e-12 {
        return None;
    }

    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / d,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / d,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / d,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / d,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / d,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / d,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / d,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / d,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / d,
        ],
    ])
}

pub fn transpose(m: &Mat3) -> Mat3 {
    let mut t = [[0.0; 3]; 3];
    for (i, row) in t.iter_mut().enumerate() {
        for (j, x) in row.iter_mut().enumerate() {
            *x = m[j][i];
        }
    }
    t
}

pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut c = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            c[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    c
}

/// 行向量乘矩阵：v · m
pub fn vec_mat(v: &[f64; 3], m: &Mat3) -> [f64; 3] {
    [
        v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
        v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
        v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
    ]
}

pub fn to_float(m: &IMat3) -> Mat3 {
    m.map(|row| row.map(f64::from))
}

/// 四舍五入为整数矩阵，任一元素偏离整数超过 `tol` 时返回 None
pub fn round_to_int(m: &Mat3, tol: f64) -> Option<IMat3> {
    let mut out = [[0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let r = m[i][j].round();
            if (m[i][j] - r).abs() > tol {
                return None;
            }
            out[i][j] = r as i32;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_round_trip() {
        let m = [[0.0, 2.7, 2.7], [2.7, 0.0, 2.7], [2.7, 2.7, 0.0]];
        let inv = inverse(&m).unwrap();
        let id = mat_mul(&m, &inv);
        for i in 0..3 {
            for j in 0..3 {
                assert!((id[i][j] - IDENTITY[i][j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert!(inverse(&m).is_none());
    }

    #[test]
    fn test_det_i() {
        assert_eq!(det_i(&[[2, 0, 0], [0, 2, 0], [0, 0, 2]]), 8);
        assert_eq!(det_i(&[[-1, 1, 1], [1, -1, 1], [1, 1, -1]]), 4);
    }

    #[test]
    fn test_round_to_int_rejects_fractions() {
        assert_eq!(
            round_to_int(&[[2.0000001, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]], 1e-5),
            Some([[2, 0, 0], [0, 2, 0], [0, 0, 1]])
        );
        assert!(round_to_int(&[[0.5, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], 1e-5).is_none());
    }

    #[test]
    fn test_transpose() {
        let m = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        assert_eq!(transpose(&m), [[1.0, 4.0, 7.0], [2.0, 5.0, 8.0], [3.0, 6.0, 9.0]]);
    }

    #[test]
    fn test_vec_mat_is_row_vector_product() {
        let m = [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [1.0, 0.0, 1.0]];
        assert_eq!(vec_mat(&[1.0, 1.0, 1.0], &m), [3.0, 3.0, 1.0]);
    }
}
