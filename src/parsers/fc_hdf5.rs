//! # HDF5 力常数读取
//!
//! 读取 phonopy 写出的 `force_constants.hdf5`：
//! - `force_constants`: (n_rows, n_supercell, 3, 3) float64
//! - `p2s_map`（可选，compact 格式时存在）
//!
//! 需要启用 `hdf5` feature（依赖系统 libhdf5）；未启用时返回
//! [`ConvertError::Hdf5Unsupported`]。
//!
//! ## 依赖关系
//! - 被 `parsers/phonopy_yaml.rs` 使用
//! - 使用 `hdf5` crate（可选）

use crate::error::{ConvertError, Result};
use crate::models::ForceConstantArray;
use std::path::Path;

/// 读取力常数以及可选的 p2s_map
#[cfg(feature = "hdf5")]
pub fn read_force_constants(path: &Path) -> Result<(ForceConstantArray, Option<Vec<usize>>)> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let h5_err = |e: hdf5::Error| ConvertError::Hdf5Error {
        path: path.display().to_string(),
        source: e,
    };

    let file = hdf5::File::open(path).map_err(h5_err)?;
    let dataset = file.dataset("force_constants").map_err(h5_err)?;

    let shape = dataset.shape();
    if shape.len() != 4 || shape[2] != 3 || shape[3] != 3 {
        return Err(ConvertError::ParseError {
            format: "hdf5".to_string(),
            path: path.display().to_string(),
            reason: format!("force_constants has shape {:?}, expected (n, m, 3, 3)", shape),
        });
    }
    let data: Vec<f64> = dataset.read_raw::<f64>().map_err(h5_err)?;
    let fc = ForceConstantArray::from_flat(shape[0], shape[1], &data)?;

    let p2s_map = if file.link_exists("p2s_map") {
        let raw: Vec<i64> = file
            .dataset("p2s_map")
            .and_then(|ds| ds.read_raw::<i64>())
            .map_err(h5_err)?;
        let p2s_map = raw
            .into_iter()
            .map(|i| {
                usize::try_from(i).map_err(|_| ConvertError::ParseError {
                    format: "hdf5".to_string(),
                    path: path.display().to_string(),
                    reason: format!("p2s_map has negative entry {}", i),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Some(p2s_map)
    } else {
        None
    };

    Ok((fc, p2s_map))
}

/// 读取力常数以及可选的 p2s_map
#[cfg(not(feature = "hdf5"))]
pub fn read_force_constants(path: &Path) -> Result<(ForceConstantArray, Option<Vec<usize>>)> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    Err(ConvertError::Hdf5Unsupported {
        path: path.display().to_string(),
    })
}

#[cfg(all(test, not(feature = "hdf5")))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reported_first() {
        let err = read_force_constants(Path::new("/nonexistent/Si-force_constants.hdf5")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn test_hdf5_unsupported_without_feature() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_force_constants(file.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Hdf5Unsupported { .. }));
    }
}
