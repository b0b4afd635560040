//! # euphonic JSON 写出
//!
//! 按 euphonic `ForceConstants.to_json_file` 的布局写出：带单位的量写成
//! `<name>` 加 `<name>_unit` 两个键。
//!
//! ```text
//! {
//!     "crystal": {
//!         "cell_vectors": [[...], [...], [...]],
//!         "cell_vectors_unit": "angstrom",
//!         "n_atoms": 2,
//!         "atom_r": [[...], ...],
//!         "atom_type": ["Si", "Si"],
//!         "atom_mass": [...],
//!         "atom_mass_unit": "unified_atomic_mass_unit"
//!     },
//!     "force_constants": [[[...]]],
//!     "force_constants_unit": "electron_volt / angstrom ** 2",
//!     "n_cells_in_sc": 8,
//!     "sc_matrix": [[...]],
//!     "cell_origins": [[...]]
//! }
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 通过 [`ModelWriter`] 使用
//! - 使用 `serde_json` crate
//! - 使用 `tempfile` crate 原子替换输出文件

use super::ModelWriter;
use crate::error::{ConvertError, Result};
use crate::models::ForceConstants;

use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

mod cereal {
    use serde::Serialize;

    #[derive(Serialize)]
    pub(super) struct ForceConstants<'a> {
        pub crystal: Crystal<'a>,
        pub force_constants: &'a [Vec<Vec<f64>>],
        pub force_constants_unit: &'static str,
        pub n_cells_in_sc: usize,
        pub sc_matrix: &'a [[i32; 3]; 3],
        pub cell_origins: &'a [[i32; 3]],
    }

    #[derive(Serialize)]
    pub(super) struct Crystal<'a> {
        pub cell_vectors: &'a [[f64; 3]; 3],
        pub cell_vectors_unit: &'static str,
        pub n_atoms: usize,
        pub atom_r: &'a [[f64; 3]],
        pub atom_type: &'a [String],
        pub atom_mass: &'a [f64],
        pub atom_mass_unit: &'static str,
    }
}

/// euphonic JSON 写出器
#[derive(Debug, Clone, Copy, Default)]
pub struct EuphonicJsonWriter;

impl ModelWriter for EuphonicJsonWriter {
    fn write(&self, fc: &ForceConstants, path: &Path) -> Result<()> {
        let write_err = |e| ConvertError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        };

        // 先写同目录临时文件再重命名，失败时不留下半个 JSON
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write_to(fc, &mut writer).map_err(|e| ConvertError::JsonError {
                path: path.display().to_string(),
                source: e,
            })?;
            writer.write_all(b"\n").map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }

        // tempfile 创建的文件权限为 0600
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(write_err)?;
        }

        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// 序列化到任意 writer（4 空格缩进，键顺序固定）
pub fn write_to<W: Write>(fc: &ForceConstants, writer: W) -> serde_json::Result<()> {
    let crystal = &fc.crystal;
    let doc = cereal::ForceConstants {
        crystal: cereal::Crystal {
            cell_vectors: &crystal.cell_vectors.magnitude,
            cell_vectors_unit: crystal.cell_vectors.unit.as_str(),
            n_atoms: crystal.n_atoms(),
            atom_r: &crystal.atom_r,
            atom_type: &crystal.atom_type,
            atom_mass: &crystal.atom_mass.magnitude,
            atom_mass_unit: crystal.atom_mass.unit.as_str(),
        },
        force_constants: &fc.force_constants.magnitude,
        force_constants_unit: fc.force_constants.unit.as_str(),
        n_cells_in_sc: fc.n_cells_in_sc(),
        sc_matrix: &fc.sc_matrix,
        cell_origins: &fc.cell_origins,
    };

    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    doc.serialize(&mut ser)
}
