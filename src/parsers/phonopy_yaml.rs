//! # phonopy.yaml 解析器
//!
//! 读取 `phonopy_save` 写出的 `*-phonopy.yaml`，构建 [`PhonopyModel`]。
//!
//! ## phonopy.yaml 结构（只列出用到的段）
//! ```text
//! physical_unit:
//!   atomic_mass: "AMU"
//!   length: "angstrom"
//!   force_constants: "eV/angstrom^2"
//! supercell_matrix:
//! - [ 2, 0, 0 ]
//! primitive_matrix:
//! - [ 1.0, 0.0, 0.0 ]
//! primitive_cell / unit_cell / supercell:
//!   lattice:
//!   - [ x, y, z ] # a
//!   points:
//!   - symbol: Si # 1
//!     coordinates: [ x, y, z ]
//!     mass: 28.085500
//!     reduced_to: 1          (仅 unit_cell / supercell)
//! born_effective_charge / dielectric_constant:
//! force_constants:
//!   format: "compact"
//!   shape: [ 2, 16 ]
//!   elements:
//!   - [ 9 个数 ] # (1, 1)
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 通过 [`ModelLoader`] 使用
//! - 使用 `parsers/fc_hdf5.rs`, `models/`
//! - 使用 `serde_yaml` crate

use super::{fc_hdf5, ModelLoader};
use crate::error::{ConvertError, Result};
use crate::models::{Cell, ForceConstantArray, Lattice, NacParams, PhonopyModel, PhysicalUnits};
use crate::utils::linalg::{self, IMat3, Mat3};

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// 原胞晶格与 Pᵀ · 单胞晶格之间允许的偏差 (Å)
const PRIMITIVE_LATTICE_TOL: f64 = 1e-4;

mod cereal {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub(super) struct PhonopyYaml {
        pub physical_unit: Option<PhysicalUnit>,
        pub supercell_matrix: Option<[[i32; 3]; 3]>,
        pub primitive_matrix: Option<[[f64; 3]; 3]>,
        pub primitive_cell: Option<Cell>,
        pub unit_cell: Option<Cell>,
        pub supercell: Option<Cell>,
        pub force_constants: Option<ForceConstants>,
        pub born_effective_charge: Option<Vec<[[f64; 3]; 3]>>,
        pub dielectric_constant: Option<[[f64; 3]; 3]>,
    }

    #[derive(Deserialize)]
    pub(super) struct PhysicalUnit {
        pub length: Option<String>,
        pub atomic_mass: Option<String>,
        pub force_constants: Option<String>,
    }

    #[derive(Deserialize)]
    pub(super) struct Cell {
        pub lattice: [[f64; 3]; 3],
        pub points: Vec<Point>,
    }

    #[derive(Deserialize)]
    pub(super) struct Point {
        pub symbol: String,
        pub coordinates: [f64; 3],
        pub mass: Option<f64>,
        pub reduced_to: Option<usize>,
    }

    #[derive(Deserialize)]
    pub(super) struct ForceConstants {
        pub format: Option<String>,
        pub shape: [usize; 2],
        pub elements: Vec<Element>,
    }

    /// 每个 3x3 块可以是 9 个数，也可以是嵌套的三行
    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Element {
        Flat(Vec<f64>),
        Rows(Vec<Vec<f64>>),
    }
}

/// phonopy.yaml (+ 可选 HDF5) 加载器
#[derive(Debug, Clone)]
pub struct PhonopyYamlLoader {
    /// 位置匹配容差（分数坐标）
    pub symprec: f64,

    /// 查找 `BORN` 的工作目录，None 表示进程当前目录
    pub work_dir: Option<PathBuf>,
}

impl Default for PhonopyYamlLoader {
    fn default() -> Self {
        PhonopyYamlLoader {
            symprec: 1e-5,
            work_dir: None,
        }
    }
}

impl ModelLoader for PhonopyYamlLoader {
    fn load(&self, primary: &Path, fc_file: Option<&Path>) -> Result<PhonopyModel> {
        let raw = read_raw(primary)?;
        let mut model = self.build_model(raw, &display(primary), fc_file)?;

        // YAML 中没有 NAC 参数时，phonopy 读取当前工作目录下的 BORN；
        // 输入文件旁边的 BORN 同样视为存在
        if model.nac.is_none() {
            if let Some(born) = self.find_born(primary) {
                model.nac = Some(NacParams {
                    born: None,
                    dielectric: None,
                    origin: born.display().to_string(),
                });
            }
        }

        Ok(model)
    }
}

impl PhonopyYamlLoader {
    /// 依次检查工作目录和输入文件所在目录
    fn find_born(&self, primary: &Path) -> Option<PathBuf> {
        let in_work_dir = match &self.work_dir {
            Some(dir) => dir.join("BORN"),
            None => PathBuf::from("BORN"),
        };
        let next_to_input = primary
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("BORN");

        [in_work_dir, next_to_input]
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    /// 从字符串解析（不查找 HDF5 或 BORN 文件）
    pub fn load_str(&self, content: &str, name: &str) -> Result<PhonopyModel> {
        let raw: cereal::PhonopyYaml =
            serde_yaml::from_str(content).map_err(|e| ConvertError::YamlError {
                path: name.to_string(),
                source: e,
            })?;
        self.build_model(raw, name, None)
    }

    fn build_model(
        &self,
        raw: cereal::PhonopyYaml,
        path: &str,
        fc_file: Option<&Path>,
    ) -> Result<PhonopyModel> {
        let source_units = match raw.physical_unit {
            Some(unit) => {
                let default = PhysicalUnits::default();
                PhysicalUnits {
                    length: unit.length.unwrap_or(default.length),
                    atomic_mass: unit.atomic_mass.unwrap_or(default.atomic_mass),
                    force_constants: unit.force_constants.unwrap_or(default.force_constants),
                }
            }
            None => PhysicalUnits::default(),
        };
        let length_factor = source_units.length_factor()?;
        let mass_factor = source_units.mass_factor()?;
        let fc_factor = source_units.force_constants_factor()?;

        let supercell_matrix: IMat3 = raw
            .supercell_matrix
            .ok_or_else(|| missing(path, "supercell_matrix"))?;
        if linalg::det_i(&supercell_matrix) == 0 {
            return Err(parse_error(path, "supercell_matrix is singular"));
        }

        let (raw_supercell, raw_unit_cell, raw_primitive) =
            (raw.supercell, raw.unit_cell, raw.primitive_cell);
        let raw_supercell = raw_supercell.ok_or_else(|| missing(path, "supercell"))?;

        let unit_cell = raw_unit_cell
            .as_ref()
            .map(|c| convert_cell(c, length_factor, mass_factor, path, "unit_cell"))
            .transpose()?;

        let primitive_matrix = raw.primitive_matrix.unwrap_or(linalg::IDENTITY);
        let primitive = match (&raw_primitive, &unit_cell) {
            (Some(p), _) => convert_cell(p, length_factor, mass_factor, path, "primitive_cell")?,
            (None, Some(u)) if is_identity(&primitive_matrix) => u.clone(),
            (None, Some(_)) => {
                return Err(parse_error(
                    path,
                    "primitive_matrix is not the identity but no primitive_cell section is present",
                ))
            }
            (None, None) => return Err(missing(path, "primitive_cell")),
        };
        if let Some(unit_cell) = &unit_cell {
            check_primitive_matrix(&primitive_matrix, unit_cell, &primitive)?;
        }
        let supercell = convert_cell(&raw_supercell, length_factor, mass_factor, path, "supercell")?;

        let reduced_to: Option<Vec<usize>> =
            raw_supercell.points.iter().map(|p| p.reduced_to).collect();
        let (p2s_map, s2p_map) = match reduced_to {
            Some(reduced_to) => maps_from_reduced_to(&reduced_to, path)?,
            None => maps_from_positions(&primitive, &supercell, self.symprec)?,
        };
        if p2s_map.len() != primitive.num_atoms() {
            return Err(ConvertError::InconsistentModel(format!(
                "supercell maps onto {} primitive atoms but primitive_cell has {}",
                p2s_map.len(),
                primitive.num_atoms()
            )));
        }

        let force_constants = match fc_file {
            Some(fc_path) => {
                let (fc, hdf5_p2s) = fc_hdf5::read_force_constants(fc_path)?;
                if let Some(hdf5_p2s) = hdf5_p2s {
                    if fc.is_compact() && hdf5_p2s != p2s_map {
                        return Err(ConvertError::InconsistentIndexMap(format!(
                            "p2s_map in {} ({:?}) disagrees with {} ({:?})",
                            fc_path.display(),
                            hdf5_p2s,
                            path,
                            p2s_map
                        )));
                    }
                }
                fc
            }
            None => match raw.force_constants {
                Some(fc) => convert_force_constants(fc, path)?,
                None => {
                    return Err(parse_error(
                        path,
                        "no force constants (neither a force_constants section nor an HDF5 file)",
                    ))
                }
            },
        }
        .scaled(fc_factor);

        let n_s = supercell.num_atoms();
        if force_constants.n_cols != n_s
            || (force_constants.n_rows != n_s && force_constants.n_rows != primitive.num_atoms())
        {
            return Err(ConvertError::InconsistentModel(format!(
                "force constants shape ({}, {}) does not fit {} primitive / {} supercell atoms",
                force_constants.n_rows,
                force_constants.n_cols,
                primitive.num_atoms(),
                n_s
            )));
        }

        // 与 phonopy 一致：两者都存在时才构成 NAC 参数
        let nac = match (raw.born_effective_charge, raw.dielectric_constant) {
            (Some(born), Some(dielectric)) => Some(NacParams {
                born: Some(born),
                dielectric: Some(dielectric),
                origin: path.to_string(),
            }),
            _ => None,
        };

        Ok(PhonopyModel {
            unit_cell,
            primitive,
            supercell,
            supercell_matrix,
            p2s_map,
            s2p_map,
            force_constants,
            nac,
            source_units,
        })
    }
}

fn read_raw(path: &Path) -> Result<cereal::PhonopyYaml> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: display(path),
        });
    }
    let file = File::open(path).map_err(|e| ConvertError::FileReadError {
        path: display(path),
        source: e,
    })?;

    serde_yaml::from_reader(BufReader::new(file)).map_err(|e| ConvertError::YamlError {
        path: display(path),
        source: e,
    })
}

fn convert_cell(
    raw: &cereal::Cell,
    length_factor: f64,
    mass_factor: f64,
    path: &str,
    section: &str,
) -> Result<Cell> {
    let mut positions = Vec::with_capacity(raw.points.len());
    let mut symbols = Vec::with_capacity(raw.points.len());
    let mut masses = Vec::with_capacity(raw.points.len());

    for (i, point) in raw.points.iter().enumerate() {
        let mass = point.mass.ok_or_else(|| {
            parse_error(path, &format!("{} atom {} ({}) has no mass", section, i + 1, point.symbol))
        })?;
        positions.push(point.coordinates);
        symbols.push(point.symbol.clone());
        masses.push(mass * mass_factor);
    }

    let lattice = Lattice::from_vectors(raw.lattice).scaled(length_factor);
    if lattice.volume().abs() < 1e-12 {
        return Err(parse_error(path, &format!("{} lattice is singular", section)));
    }

    Ok(Cell {
        lattice,
        positions,
        symbols,
        masses,
    })
}

/// 由超胞原子的 `reduced_to`（从 1 开始）得到 (p2s_map, s2p_map)
fn maps_from_reduced_to(reduced_to: &[usize], path: &str) -> Result<(Vec<usize>, Vec<usize>)> {
    let n = reduced_to.len();
    let mut s2p_map = Vec::with_capacity(n);
    for (i, &r) in reduced_to.iter().enumerate() {
        if r == 0 || r > n {
            return Err(parse_error(
                path,
                &format!("supercell atom {} has reduced_to {} outside 1..={}", i + 1, r, n),
            ));
        }
        s2p_map.push(r - 1);
    }

    let mut p2s_map = s2p_map.clone();
    p2s_map.sort_unstable();
    p2s_map.dedup();

    Ok((p2s_map, s2p_map))
}

/// 没有 `reduced_to` 时，按位置把超胞原子匹配到原胞原子
fn maps_from_positions(
    primitive: &Cell,
    supercell: &Cell,
    symprec: f64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let inv_prim = linalg::inverse(&primitive.lattice.matrix).ok_or_else(|| {
        ConvertError::InconsistentModel("primitive lattice is singular".to_string())
    })?;
    // 超胞分数坐标 -> 原胞分数坐标
    let to_prim = linalg::mat_mul(&supercell.lattice.matrix, &inv_prim);

    let mut prim_of = Vec::with_capacity(supercell.num_atoms());
    for (j, pos) in supercell.positions.iter().enumerate() {
        let frac = linalg::vec_mat(pos, &to_prim);
        let found = primitive.positions.iter().position(|p| {
            (0..3).all(|k| {
                let d = frac[k] - p[k];
                (d - d.round()).abs() < symprec
            })
        });
        match found {
            Some(i) => prim_of.push(i),
            None => {
                return Err(ConvertError::InconsistentModel(format!(
                    "supercell atom {} at {:?} is not an image of any primitive atom",
                    j, pos
                )))
            }
        }
    }

    let mut p2s_map = Vec::with_capacity(primitive.num_atoms());
    for i in 0..primitive.num_atoms() {
        let first = prim_of.iter().position(|&p| p == i).ok_or_else(|| {
            ConvertError::InconsistentModel(format!(
                "primitive atom {} has no image in the supercell",
                i
            ))
        })?;
        p2s_map.push(first);
    }
    let s2p_map = prim_of.iter().map(|&i| p2s_map[i]).collect();

    Ok((p2s_map, s2p_map))
}

fn convert_force_constants(raw: cereal::ForceConstants, path: &str) -> Result<ForceConstantArray> {
    let [n_rows, n_cols] = raw.shape;
    let mut data = Vec::with_capacity(n_rows * n_cols * 9);

    for (k, element) in raw.elements.into_iter().enumerate() {
        let values = match element {
            cereal::Element::Flat(values) => values,
            cereal::Element::Rows(rows) => rows.into_iter().flatten().collect(),
        };
        if values.len() != 9 {
            return Err(parse_error(
                path,
                &format!(
                    "force constants element {} has {} values, expected 9",
                    k + 1,
                    values.len()
                ),
            ));
        }
        data.extend(values);
    }

    match raw.format.as_deref() {
        None | Some("full") | Some("compact") => {}
        Some(other) => {
            return Err(parse_error(
                path,
                &format!("unknown force constants format '{}'", other),
            ))
        }
    }

    ForceConstantArray::from_flat(n_rows, n_cols, &data)
}

/// phonopy 约定：原胞晶格行向量 = Pᵀ · 单胞晶格
fn check_primitive_matrix(primitive_matrix: &Mat3, unit_cell: &Cell, primitive: &Cell) -> Result<()> {
    let expected = linalg::mat_mul(&linalg::transpose(primitive_matrix), &unit_cell.lattice.matrix);
    let actual = &primitive.lattice.matrix;
    let consistent =
        (0..3).all(|i| (0..3).all(|j| (expected[i][j] - actual[i][j]).abs() < PRIMITIVE_LATTICE_TOL));

    if consistent {
        Ok(())
    } else {
        Err(ConvertError::InconsistentModel(format!(
            "primitive_matrix {:?} maps the unit cell onto {:?}, but primitive_cell has {:?}",
            primitive_matrix, expected, actual
        )))
    }
}

fn is_identity(m: &Mat3) -> bool {
    (0..3).all(|i| (0..3).all(|j| (m[i][j] - linalg::IDENTITY[i][j]).abs() < 1e-10))
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn missing(path: &str, section: &str) -> ConvertError {
    parse_error(path, &format!("missing '{}' section", section))
}

fn parse_error(path: &str, reason: &str) -> ConvertError {
    ConvertError::ParseError {
        format: "phonopy.yaml".to_string(),
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 一维链：每个原胞两个原子，超胞沿 a 方向 2 倍
    pub(crate) const CHAIN_YAML: &str = r#"
phonopy:
  version: "2.20.0"
physical_unit:
  atomic_mass: "AMU"
  length: "angstrom"
  force_constants: "eV/angstrom^2"
supercell_matrix:
- [ 2, 0, 0 ]
- [ 0, 1, 0 ]
- [ 0, 0, 1 ]
primitive_matrix:
- [ 1.0, 0.0, 0.0 ]
- [ 0.0, 1.0, 0.0 ]
- [ 0.0, 0.0, 1.0 ]
primitive_cell:
  lattice:
  - [ 4.0, 0.0, 0.0 ] # a
  - [ 0.0, 10.0, 0.0 ] # b
  - [ 0.0, 0.0, 10.0 ] # c
  points:
  - symbol: Na # 1
    coordinates: [ 0.0, 0.0, 0.0 ]
    mass: 22.989769
  - symbol: Cl # 2
    coordinates: [ 0.5, 0.0, 0.0 ]
    mass: 35.453
supercell:
  lattice:
  - [ 8.0, 0.0, 0.0 ] # a
  - [ 0.0, 10.0, 0.0 ] # b
  - [ 0.0, 0.0, 10.0 ] # c
  points:
  - symbol: Na # 1
    coordinates: [ 0.0, 0.0, 0.0 ]
    mass: 22.989769
    reduced_to: 1
  - symbol: Na # 2
    coordinates: [ 0.5, 0.0, 0.0 ]
    mass: 22.989769
    reduced_to: 1
  - symbol: Cl # 3
    coordinates: [ 0.25, 0.0, 0.0 ]
    mass: 35.453
    reduced_to: 3
  - symbol: Cl # 4
    coordinates: [ 0.75, 0.0, 0.0 ]
    mass: 35.453
    reduced_to: 3
force_constants:
  format: "compact"
  shape: [ 2, 4 ]
  elements:
  - [ 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (1, 1)
  - [ 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (1, 2)
  - [ -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (1, 3)
  - [ -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (1, 4)
  - [ -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (3, 1)
  - [ -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (3, 2)
  - [ 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (3, 3)
  - [ 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (3, 4)
"#;

    fn loader() -> PhonopyYamlLoader {
        PhonopyYamlLoader::default()
    }

    #[test]
    fn test_load_chain() {
        let model = loader().load_str(CHAIN_YAML, "chain").unwrap();

        assert_eq!(model.primitive.num_atoms(), 2);
        assert_eq!(model.supercell.num_atoms(), 4);
        assert_eq!(model.primitive.symbols, vec!["Na", "Cl"]);
        assert_eq!(model.supercell_matrix, [[2, 0, 0], [0, 1, 0], [0, 0, 1]]);
        assert_eq!(model.p2s_map, vec![0, 2]);
        assert_eq!(model.s2p_map, vec![0, 0, 2, 2]);
        assert!(model.force_constants.is_compact());
        assert_eq!(model.force_constants.block(1, 2)[0][0], 2.0);
        assert!(model.nac.is_none());
        assert!(model.unit_cell.is_none());
    }

    #[test]
    fn test_maps_from_positions_match_reduced_to() {
        let without: String = CHAIN_YAML
            .lines()
            .filter(|l| !l.contains("reduced_to"))
            .collect::<Vec<_>>()
            .join("\n");
        let model = loader().load_str(&without, "chain").unwrap();

        assert_eq!(model.p2s_map, vec![0, 2]);
        assert_eq!(model.s2p_map, vec![0, 0, 2, 2]);
    }

    #[test]
    fn test_bohr_units_are_converted() {
        let yaml = CHAIN_YAML
            .replace("length: \"angstrom\"", "length: \"au\"")
            .replace("force_constants: \"eV/angstrom^2\"", "force_constants: \"Ry/au^2\"");
        let model = loader().load_str(&yaml, "chain").unwrap();

        let a = model.primitive.lattice.matrix[0][0];
        assert!((a - 4.0 * 0.52917721067).abs() < 1e-12);
        let fc = model.force_constants.block(0, 0)[0][0];
        assert!((fc - 2.0 * 48.58681178).abs() < 1e-6);
        assert_eq!(model.source_units.length, "au");
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        let yaml = CHAIN_YAML.replace("length: \"angstrom\"", "length: \"furlong\"");
        let err = loader().load_str(&yaml, "chain").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownUnit { .. }));
    }

    #[test]
    fn test_nested_element_rows() {
        let yaml = CHAIN_YAML.replace(
            "  - [ 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0 ] # (1, 1)",
            "  - [ [ 2.0, 0.0, 0.0 ], [ 0.0, 0.0, 0.0 ], [ 0.0, 0.0, 0.0 ] ] # (1, 1)",
        );
        let model = loader().load_str(&yaml, "chain").unwrap();
        assert_eq!(model.force_constants.block(0, 0)[0][0], 2.0);
    }

    #[test]
    fn test_born_charges_mark_nac() {
        let yaml = format!(
            "{}born_effective_charge:\n- [ [ 1.0, 0.0, 0.0 ], [ 0.0, 1.0, 0.0 ], [ 0.0, 0.0, 1.0 ] ]\n- [ [ -1.0, 0.0, 0.0 ], [ 0.0, -1.0, 0.0 ], [ 0.0, 0.0, -1.0 ] ]\ndielectric_constant:\n- [ 2.0, 0.0, 0.0 ]\n- [ 0.0, 2.0, 0.0 ]\n- [ 0.0, 0.0, 2.0 ]\n",
            CHAIN_YAML
        );
        let model = loader().load_str(&yaml, "chain").unwrap();
        let nac = model.nac.unwrap();
        assert_eq!(nac.born.map(|b| b.len()), Some(2));
        assert_eq!(nac.dielectric.map(|d| d[1][1]), Some(2.0));
    }

    #[test]
    fn test_partial_nac_sections_are_ignored() {
        let born_only = format!(
            "{}born_effective_charge:\n- [ [ 1.0, 0.0, 0.0 ], [ 0.0, 1.0, 0.0 ], [ 0.0, 0.0, 1.0 ] ]\n- [ [ -1.0, 0.0, 0.0 ], [ 0.0, -1.0, 0.0 ], [ 0.0, 0.0, -1.0 ] ]\n",
            CHAIN_YAML
        );
        assert!(loader().load_str(&born_only, "chain").unwrap().nac.is_none());

        let dielectric_only = format!(
            "{}dielectric_constant:\n- [ 2.0, 0.0, 0.0 ]\n- [ 0.0, 2.0, 0.0 ]\n- [ 0.0, 0.0, 2.0 ]\n",
            CHAIN_YAML
        );
        assert!(loader().load_str(&dielectric_only, "chain").unwrap().nac.is_none());
    }

    /// 在超胞前插入半长的单胞，并设置 primitive_matrix 的第一行
    fn with_unit_cell(first_row: &str) -> String {
        let unit_cell = r#"
unit_cell:
  lattice:
  - [ 2.0, 0.0, 0.0 ] # a
  - [ 0.0, 10.0, 0.0 ] # b
  - [ 0.0, 0.0, 10.0 ] # c
  points:
  - symbol: Na # 1
    coordinates: [ 0.0, 0.0, 0.0 ]
    mass: 22.989769
    reduced_to: 1
supercell:
"#;
        CHAIN_YAML
            .replace("- [ 1.0, 0.0, 0.0 ]", first_row)
            .replace("\nsupercell:\n", unit_cell)
    }

    #[test]
    fn test_primitive_matrix_matches_lattices() {
        let model = loader()
            .load_str(&with_unit_cell("- [ 2.0, 0.0, 0.0 ]"), "chain")
            .unwrap();
        assert_eq!(model.unit_cell.map(|c| c.lattice.matrix[0][0]), Some(2.0));
        assert_eq!(model.primitive.lattice.matrix[0][0], 4.0);
    }

    #[test]
    fn test_primitive_matrix_inconsistent_with_lattices() {
        let err = loader()
            .load_str(&with_unit_cell("- [ 1.0, 0.0, 0.0 ]"), "chain")
            .unwrap_err();
        assert!(matches!(err, ConvertError::InconsistentModel(_)));
    }

    #[test]
    fn test_missing_force_constants() {
        let cut = CHAIN_YAML.find("force_constants:\n  format").unwrap();
        let err = loader().load_str(&CHAIN_YAML[..cut], "chain").unwrap_err();
        assert!(matches!(err, ConvertError::ParseError { .. }));
    }

    #[test]
    fn test_wrong_element_count() {
        let yaml = CHAIN_YAML.replace("shape: [ 2, 4 ]", "shape: [ 2, 3 ]");
        let err = loader().load_str(&yaml, "chain").unwrap_err();
        assert!(matches!(err, ConvertError::InconsistentModel(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = loader().load_str("supercell_matrix: [ [", "broken").unwrap_err();
        assert!(matches!(err, ConvertError::YamlError { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = loader()
            .load(Path::new("/nonexistent/Si-phonopy.yaml"), None)
            .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn test_born_file_next_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("chain-phonopy.yaml");
        std::fs::write(&yaml, CHAIN_YAML).unwrap();

        let model = loader().load(&yaml, None).unwrap();
        assert!(model.nac.is_none());

        std::fs::write(dir.path().join("BORN"), "14.4\n").unwrap();
        let model = loader().load(&yaml, None).unwrap();
        assert!(model.nac.unwrap().origin.ends_with("BORN"));
    }

    #[test]
    fn test_born_file_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("in");
        std::fs::create_dir(&input_dir).unwrap();
        let yaml = input_dir.join("chain-phonopy.yaml");
        std::fs::write(&yaml, CHAIN_YAML).unwrap();

        let loader = PhonopyYamlLoader {
            work_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(loader.load(&yaml, None).unwrap().nac.is_none());

        // 输入在子目录，BORN 在工作目录
        let born = dir.path().join("BORN");
        std::fs::write(&born, "14.4\n").unwrap();
        let nac = loader.load(&yaml, None).unwrap().nac.unwrap();
        assert_eq!(PathBuf::from(nac.origin), born);
    }
}
