//! # 物理单位
//!
//! euphonic 输出使用的单位标签，以及 phonopy 文件 `physical_unit` 段中
//! 常见单位到 (Å, amu, eV/Å²) 的换算。
//!
//! ## 依赖关系
//! - 被 `models/euphonic.rs`, `parsers/phonopy_yaml.rs` 使用
//! - 使用 `error.rs`

use crate::error::{ConvertError, Result};

/// Bohr 半径 (Å)，与 phonopy 的取值一致
pub const BOHR_IN_ANGSTROM: f64 = 0.52917721067;
/// Rydberg (eV)
pub const RYDBERG_IN_EV: f64 = 13.605693009;
/// Hartree (eV)
pub const HARTREE_IN_EV: f64 = 27.21138602;

/// 输出文件中带单位的量所用的单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Angstrom,
    Amu,
    EvPerAngstromSquared,
}

impl Unit {
    /// euphonic (pint) 的单位字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Angstrom => "angstrom",
            Unit::Amu => "unified_atomic_mass_unit",
            Unit::EvPerAngstromSquared => "electron_volt / angstrom ** 2",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 源文件声明的单位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalUnits {
    pub length: String,
    pub atomic_mass: String,
    pub force_constants: String,
}

impl Default for PhysicalUnits {
    fn default() -> Self {
        PhysicalUnits {
            length: "angstrom".to_string(),
            atomic_mass: "AMU".to_string(),
            force_constants: "eV/angstrom^2".to_string(),
        }
    }
}

impl PhysicalUnits {
    /// 长度换算到 Å 的因子
    pub fn length_factor(&self) -> Result<f64> {
        match normalize(&self.length).as_str() {
            "angstrom" | "ang" | "a" => Ok(1.0),
            "au" | "bohr" => Ok(BOHR_IN_ANGSTROM),
            "nm" => Ok(10.0),
            _ => Err(unknown("length", &self.length)),
        }
    }

    /// 质量换算到 amu 的因子
    pub fn mass_factor(&self) -> Result<f64> {
        match normalize(&self.atomic_mass).as_str() {
            "amu" | "u" | "da" => Ok(1.0),
            _ => Err(unknown("atomic mass", &self.atomic_mass)),
        }
    }

    /// 力常数换算到 eV/Å² 的因子
    pub fn force_constants_factor(&self) -> Result<f64> {
        let bohr2 = BOHR_IN_ANGSTROM * BOHR_IN_ANGSTROM;
        match normalize(&self.force_constants).as_str() {
            "ev/angstrom^2" | "ev/ang^2" | "ev/a^2" => Ok(1.0),
            "ry/au^2" | "ry/bohr^2" => Ok(RYDBERG_IN_EV / bohr2),
            "mry/au^2" | "mry/bohr^2" => Ok(1e-3 * RYDBERG_IN_EV / bohr2),
            "hartree/au^2" | "hartree/bohr^2" | "ha/bohr^2" => Ok(HARTREE_IN_EV / bohr2),
            "ev/angstrom.au" => Ok(1.0 / BOHR_IN_ANGSTROM),
            _ => Err(unknown("force constants", &self.force_constants)),
        }
    }
}

fn normalize(unit: &str) -> String {
    unit.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn unknown(quantity: &str, unit: &str) -> ConvertError {
    ConvertError::UnknownUnit {
        quantity: quantity.to_string(),
        unit: unit.to_string(),
    }
}
