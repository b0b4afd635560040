//! # 数据模型模块
//!
//! 定义 phonopy 源模型、euphonic 目标模型及单位。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `converters/` 和 `commands/` 使用
//! - 子模块: structure, units, phonopy, euphonic

pub mod euphonic;
pub mod phonopy;
pub mod structure;
pub mod units;

pub use euphonic::{Crystal, ForceConstants, Quantity};
pub use phonopy::{FcBlock, ForceConstantArray, NacParams, PhonopyModel};
pub use structure::{Cell, Lattice};
pub use units::{PhysicalUnits, Unit};
