//! # 转换器模块
//!
//! phonopy 模型到 euphonic 模型的转换：索引映射、相位约定变换和组装。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `models/`
//! - 子模块: index_map, phases, assemble

pub mod assemble;
pub mod index_map;
pub mod phases;

pub use assemble::phonopy_to_euphonic;
pub use phases::{CellPhaseTransform, PhaseTransform};
