//! # 解析器模块
//!
//! phonopy 输入的读取和 euphonic 输出的写出。
//!
//! 读写能力通过 [`ModelLoader`] / [`ModelWriter`] 两个窄接口暴露，
//! 换用其他物理库或文件格式时只需提供新的实现。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: locate, phonopy_yaml, fc_hdf5, euphonic_json

pub mod euphonic_json;
pub mod fc_hdf5;
pub mod locate;
pub mod phonopy_yaml;

use crate::error::Result;
use crate::models::{ForceConstants, PhonopyModel};
use std::path::Path;

pub use euphonic_json::EuphonicJsonWriter;
pub use phonopy_yaml::PhonopyYamlLoader;

/// 读取源模型
pub trait ModelLoader {
    /// `fc_file` 为 None 时使用主文件内嵌的力常数
    fn load(&self, primary: &Path, fc_file: Option<&Path>) -> Result<PhonopyModel>;
}

/// 写出目标模型
pub trait ModelWriter {
    fn write(&self, fc: &ForceConstants, path: &Path) -> Result<()>;
}
