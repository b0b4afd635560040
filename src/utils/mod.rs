//! # 工具函数模块
//!
//! 提供美化输出、进度提示和 3x3 矩阵运算。
//!
//! ## 依赖关系
//! - 被 `commands/`, `models/`, `converters/` 使用
//! - 子模块: output, progress, linalg

pub mod linalg;
pub mod output;
pub mod progress;
