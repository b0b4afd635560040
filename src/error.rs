//! # 统一错误处理模块
//!
//! 定义 phonopy2euphonic 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// phonopy2euphonic 统一错误类型
#[derive(Error, Debug)]
pub enum ConvertError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Malformed YAML in {path}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize JSON for {path}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "hdf5")]
    #[error("Failed to read HDF5 file: {path}")]
    Hdf5Error {
        path: String,
        #[source]
        source: hdf5::Error,
    },

    #[error("Cannot read {path}: this build has no HDF5 support (rebuild with `--features hdf5`)")]
    Hdf5Unsupported { path: String },

    #[error("Unknown {quantity} unit '{unit}'")]
    UnknownUnit { quantity: String, unit: String },

    // ─────────────────────────────────────────────────────────────
    // 模型一致性错误
    // ─────────────────────────────────────────────────────────────
    #[error("Inconsistent primitive/supercell index mapping: {0}")]
    InconsistentIndexMap(String),

    #[error("Inconsistent force constants model: {0}")]
    InconsistentModel(String),

    #[error(
        "Supercell atom {atom} is not a lattice translation of its primitive atom \
         (offset {offset:?} is not integral)"
    )]
    NonIntegerCellOrigin { atom: usize, offset: [f64; 3] },

    // ─────────────────────────────────────────────────────────────
    // 不支持的功能
    // ─────────────────────────────────────────────────────────────
    #[error("Not implemented: {0}")]
    Unsupported(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ConvertError>;
