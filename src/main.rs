//! # phonopy2euphonic - phonopy 力常数转换为 euphonic JSON
//!
//! 读取 `<seedname>-phonopy.yaml`（以及可选的
//! `<seedname>-force_constants.hdf5`），转换为 euphonic 的
//! `ForceConstants` JSON 文件。
//!
//! ## 流程
//! 1. Locator   - 按文件名约定查找伴随的 HDF5 力常数
//! 2. Loader    - 解析 phonopy 模型
//! 3. 索引映射  - 超胞原子 → 原胞原子索引
//! 4. 组装      - 相位约定变换，附加单位
//! 5. Writer    - 写出 euphonic JSON
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/    (读取 phonopy / 写出 euphonic)
//!   │     ├── converters/ (索引映射、相位变换、组装)
//!   │     └── models/     (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod converters;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error_chain(&e);
        std::process::exit(1);
    }
}
