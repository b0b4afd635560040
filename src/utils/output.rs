//! # 美化输出工具
//!
//! 提供统一的终端输出样式。`--quiet` 时只保留错误输出。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块和 `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// 设置静默模式
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印错误及其完整的 source 链
pub fn print_error_chain(err: &dyn std::error::Error) {
    print_error(&err.to_string());
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("      {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "[WARN]".yellow().bold(), msg);
    }
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "[*]".blue().bold(), msg);
    }
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "[DONE]".green().bold(), msg);
    }
}

/// 打印表格
pub fn print_table(table: &str) {
    if !is_quiet() {
        println!("{}", table);
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    if !is_quiet() {
        let line = "─".repeat(60);
        println!("\n{}", line.dimmed());
        println!("  {}", title.bold());
        println!("{}\n", line.dimmed());
    }
}
