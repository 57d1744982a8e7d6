//! 彩色状态行：✓ 成功、✗ 失败、ℹ 提示、→ 阶段。

use std::fmt::Display;

use crossterm::style::Stylize;

pub fn success_line(msg: impl Display) -> String {
    format!("{} {msg}", "✓".green())
}

pub fn failure_line(msg: impl Display) -> String {
    format!("{} {msg}", "✗".red())
}

pub fn info_line(msg: impl Display) -> String {
    format!("{} {msg}", "ℹ".blue())
}

pub fn step_line(msg: impl Display) -> String {
    format!("{} {msg}", "→".blue())
}

pub fn success(msg: impl Display) {
    println!("{}", success_line(msg));
}

pub fn failure(msg: impl Display) {
    eprintln!("{}", failure_line(msg));
}

pub fn info(msg: impl Display) {
    println!("{}", info_line(msg));
}

pub fn step(msg: impl Display) {
    println!("{}", step_line(msg));
}

pub fn done(msg: impl Display) {
    println!("{} {}", "✨".green(), msg.to_string().bold());
}

pub fn banner(title: &str) {
    println!("\n{}\n", format!(" {title} ").bold().on_blue());
}
