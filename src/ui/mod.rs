//! 命令行前端：横幅、彩色状态行、运行入口。

pub mod console;
pub mod status;
