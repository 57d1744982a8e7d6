//! 下载流程模块入口。
//!
//! 子模块：
//! - `models`     — 数据模型（WorkUnit / ProvinceOutcome / DownloadResult）
//! - `fetcher`    — 单项请求、解析与写盘
//! - `progress`   — 省级进度上报与 CLI 进度条
//! - `plan`       — 省 → 市 → 县遍历计划与任务计数
//! - `downloader` — 下载主流程编排

pub mod downloader;
pub mod fetcher;
pub mod models;
pub mod plan;
pub mod progress;
