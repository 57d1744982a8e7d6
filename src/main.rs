//! 中国行政区划边界 GeoJSON 下载器。
//!
//! 从 DataV 边界接口拉取全国、各省、各市、各县区的 GeoJSON，按层级保存到本地目录。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/输出路径/文件写入等基础设施
//! - `area`：行政区划代码规则与地区信息表
//! - `network`：HTTP 客户端与错误类型
//! - `download`：下载流程编排（计划、单项下载、进度）
//! - `ui`：命令行输出

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::error;

mod area;
mod base_system;
mod download;
mod network;
mod ui;

use base_system::config::load_or_create;
use base_system::context::{Config, NameFormat};
use base_system::logging::{LogOptions, LogSystem};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "china-geojson-downloader")]
#[command(about = "下载中国行政区划边界 GeoJSON（全国 / 省 / 市 / 县）")]
struct Cli {
    /// 启用调试日志，并同时输出到终端（进度改为逐行文本）
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录（存放 config.yml 与 logs）
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 指定配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出文件命名方式
    #[arg(long, value_enum, env = "GEO_NAME_FORMAT")]
    name_format: Option<NameFormat>,

    /// 输出根目录
    #[arg(long, env = "GEO_OUTPUT_DIR")]
    output_dir: Option<String>,

    /// 边界数据地址前缀
    #[arg(long, env = "GEO_BASE_URL")]
    base_url: Option<String>,

    /// 地区信息表地址
    #[arg(long, env = "GEO_INFO_URL")]
    info_url: Option<String>,

    /// 每次请求后的等待时间（毫秒）
    #[arg(long, env = "GEO_DELAY_MS")]
    delay_ms: Option<u64>,

    /// 使用逐行文本进度
    #[arg(long, default_value_t = false)]
    plain: bool,
}

impl Cli {
    /// 命令行 / 环境变量覆盖配置文件中的值。
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(format) = self.name_format {
            config.name_format = format;
        }
        if let Some(dir) = &self.output_dir {
            config.save_path = dir.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(url) = &self.info_url {
            config.info_url = url.clone();
        }
        if let Some(ms) = self.delay_ms {
            config.request_delay_ms = ms;
        }
        // 调试日志写 stderr，会与原地刷新的进度条交错
        if self.plain || self.debug {
            config.plain_progress = true;
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = load_or_create::<Config>(cli.config.as_deref(), cli.data_dir.as_deref())
        .context("加载配置失败")?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version {
        println!("China GeoJSON Downloader v{VERSION}");
        return Ok(ExitCode::SUCCESS);
    }

    let _log = init_logging(cli.debug, cli.data_dir.as_deref())?;

    // 致命错误只在这里向用户报告一次
    if let Err(err) = load_config(&cli).and_then(ui::console::run) {
        error!(target: "startup", "运行失败: {err:#}");
        ui::status::failure(format!("运行失败: {err:#}"));
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(debug: bool, base_dir: Option<&Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        use_color: true,
        archive_on_exit: true,
        console: debug,
    };
    LogSystem::init_with_base(opts, base_dir).map_err(|e| anyhow!(e))
}
