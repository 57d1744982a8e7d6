use anyhow::{Context, Result};
use tracing::info;

use super::status;
use crate::base_system::context::Config;
use crate::download::downloader::Downloader;
use crate::network::GeoClient;

pub fn run(config: Config) -> Result<()> {
    status::banner("中国地图数据下载工具");
    info!(
        target: "startup",
        name_format = ?config.name_format,
        output = %config.default_save_dir().display(),
        base_url = %config.base_url,
        "开始下载"
    );

    let client = GeoClient::from_config(&config).context("初始化 HTTP 客户端失败")?;
    let result = Downloader::new(config, client).run()?;

    info!(
        target: "startup",
        attempted = result.attempted(),
        failed = result.failed,
        "下载结束"
    );
    Ok(())
}
