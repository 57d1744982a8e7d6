use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use super::error::FetchError;
use crate::base_system::context::Config;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// 远端文档来源：给定 URL 返回响应体文本。
///
/// 下载流程只依赖这个 trait，测试中用内存实现替换真实网络。
pub trait RemoteSource {
    fn get_body(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: RemoteSource + ?Sized> RemoteSource for &T {
    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        (**self).get_body(url)
    }
}

/// 基于 reqwest blocking 的边界数据客户端。
pub struct GeoClient {
    client: Client,
}

impl GeoClient {
    pub fn new(timeout_ms: Option<u64>, connect_timeout_ms: Option<u64>) -> Result<Self, FetchError> {
        // 未启用 gzip 解码，要求服务端返回原始编码。
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms.max(50)));
        }
        if let Some(ms) = connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms.max(50)));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, FetchError> {
        let timeout_ms = Some(cfg.request_timeout.saturating_mul(1000).max(100));
        let connect_timeout_ms = ms_from_connect_timeout_secs(cfg.min_connect_timeout);
        Self::new(timeout_ms, connect_timeout_ms)
    }
}

impl RemoteSource for GeoClient {
    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        debug!(target: "network", "GET {url}");
        let resp = self.client.get(url).send()?;
        let resp = resp.error_for_status()?;
        Ok(resp.text()?)
    }
}

pub(crate) fn ms_from_connect_timeout_secs(v: f64) -> Option<u64> {
    if v <= 0.0 {
        return None;
    }
    let ms = (v * 1000.0).round() as i64;
    if ms <= 0 { None } else { Some(ms as u64) }
}
