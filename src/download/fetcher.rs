//! 单项下载：请求一次、解析 JSON、压缩写盘、固定等待。

use std::path::Path;
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::base_system::file_writer::write_atomic;
use crate::network::{FetchError, RemoteSource};

pub struct Fetcher<S> {
    source: S,
    delay: Duration,
}

impl<S: RemoteSource> Fetcher<S> {
    pub fn new(source: S, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 拉取 `url` 并以压缩 JSON 覆盖写入 `dest`。
    ///
    /// 不重试；无论成败都在返回前等待固定间隔，控制对远端的请求频率。
    /// 响应体先完整解析再写盘，解析失败时目标文件保持原样。
    pub fn fetch_and_store(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let result = self.fetch_once(url, dest);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        result
    }

    fn fetch_once(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let body = self.source.get_body(url)?;
        let value: Value = serde_json::from_str(&body)?;
        let bytes = serde_json::to_vec(&value).map_err(|e| FetchError::Encode(e.to_string()))?;
        write_atomic(dest, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::MemorySource;
    use std::fs;
    use std::time::Instant;

    const URL: &str = "https://example.test/110000.json";

    #[test]
    fn stores_compact_json() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("110000.json");
        let source = MemorySource::default().with(
            URL,
            "{\n  \"type\": \"FeatureCollection\",\n  \"features\": [ ]\n}",
        );
        let fetcher = Fetcher::new(source, Duration::ZERO);

        fetcher.fetch_and_store(URL, &dest).unwrap();
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            r#"{"type":"FeatureCollection","features":[]}"#
        );
    }

    #[test]
    fn malformed_body_leaves_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("110000.json");
        fs::write(&dest, "{\"old\":true}").unwrap();
        let source = MemorySource::default().with(URL, "<html>502 Bad Gateway</html>");
        let fetcher = Fetcher::new(source, Duration::ZERO);

        let err = fetcher.fetch_and_store(URL, &dest).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "{\"old\":true}");
    }

    #[test]
    fn network_failure_is_single_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::default();
        let fetcher = Fetcher::new(&source, Duration::ZERO);

        let err = fetcher
            .fetch_and_store(URL, &dir.path().join("x.json"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(source.requests(), [URL]);
    }

    #[test]
    fn waits_after_failure_too() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(MemorySource::default(), Duration::from_millis(50));
        let start = Instant::now();
        let _ = fetcher.fetch_and_store(URL, &dir.path().join("x.json"));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
