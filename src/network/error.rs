use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 单次“拉取并保存”可能出现的错误。
///
/// `Network` / `Parse` / `Write` 只影响当前条目；`Encode` 表示已解析的 JSON
/// 无法再序列化，属于意外情况，由调用方按致命错误处理。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求失败: {0}")]
    Network(String),
    #[error("JSON 解析失败: {0}")]
    Parse(String),
    #[error("写入 {path} 失败: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("JSON 序列化失败: {0}")]
    Encode(String),
}

impl FetchError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Encode(_))
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
