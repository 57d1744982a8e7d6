//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};

/// 输出文件命名方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NameFormat {
    /// `{代码}.json`
    #[default]
    Adcode,
    /// `{中文名}.json`
    Chinese,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 命名与路径
    #[serde(default)]
    pub name_format: NameFormat,
    #[serde(default)]
    pub save_path: String,

    // 数据源
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_info_url")]
    pub info_url: String,

    // 网络配置
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_min_connect_timeout")]
    pub min_connect_timeout: f64,

    // 界面
    #[serde(default)]
    pub plain_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_format: NameFormat::default(),
            save_path: String::new(),
            base_url: default_base_url(),
            info_url: default_info_url(),
            request_delay_ms: default_request_delay_ms(),
            request_timeout: default_request_timeout(),
            min_connect_timeout: default_min_connect_timeout(),
            plain_progress: false,
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 8] = [
            FieldMeta {
                name: "name_format",
                description: "输出文件命名方式, 可选: [adcode, chinese]",
            },
            FieldMeta {
                name: "save_path",
                description: "输出根目录（留空为当前目录）",
            },
            FieldMeta {
                name: "base_url",
                description: "边界数据下载地址前缀, 实际请求为 {base_url}{代码}.json",
            },
            FieldMeta {
                name: "info_url",
                description: "地区信息表（全部行政区划代码）地址",
            },
            FieldMeta {
                name: "request_delay_ms",
                description: "每次请求后的固定等待时间, 单位ms",
            },
            FieldMeta {
                name: "request_timeout",
                description: "请求超时时间（秒）",
            },
            FieldMeta {
                name: "min_connect_timeout",
                description: "最小连接超时时间（秒）",
            },
            FieldMeta {
                name: "plain_progress",
                description: "使用逐行文本进度（适合重定向到文件或非交互终端）",
            },
        ];
        &FIELDS
    }

    fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url 不能为空".to_string());
        }
        if self.info_url.trim().is_empty() {
            return Err("info_url 不能为空".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn default_save_dir(&self) -> PathBuf {
        if self.save_path.trim().is_empty() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            PathBuf::from(&self.save_path)
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 单个地区的边界数据地址。
    pub fn area_url(&self, code: &str) -> String {
        let base = self.base_url.trim();
        if base.ends_with('/') {
            format!("{base}{code}.json")
        } else {
            format!("{base}/{code}.json")
        }
    }
}

/// 把名称转换为可安全用作文件名的形式。
pub fn safe_fs_name(name: &str, replacement: &str, max_len: usize) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|ch| match ch {
            ':' => '：',
            '"' => '＂',
            '<' => '《',
            '>' => '》',
            '/' | '\\' => '、',
            '|' => '｜',
            '?' => '？',
            '*' => '＊',
            c if (c as u32) < 32 => replacement.chars().next().unwrap_or('_'),
            _ => ch,
        })
        .collect();

    trim_trailing_dots(&mut cleaned);

    const RESERVED: [&str; 22] = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    if RESERVED.contains(&cleaned.to_uppercase().as_str()) {
        cleaned.insert(0, '_');
    }

    if cleaned.len() > max_len {
        // 按字符边界截断，避免切断中文
        let mut end = max_len;
        while end > 0 && !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
        trim_trailing_dots(&mut cleaned);
    }

    cleaned
}

fn trim_trailing_dots(s: &mut String) {
    while s.ends_with(' ') || s.ends_with('.') {
        s.pop();
    }
    if s.is_empty() {
        s.push_str("unnamed");
    }
}

fn default_base_url() -> String {
    "https://geo.datav.aliyun.com/areas_v3/bound/".to_string()
}

fn default_info_url() -> String {
    "https://geo.datav.aliyun.com/areas_v3/bound/infos.json".to_string()
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_request_timeout() -> u64 {
    15
}

fn default_min_connect_timeout() -> f64 {
    3.05
}
