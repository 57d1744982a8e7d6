//! 地区信息表（infos.json）。
//!
//! 层级关系不单独存储，每次查询都对整张表做一次线性扫描；
//! 数据量在几千条，扫描开销可以忽略。

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};

use super::code::{AreaCode, AreaLevel};
use crate::base_system::file_writer::write_atomic;
use crate::network::{FetchError, RemoteSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaInfo {
    pub code: AreaCode,
    pub name: String,
    pub level: AreaLevel,
}

/// 代码 → 地区信息，保持源文档中的键顺序。
#[derive(Debug, Default)]
pub struct AreaRegistry {
    areas: IndexMap<AreaCode, AreaInfo>,
}

impl AreaRegistry {
    /// 拉取地区信息表，并把压缩后的文档写到 `info_path`。
    ///
    /// 文档先落盘再解释，即使后续条目解析有告警，`info.json` 也已保存。
    pub fn load<S: RemoteSource>(
        source: &S,
        info_url: &str,
        info_path: &Path,
    ) -> Result<Self, FetchError> {
        let body = source.get_body(info_url)?;
        let value: Value = serde_json::from_str(&body)?;
        let compact =
            serde_json::to_vec(&value).map_err(|e| FetchError::Encode(e.to_string()))?;
        write_atomic(info_path, &compact)?;
        info!(target: "registry", "地区信息已保存至 {}", info_path.display());

        let registry = Self::from_value(&value)?;
        info!(target: "registry", "共载入 {} 个行政区划", registry.len());
        Ok(registry)
    }

    #[cfg(test)]
    pub fn from_json(raw: &str) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, FetchError> {
        let Value::Object(map) = value else {
            return Err(FetchError::Parse(
                "地区信息应为 {代码: {name}} 形式的对象".to_string(),
            ));
        };

        let mut areas = IndexMap::with_capacity(map.len());
        for (key, entry) in map {
            let code: AreaCode = match key.parse() {
                Ok(c) => c,
                Err(err) => {
                    warn!(target: "registry", "跳过无效条目: {err}");
                    continue;
                }
            };
            let name = match entry.get("name").and_then(Value::as_str) {
                Some(n) => n.to_string(),
                None => {
                    warn!(target: "registry", "条目 {code} 缺少 name 字段，使用代码代替");
                    code.to_string()
                }
            };
            let level = code.level();
            areas.insert(code.clone(), AreaInfo { code, name, level });
        }

        Ok(Self { areas })
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, code: &str) -> Option<&AreaInfo> {
        let code: AreaCode = code.parse().ok()?;
        self.areas.get(&code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AreaInfo> {
        self.areas.values()
    }

    pub fn country(&self) -> Option<&AreaInfo> {
        self.iter().find(|a| a.code.is_country())
    }

    /// 所有省级代码（以 `0000` 结尾且不是 `100000`），按文档顺序。
    pub fn provinces(&self) -> Vec<&AreaInfo> {
        self.iter()
            .filter(|a| a.level == AreaLevel::Province)
            .collect()
    }

    /// 前 2 位与省份相同、以 `00` 结尾、且不是省份本身的代码。
    pub fn cities_of(&self, province: &AreaCode) -> Vec<&AreaInfo> {
        let prefix = province.province_prefix();
        self.iter()
            .filter(|a| {
                let c = a.code.as_str();
                c.starts_with(prefix) && c.ends_with("00") && a.code != *province
            })
            .collect()
    }

    /// 前 4 位与城市相同、且不以 `00` 结尾的代码。
    pub fn counties_of(&self, city: &AreaCode) -> Vec<&AreaInfo> {
        let prefix = city.city_prefix();
        self.iter()
            .filter(|a| {
                let c = a.code.as_str();
                c.starts_with(prefix) && !c.ends_with("00")
            })
            .collect()
    }
}
