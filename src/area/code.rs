use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 全国的代码。
pub const COUNTRY_CODE: &str = "100000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AreaCodeError {
    #[error("行政区划代码必须为 6 位数字: {0:?}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaLevel {
    Country,
    Province,
    City,
    County,
}

impl AreaLevel {
    /// 按末尾补零的规则判定层级。`100000` 是全国，不算省份。
    pub fn classify(code: &str) -> Self {
        if code == COUNTRY_CODE {
            AreaLevel::Country
        } else if code.ends_with("0000") {
            AreaLevel::Province
        } else if code.ends_with("00") {
            AreaLevel::City
        } else {
            AreaLevel::County
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AreaLevel::Country => "全国",
            AreaLevel::Province => "省级",
            AreaLevel::City => "市级",
            AreaLevel::County => "县区",
        }
    }
}

/// 6 位行政区划代码，保留字符串形式（前缀即层级归属）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaCode(String);

impl AreaCode {
    pub fn country() -> Self {
        AreaCode(COUNTRY_CODE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn level(&self) -> AreaLevel {
        AreaLevel::classify(&self.0)
    }

    pub fn is_country(&self) -> bool {
        self.0 == COUNTRY_CODE
    }

    /// 省级前缀（前 2 位）。
    pub fn province_prefix(&self) -> &str {
        &self.0[..2]
    }

    /// 地级前缀（前 4 位）。
    pub fn city_prefix(&self) -> &str {
        &self.0[..4]
    }
}

impl FromStr for AreaCode {
    type Err = AreaCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(AreaCode(s.to_string()))
        } else {
            Err(AreaCodeError::Malformed(s.to_string()))
        }
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
