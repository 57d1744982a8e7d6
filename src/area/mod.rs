//! 行政区划：编码规则与地区信息表。
//!
//! - `code`     — 6 位行政区划代码及其层级判定
//! - `registry` — 从 infos.json 加载的代码 → 名称映射与层级查询

pub mod code;
pub mod registry;

pub use code::{AreaCode, AreaLevel};
pub use registry::{AreaInfo, AreaRegistry};
