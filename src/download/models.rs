//! 下载相关的数据模型：单项任务、省级结果与整体统计。

use crate::area::AreaCode;
use crate::base_system::area_paths::TargetDir;

/// 一次“拉取并保存”：代码、目标目录与进度条上显示的标签。
#[derive(Debug, Clone)]
pub struct WorkUnit<'a> {
    pub code: &'a AreaCode,
    pub name: &'a str,
    pub dir: TargetDir,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceOutcome {
    pub code: AreaCode,
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone)]
pub struct DownloadResult {
    pub success: u32,
    pub failed: u32,
    pub provinces: Vec<ProvinceOutcome>,
}

impl DownloadResult {
    pub fn attempted(&self) -> u32 {
        self.success + self.failed
    }
}

/// 单项的处理结果；失败只影响该项本身。
#[derive(Debug)]
pub(crate) enum ItemOutcome {
    Saved,
    Failed(String),
}
