//! 下载计划：从地区信息表推导出省 → 市 → 县三级遍历顺序与任务数。

use crate::area::{AreaInfo, AreaRegistry};

#[derive(Debug)]
pub struct CityPlan<'a> {
    pub city: &'a AreaInfo,
    pub counties: Vec<&'a AreaInfo>,
}

#[derive(Debug)]
pub struct ProvincePlan<'a> {
    pub province: &'a AreaInfo,
    pub cities: Vec<CityPlan<'a>>,
}

impl ProvincePlan<'_> {
    /// 省级 1 个 + 各市 + 各县。
    pub fn total(&self) -> usize {
        1 + self.cities.len() + self.cities.iter().map(|c| c.counties.len()).sum::<usize>()
    }
}

#[derive(Debug)]
pub struct DownloadPlan<'a> {
    pub country: Option<&'a AreaInfo>,
    pub provinces: Vec<ProvincePlan<'a>>,
}

impl<'a> DownloadPlan<'a> {
    pub fn build(registry: &'a AreaRegistry) -> Self {
        let provinces = registry
            .provinces()
            .into_iter()
            .map(|province| ProvincePlan {
                province,
                cities: registry
                    .cities_of(&province.code)
                    .into_iter()
                    .map(|city| CityPlan {
                        city,
                        counties: registry.counties_of(&city.code),
                    })
                    .collect(),
            })
            .collect();

        Self {
            country: registry.country(),
            provinces,
        }
    }

    /// 全部文件数：全国 1 个加上各省合计。仅用于展示。
    pub fn total_files(&self) -> usize {
        1 + self.provinces.iter().map(ProvincePlan::total).sum::<usize>()
    }

    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }
}
