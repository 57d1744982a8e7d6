//! 下载主流程编排：地区信息 → 全国 → 各省（省 → 市 → 县）。
//!
//! 全程单线程顺序执行，同一时刻只有一个请求在途。
//! 地区信息表拉取失败是致命错误；单个地区失败只记录日志，进度照常推进。

use anyhow::{Context, Result, anyhow};
use crossterm::style::Stylize;
use tracing::{error, info, warn};

use super::fetcher::Fetcher;
use super::models::{DownloadResult, ItemOutcome, ProvinceOutcome, WorkUnit};
use super::plan::{DownloadPlan, ProvincePlan};
use super::progress::{ProgressMode, ProgressReporter};
use crate::area::{AreaCode, AreaLevel, AreaRegistry};
use crate::base_system::area_paths::{PathPlanner, TargetDir};
use crate::base_system::context::Config;
use crate::network::RemoteSource;
use crate::ui::status;

pub struct Downloader<S> {
    config: Config,
    fetcher: Fetcher<S>,
    planner: PathPlanner,
    progress: ProgressMode,
}

impl<S: RemoteSource> Downloader<S> {
    pub fn new(config: Config, source: S) -> Self {
        let fetcher = Fetcher::new(source, config.request_delay());
        let planner = PathPlanner::new(config.default_save_dir(), config.name_format);
        let progress = ProgressMode::detect(config.plain_progress);
        Self {
            config,
            fetcher,
            planner,
            progress,
        }
    }

    #[cfg(test)]
    pub fn with_progress_mode(mut self, mode: ProgressMode) -> Self {
        self.progress = mode;
        self
    }

    pub fn run(&self) -> Result<DownloadResult> {
        self.planner.ensure_dirs().with_context(|| {
            format!("创建输出目录失败: {}", self.planner.root().display())
        })?;

        status::info("正在获取地区信息...");
        let info_path = self.planner.info_path();
        let registry =
            match AreaRegistry::load(self.fetcher.source(), &self.config.info_url, &info_path) {
                Ok(r) => {
                    status::success("地区信息已保存至 info.json");
                    r
                }
                Err(err) => {
                    error!(target: "download", url = %self.config.info_url, "获取地区信息失败: {err}");
                    return Err(anyhow!(err).context("获取地区信息失败"));
                }
            };

        if registry.is_empty() {
            warn!(target: "download", "地区信息表为空，只会下载全国地图");
        }
        let plan = DownloadPlan::build(&registry);
        info!(
            target: "download",
            total = plan.total_files(),
            provinces = plan.province_count(),
            "下载计划已生成"
        );
        status::info(format!(
            "总计需要下载 {} 个地图文件",
            plan.total_files().to_string().yellow()
        ));
        status::info(format!(
            "共有 {} 个省级行政区\n",
            plan.province_count().to_string().yellow()
        ));

        let mut result = DownloadResult::default();
        self.download_country(&plan, &mut result)?;

        for province in &plan.provinces {
            let outcome = self.download_province(province, &mut result)?;
            result.provinces.push(outcome);
        }

        info!(
            target: "download",
            success = result.success,
            failed = result.failed,
            "全部遍历结束"
        );
        if result.failed > 0 {
            for p in result.provinces.iter().filter(|p| p.failed > 0) {
                status::info(format!(
                    "{}（{}）失败 {} 个，已处理 {}/{}",
                    p.name, p.code, p.failed, p.completed, p.total
                ));
            }
            status::info(format!(
                "成功 {} 个，失败 {} 个（详见 logs/latest.log）",
                result.success, result.failed
            ));
        }
        status::done("所有地图数据下载完成！\n");
        Ok(result)
    }

    fn download_country(&self, plan: &DownloadPlan<'_>, result: &mut DownloadResult) -> Result<()> {
        let code = AreaCode::country();
        let unit = WorkUnit {
            code: &code,
            name: plan.country.map(|a| a.name.as_str()).unwrap_or_default(),
            dir: TargetDir::Root,
            label: format!("{}地图", AreaLevel::Country.label()),
        };
        let dest = self.planner.target(unit.dir, unit.code, unit.name);
        match self.attempt(&unit, result)? {
            ItemOutcome::Saved => status::success(format!(
                "成功下载: {}",
                dest.display().to_string().cyan()
            )),
            ItemOutcome::Failed(line) => eprintln!("{line}"),
        }
        status::step(format!("{}下载完成\n", unit.label));
        Ok(())
    }

    fn download_province(
        &self,
        plan: &ProvincePlan<'_>,
        result: &mut DownloadResult,
    ) -> Result<ProvinceOutcome> {
        let province = plan.province;
        let total = plan.total();
        status::step(format!("开始处理: {}", province.name.as_str().bold()));
        status::info(format!("需要下载 {} 个地图文件", total.to_string().yellow()));
        info!(target: "download", code = %province.code, total, "开始处理 {}", province.name);

        let sink = self.progress.make_sink(&province.name, total);
        let mut reporter = ProgressReporter::new(&province.name, total, sink);
        let mut failed = 0;

        let mut units = vec![WorkUnit {
            code: &province.code,
            name: &province.name,
            dir: TargetDir::Province,
            label: format!("{}地图", province.level.label()),
        }];
        for city in &plan.cities {
            units.push(WorkUnit {
                code: &city.city.code,
                name: &city.city.name,
                dir: TargetDir::City,
                label: format!("{}: {}", city.city.level.label(), city.city.name),
            });
            units.extend(city.counties.iter().map(|county| WorkUnit {
                code: &county.code,
                name: &county.name,
                dir: TargetDir::County,
                label: format!("{}: {}", county.level.label(), county.name),
            }));
        }

        for unit in &units {
            if let ItemOutcome::Failed(line) = self.attempt(unit, result)? {
                failed += 1;
                reporter.message(&line);
            }
            reporter.advance(&unit.label);
        }

        let state = reporter.finish();
        status::success(format!("{} 处理完成！\n", province.name.as_str().bold()));

        Ok(ProvinceOutcome {
            code: province.code.clone(),
            name: province.name.clone(),
            total,
            completed: state.completed,
            failed,
        })
    }

    /// 下载单个地区。只有意外的序列化错误会向上传播，其余失败转为 `Failed`。
    fn attempt(&self, unit: &WorkUnit<'_>, result: &mut DownloadResult) -> Result<ItemOutcome> {
        let url = self.config.area_url(unit.code.as_str());
        let dest = self.planner.target(unit.dir, unit.code, unit.name);

        match self.fetcher.fetch_and_store(&url, &dest) {
            Ok(()) => {
                result.success += 1;
                Ok(ItemOutcome::Saved)
            }
            Err(err) if err.is_fatal() => {
                error!(target: "download", %url, "{err}");
                Err(anyhow!(err).context(format!("处理 {url} 时出现意外错误")))
            }
            Err(err) => {
                result.failed += 1;
                warn!(target: "download", %url, code = %unit.code, "下载失败: {err}");
                Ok(ItemOutcome::Failed(status::failure_line(format!(
                    "下载失败: {} {err}",
                    url.as_str().cyan()
                ))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::context::NameFormat;
    use crate::download::progress::Frames;
    use crate::network::memory::MemorySource;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;

    const BASE: &str = "https://example.test/bound/";
    const INFO: &str = "https://example.test/bound/infos.json";
    const GEO: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    fn config(root: &Path, format: NameFormat) -> Config {
        Config {
            name_format: format,
            save_path: root.display().to_string(),
            base_url: BASE.to_string(),
            info_url: INFO.to_string(),
            request_delay_ms: 0,
            plain_progress: true,
            ..Config::default()
        }
    }

    fn url(code: &str) -> String {
        format!("{BASE}{code}.json")
    }

    fn beijing_source() -> MemorySource {
        MemorySource::default()
            .with(
                INFO,
                r#"{"100000":{"name":"China"},"110000":{"name":"Beijing"},"110100":{"name":"Beijing City"},"110101":{"name":"Dongcheng"}}"#,
            )
            .with(&url("100000"), GEO)
            .with(&url("110000"), GEO)
            .with(&url("110100"), GEO)
            .with(&url("110101"), GEO)
    }

    fn files_under(root: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut out = BTreeMap::new();
        for dir in ["", "province", "citys", "county"] {
            let Ok(entries) = fs::read_dir(root.join(dir)) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    let rel = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
                    out.insert(rel, fs::read(&path).unwrap());
                }
            }
        }
        out
    }

    #[test]
    fn downloads_full_hierarchy_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = beijing_source();
        let downloader = Downloader::new(config(dir.path(), NameFormat::Adcode), &source)
            .with_progress_mode(ProgressMode::Plain);

        let result = downloader.run().unwrap();

        let files: Vec<_> = files_under(dir.path()).into_keys().collect();
        assert_eq!(
            files,
            [
                "china.json",
                "citys/110100.json",
                "county/110101.json",
                "info.json",
                "province/110000.json",
            ]
        );
        assert_eq!(
            source.requests(),
            [
                INFO.to_string(),
                url("100000"),
                url("110000"),
                url("110100"),
                url("110101")
            ]
        );
        assert_eq!(result.success, 4);
        assert_eq!(result.failed, 0);
        assert_eq!(result.provinces.len(), 1);
        assert_eq!(result.provinces[0].total, 3);
        assert_eq!(result.provinces[0].completed, 3);
    }

    fn labels(frames: &Frames) -> Vec<String> {
        frames.lock().unwrap().iter().map(|(_, item)| item.clone()).collect()
    }

    #[test]
    fn progress_labels_follow_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let source = beijing_source();
        let frames = Frames::default();
        let downloader = Downloader::new(config(dir.path(), NameFormat::Adcode), &source)
            .with_progress_mode(ProgressMode::Recording(frames.clone()));

        downloader.run().unwrap();

        assert_eq!(
            labels(&frames),
            ["省级地图", "市级: Beijing City", "县区: Dongcheng"]
        );
        let recorded = frames.lock().unwrap();
        let steps: Vec<_> = recorded.iter().map(|(s, _)| s.completed).collect();
        assert_eq!(steps, [1, 2, 3]);
        let (last, _) = recorded.last().unwrap();
        assert_eq!(last.total, 3);
        assert_eq!(last.percent(), 100);
    }

    #[test]
    fn malformed_county_is_logged_and_traversal_continues() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::default()
            .with(
                INFO,
                r#"{"100000":{"name":"中国"},"110000":{"name":"北京市"},"110100":{"name":"北京城区"},"110101":{"name":"东城区"},"110102":{"name":"西城区"}}"#,
            )
            .with(&url("100000"), GEO)
            .with(&url("110000"), GEO)
            .with(&url("110100"), GEO)
            .with(&url("110101"), "{\"type\": \"Feature")
            .with(&url("110102"), GEO);
        let frames = Frames::default();
        let downloader = Downloader::new(config(dir.path(), NameFormat::Adcode), &source)
            .with_progress_mode(ProgressMode::Recording(frames.clone()));

        let result = downloader.run().unwrap();

        let province = &result.provinces[0];
        assert_eq!(province.total, 4);
        assert_eq!(province.completed, 4);
        assert_eq!(province.failed, 1);
        assert_eq!(result.failed, 1);
        assert!(!dir.path().join("county/110101.json").exists());
        assert!(dir.path().join("county/110102.json").exists());
        assert_eq!(source.requests().last().unwrap(), &url("110102"));
        assert_eq!(
            labels(&frames),
            ["省级地图", "市级: 北京城区", "县区: 东城区", "县区: 西城区"]
        );
        assert_eq!(frames.lock().unwrap()[2].0.completed, 3);
    }

    #[test]
    fn registry_failure_aborts_before_any_area_download() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::default().with(&url("100000"), GEO);
        let downloader = Downloader::new(config(dir.path(), NameFormat::Adcode), &source)
            .with_progress_mode(ProgressMode::Plain);

        let err = downloader.run().unwrap_err();
        let shown = format!("{err:#}");
        assert!(shown.starts_with("获取地区信息失败: "));
        assert_eq!(shown.matches("获取地区信息失败").count(), 1);
        assert_eq!(source.requests(), [INFO.to_string()]);
        assert!(!dir.path().join("china.json").exists());
        assert!(dir.path().join("province").is_dir());
    }

    #[test]
    fn missing_country_download_does_not_stop_provinces() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::default()
            .with(INFO, r#"{"110000":{"name":"北京市"}}"#)
            .with(&url("110000"), GEO);
        let downloader = Downloader::new(config(dir.path(), NameFormat::Adcode), &source)
            .with_progress_mode(ProgressMode::Plain);

        let result = downloader.run().unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.success, 1);
        assert!(dir.path().join("province/110000.json").exists());
    }

    #[test]
    fn chinese_naming_mode() {
        let dir = tempfile::tempdir().unwrap();
        let source = beijing_source();
        let downloader = Downloader::new(config(dir.path(), NameFormat::Chinese), &source)
            .with_progress_mode(ProgressMode::Plain);

        downloader.run().unwrap();

        let files: Vec<_> = files_under(dir.path()).into_keys().collect();
        assert_eq!(
            files,
            [
                "china.json",
                "citys/Beijing City.json",
                "county/Dongcheng.json",
                "info.json",
                "province/Beijing.json",
            ]
        );
    }

    #[test]
    fn rerun_produces_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = beijing_source();
        let downloader = Downloader::new(config(dir.path(), NameFormat::Adcode), &source)
            .with_progress_mode(ProgressMode::Plain);

        downloader.run().unwrap();
        let first = files_under(dir.path());
        downloader.run().unwrap();
        let second = files_under(dir.path());

        assert_eq!(first, second);
    }
}
