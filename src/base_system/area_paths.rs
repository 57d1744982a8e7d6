use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::area::AreaCode;
use crate::base_system::context::{NameFormat, safe_fs_name};

const COUNTRY_FILE: &str = "china.json";

/// 输出子目录，由调用方按层级选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDir {
    Root,
    Province,
    City,
    County,
}

impl TargetDir {
    pub const SUBDIRS: [TargetDir; 3] = [TargetDir::Province, TargetDir::City, TargetDir::County];

    pub fn dir_name(self) -> &'static str {
        match self {
            TargetDir::Root => "",
            TargetDir::Province => "province",
            TargetDir::City => "citys",
            TargetDir::County => "county",
        }
    }
}

/// 计算每个地区的输出路径。不做任何 IO。
#[derive(Debug, Clone)]
pub struct PathPlanner {
    root: PathBuf,
    format: NameFormat,
}

impl PathPlanner {
    pub fn new(root: impl Into<PathBuf>, format: NameFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn info_path(&self) -> PathBuf {
        self.root.join("info.json")
    }

    pub fn directory(&self, dir: TargetDir) -> PathBuf {
        match dir {
            TargetDir::Root => self.root.clone(),
            other => self.root.join(other.dir_name()),
        }
    }

    /// 文件名：全国固定为 `china.json`；其余按命名方式取代码或 `{名称}{tag}`。
    ///
    /// `tag` 仅用于区分同名的同级地区，通常为空。
    pub fn file_name(&self, code: &AreaCode, name: &str, tag: &str) -> String {
        if code.is_country() {
            return COUNTRY_FILE.to_string();
        }
        match self.format {
            NameFormat::Adcode => format!("{code}.json"),
            NameFormat::Chinese => {
                format!("{}.json", safe_fs_name(&format!("{name}{tag}"), "_", 120))
            }
        }
    }

    pub fn resolve(
        &self,
        dir: TargetDir,
        code: &AreaCode,
        name: &str,
        tag: &str,
    ) -> (PathBuf, String) {
        (self.directory(dir), self.file_name(code, name, tag))
    }

    pub fn target(&self, dir: TargetDir, code: &AreaCode, name: &str) -> PathBuf {
        let (dir, file) = self.resolve(dir, code, name, "");
        dir.join(file)
    }

    /// 创建输出根目录与三个层级子目录，已存在时不报错。
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        for dir in TargetDir::SUBDIRS {
            fs::create_dir_all(self.directory(dir))?;
        }
        Ok(())
    }
}
