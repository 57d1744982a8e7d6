//! 配置文件（YAML）读写：缺失时按默认值生成带注释的文件，存在时与默认值合并。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读写配置文件 {path} 失败: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("配置文件 {path} 不是合法的 YAML: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("配置校验失败: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    pub name: &'static str,
    pub description: &'static str,
}

pub trait ConfigSpec: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;

    /// 写文件时的字段顺序与注释。
    fn fields() -> &'static [FieldMeta];

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// 读取配置；文件不存在则写出默认配置。
///
/// 路径优先级：`config_path` > `base_dir/FILE_NAME` > 当前目录下的 `FILE_NAME`。
/// 用户文件缺少某些字段时，用默认值补齐并回写（带注释）。
pub fn load_or_create<T: ConfigSpec>(
    config_path: Option<&Path>,
    base_dir: Option<&Path>,
) -> Result<T, ConfigError> {
    let path = resolve_path::<T>(config_path, base_dir);

    if !path.exists() {
        let config = T::default();
        write_with_comments(&config, &path)?;
        return Ok(config);
    }

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let user: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    let incomplete = has_missing_fields::<T>(&user);

    let mut merged = serde_yaml::to_value(T::default()).map_err(validation)?;
    merge_values(&mut merged, user);
    let config: T = serde_yaml::from_value(merged).map_err(validation)?;
    config.validate().map_err(ConfigError::Validation)?;

    if incomplete {
        write_with_comments(&config, &path)?;
    }
    Ok(config)
}

pub fn write_with_comments<T: ConfigSpec>(config: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let yaml = generate_yaml_with_comments(config)?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn generate_yaml_with_comments<T: ConfigSpec>(config: &T) -> Result<String, ConfigError> {
    let Value::Mapping(mapping) = serde_yaml::to_value(config).map_err(validation)? else {
        return Err(ConfigError::Validation(
            "配置必须序列化为映射".to_string(),
        ));
    };

    let mut out = String::new();
    for field in T::fields() {
        for line in field.description.lines().filter(|l| !l.is_empty()) {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        let key = Value::String(field.name.to_string());
        let val = mapping.get(&key).cloned().unwrap_or(Value::Null);
        let entry = serde_yaml::to_string(&Mapping::from_iter([(key, val)])).map_err(validation)?;
        out.push_str(entry.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn has_missing_fields<T: ConfigSpec>(user: &Value) -> bool {
    let Value::Mapping(map) = user else {
        return true;
    };
    T::fields()
        .iter()
        .any(|f| !map.contains_key(Value::String(f.name.to_string())))
}

fn merge_values(dest: &mut Value, user: Value) {
    match (dest, user) {
        (Value::Mapping(dest), Value::Mapping(src)) => {
            for (key, val) in src {
                if let Some(slot) = dest.get_mut(&key) {
                    merge_values(slot, val);
                } else {
                    dest.insert(key, val);
                }
            }
        }
        // null 表示用户留空，保留默认值
        (_, Value::Null) => {}
        (dest, other) => *dest = other,
    }
}

fn resolve_path<T: ConfigSpec>(path: Option<&Path>, base_dir: Option<&Path>) -> PathBuf {
    match (path, base_dir) {
        (Some(p), _) => p.to_path_buf(),
        (None, Some(base)) => base.join(T::FILE_NAME),
        (None, None) => PathBuf::from(T::FILE_NAME),
    }
}

fn validation(err: serde_yaml::Error) -> ConfigError {
    ConfigError::Validation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        mode: String,
        delay: u64,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                mode: "adcode".into(),
                delay: 200,
            }
        }
    }

    impl ConfigSpec for Sample {
        const FILE_NAME: &'static str = "sample.yml";

        fn fields() -> &'static [FieldMeta] {
            static FIELDS: [FieldMeta; 2] = [
                FieldMeta {
                    name: "mode",
                    description: "命名方式",
                },
                FieldMeta {
                    name: "delay",
                    description: "请求间隔",
                },
            ];
            &FIELDS
        }

        fn validate(&self) -> Result<(), String> {
            if self.mode.is_empty() {
                return Err("mode 不能为空".into());
            }
            Ok(())
        }
    }

    #[test]
    fn creates_commented_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Sample = load_or_create(None, Some(dir.path())).unwrap();
        assert_eq!(cfg, Sample::default());

        let written = fs::read_to_string(dir.path().join("sample.yml")).unwrap();
        assert_eq!(written, "# 命名方式\nmode: adcode\n# 请求间隔\ndelay: 200\n");
    }

    #[test]
    fn merges_partial_file_and_fills_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yml");
        fs::write(&path, "mode: chinese\n").unwrap();

        let cfg: Sample = load_or_create(Some(&path), None).unwrap();
        assert_eq!(cfg.mode, "chinese");
        assert_eq!(cfg.delay, 200);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("delay: 200"));
        assert!(written.contains("mode: chinese"));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yml");
        fs::write(&path, "mode: [unterminated\n").unwrap();
        let err = load_or_create::<Sample>(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validation_hook_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yml");
        fs::write(&path, "mode: ''\ndelay: 1\n").unwrap();
        let err = load_or_create::<Sample>(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
