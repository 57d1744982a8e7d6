//! 输出文件写入。

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::network::FetchError;

/// 先写入同目录下的临时文件，再整体替换目标文件。
///
/// 目标已存在时直接覆盖；写入中途失败不会留下截断的目标文件。
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FetchError::write(path, e))?;
    tmp.write_all(bytes).map_err(|e| FetchError::write(path, e))?;
    tmp.flush().map_err(|e| FetchError::write(path, e))?;
    tmp.persist(path)
        .map_err(|e| FetchError::write(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        write_atomic(&path, b"{\"v\":1}").unwrap();
        write_atomic(&path, b"{}").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("a.json");
        assert!(matches!(
            write_atomic(&path, b"{}"),
            Err(FetchError::Write { .. })
        ));
    }
}
