use crate::error::{AppError, AppResult, FileError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 读取并解析 JSON 文件
pub fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    if !path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    let content =
        fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    serde_json::from_str(&content).map_err(|e| {
        AppError::File(FileError::JsonParseFailed {
            path: path.display().to_string(),
            source: e,
        })
    })
}

/// 将值写入 JSON 文件（覆盖）
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    fs::write(path, content).map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
}

/// 读取文本文件
pub fn read_text(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
}

/// 列出文件夹中以 `suffix` 结尾的文件，按文件名排序
pub fn list_files_with_suffix(folder: &Path, suffix: &str) -> AppResult<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder.display().to_string(),
        }));
    }

    let entries =
        fs::read_dir(folder).map_err(|e| AppError::file_read_failed(folder.display().to_string(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// 文件名去掉扩展名
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 名称中第一个 `_` 之前的前缀
pub fn name_prefix(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "c.xml", "q_meta.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let json = list_files_with_suffix(dir.path(), ".json").unwrap();
        let names: Vec<String> = json.iter().map(|p| file_stem(p)).collect();
        assert_eq!(names, vec!["a", "b", "q_meta"]);

        let meta = list_files_with_suffix(dir.path(), "_meta.json").unwrap();
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn test_missing_folder_is_error() {
        let dir = TempDir::new().unwrap();
        let err = list_files_with_suffix(&dir.path().join("nope"), ".json").unwrap_err();
        assert!(matches!(err, AppError::File(FileError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_unserializable_value_is_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        let value = std::collections::BTreeMap::from([(vec![1u8], 1)]);

        let err = write_json(&path, &value).unwrap_err();
        assert!(matches!(err, AppError::File(FileError::WriteFailed { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_name_prefix() {
        assert_eq!(name_prefix("q1_variant_2"), "q1");
        assert_eq!(name_prefix("plain"), "plain");
    }
}
