//! JSON 파일 저장소
//!
//! 디렉토리 하나를 기준으로 `<base>/<filename>` JSON 파일을 읽고 쓴다.
//! 확장 디렉토리 안의 `settings.json` / `data.json`도 이 저장소로 다룬다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// 글로벌 설정 디렉토리 이름 (`<config_dir>/regild`)
const GLOBAL_DIR: &str = "regild";

/// 프로젝트 설정 디렉토리 이름 (`<root>/.regild`)
const PROJECT_DIR: &str = ".regild";

/// JSON 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 글로벌 저장소 (~/.config/regild/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?
            .join(GLOBAL_DIR);
        Ok(Self::new(dir))
    }

    /// 프로젝트 저장소 (.regild/)
    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into().join(PROJECT_DIR))
    }

    /// 현재 디렉토리 기준 프로젝트 저장소
    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Cannot get current directory: {}", e)))?;
        Ok(Self::project(cwd))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            std::fs::create_dir_all(&self.base_dir).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create {}: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// JSON 로드
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.file_path(filename);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// JSON 로드 (파일이 없거나 깨졌으면 기본값)
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, filename: &str) -> T {
        match self.load_optional(filename) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                T::default()
            }
        }
    }

    /// JSON 로드 (파일이 없으면 None, 파싱 실패는 에러)
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        if !self.exists(filename) {
            return Ok(None);
        }
        self.load(filename).map(Some)
    }

    /// JSON 저장
    ///
    /// 파일을 제자리에서 덮어쓴다. 임시 파일을 쓰지 않으므로
    /// 감시 중인 확장 디렉토리에 낯선 파일 이름이 나타나지 않는다.
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.file_path(filename);
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Storage(format!("Failed to serialize {}: {}", filename, e)))?;
        std::fs::write(&path, content)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// 읽기-수정-쓰기
    pub fn update<T, F>(&self, filename: &str, f: F) -> Result<T>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T),
    {
        let mut value: T = self.load_optional(filename)?.unwrap_or_default();
        f(&mut value);
        self.save(filename, &value)?;
        Ok(value)
    }

    /// 파일 존재 여부
    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_file()
    }

    /// 파일 삭제
    pub fn remove(&self, filename: &str) -> Result<()> {
        let path = self.file_path(filename);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                Error::Storage(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path());
        let loaded: Option<Counter> = store.load_optional("counter.json").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("deeper"));
        store.save("counter.json", &Counter { hits: 3 }).unwrap();

        let loaded: Counter = store.load("counter.json").unwrap();
        assert_eq!(loaded, Counter { hits: 3 });
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("counter.json"), "{ not json").unwrap();
        let store = JsonStore::new(dir.path());

        assert!(store.load_optional::<Counter>("counter.json").is_err());
        assert_eq!(store.load_or_default::<Counter>("counter.json"), Counter::default());
    }

    #[test]
    fn test_update_merges_into_existing() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path());

        store
            .update("data.json", |m: &mut BTreeMap<String, u32>| {
                m.insert("a".into(), 1);
            })
            .unwrap();
        let merged = store
            .update("data.json", |m: &mut BTreeMap<String, u32>| {
                m.insert("b".into(), 2);
            })
            .unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["a"], 1);
    }
}
