//! Host Config - 호스트 설정
//!
//! 글로벌(`~/.config/regild/config.json`) 설정을 먼저 읽고
//! 프로젝트(`.regild/config.json`) 설정으로 덮어쓴다.

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 설정 파일명
pub const HOST_CONFIG_FILE: &str = "config.json";

/// 기본 디바운스 윈도우 (ms)
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

// ============================================================================
// Host Config
// ============================================================================

/// regild 호스트 설정
///
/// 모든 필드는 선택이다. 비어 있는 값은 병합 시 덮어쓰지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// 애드온 루트 디렉토리 (기본: `<global>/addons`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addons_dir: Option<PathBuf>,

    /// 테마 루트 디렉토리 (기본: `<global>/themes`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes_dir: Option<PathBuf>,

    /// 권한 등 호스트 데이터 디렉토리 (기본: `<global>`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// 디바운스 윈도우 (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    /// 시작 시 활성화할 애드온 id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_addons: Vec<String>,

    /// 시작 시 활성화할 테마 id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_themes: Vec<String>,

    /// 파일 감시 여부 (기본: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,

    /// 디버그 로그
    #[serde(default)]
    pub debug_mode: bool,
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut stores = Vec::with_capacity(2);
        if let Ok(global) = JsonStore::global() {
            stores.push(global);
        }
        if let Ok(project) = JsonStore::current_project() {
            stores.push(project);
        }
        Self::load_from(&stores)
    }

    /// 주어진 저장소들을 순서대로 병합 (뒤쪽이 우선)
    pub fn load_from(stores: &[JsonStore]) -> Result<Self> {
        let mut config = Self::new();
        for store in stores {
            if let Some(layer) = store.load_optional::<HostConfig>(HOST_CONFIG_FILE)? {
                config.merge(layer);
            }
        }
        Ok(config)
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<()> {
        let store = JsonStore::global()?;
        store.save(HOST_CONFIG_FILE, self)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self) -> Result<()> {
        let store = JsonStore::current_project()?;
        store.save(HOST_CONFIG_FILE, self)
    }

    /// 병합 (other 우선)
    pub fn merge(&mut self, other: HostConfig) {
        if other.addons_dir.is_some() {
            self.addons_dir = other.addons_dir;
        }
        if other.themes_dir.is_some() {
            self.themes_dir = other.themes_dir;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.debounce_ms.is_some() {
            self.debounce_ms = other.debounce_ms;
        }
        if !other.enabled_addons.is_empty() {
            self.enabled_addons = other.enabled_addons;
        }
        if !other.enabled_themes.is_empty() {
            self.enabled_themes = other.enabled_themes;
        }
        if other.watch.is_some() {
            self.watch = other.watch;
        }
        self.debug_mode = self.debug_mode || other.debug_mode;
    }

    // ========================================================================
    // Resolved values
    // ========================================================================

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    pub fn watch_enabled(&self) -> bool {
        self.watch.unwrap_or(true)
    }

    pub fn addons_dir(&self) -> Result<PathBuf> {
        self.resolve(&self.addons_dir, "addons")
    }

    pub fn themes_dir(&self) -> Result<PathBuf> {
        self.resolve(&self.themes_dir, "themes")
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::global_dir()?),
        }
    }

    fn resolve(&self, value: &Option<PathBuf>, default_name: &str) -> Result<PathBuf> {
        match value {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::global_dir()?.join(default_name)),
        }
    }

    fn global_dir() -> Result<PathBuf> {
        JsonStore::global()
            .map(|store| store.base_dir().to_path_buf())
            .map_err(|_| Error::Config("Cannot resolve default regild directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert!(config.watch_enabled());
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_camel_case_fields() {
        let config: HostConfig = serde_json::from_str(
            r#"{ "addonsDir": "/opt/addons", "debounceMs": 100, "enabledAddons": ["sample"], "watch": false }"#,
        )
        .unwrap();

        assert_eq!(config.addons_dir().unwrap(), PathBuf::from("/opt/addons"));
        assert_eq!(config.debounce(), Duration::from_millis(100));
        assert_eq!(config.enabled_addons, vec!["sample".to_string()]);
        assert!(!config.watch_enabled());
    }

    #[test]
    fn test_project_overrides_global() {
        let global = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let global_store = JsonStore::new(global.path());
        let project_store = JsonStore::new(project.path());

        global_store
            .save(
                HOST_CONFIG_FILE,
                &HostConfig {
                    themes_dir: Some(PathBuf::from("/global/themes")),
                    enabled_themes: vec!["dark".into()],
                    debounce_ms: Some(500),
                    ..Default::default()
                },
            )
            .unwrap();
        project_store
            .save(
                HOST_CONFIG_FILE,
                &HostConfig {
                    debounce_ms: Some(50),
                    ..Default::default()
                },
            )
            .unwrap();

        let merged = HostConfig::load_from(&[global_store, project_store]).unwrap();
        assert_eq!(merged.debounce_ms, Some(50));
        assert_eq!(merged.enabled_themes, vec!["dark".to_string()]);
        assert_eq!(merged.themes_dir, Some(PathBuf::from("/global/themes")));
    }
}
