//! Extension Host - 호스트 앱이 사용하는 진입점
//!
//! 설정, 권한, 이벤트 버스, 스타일 트리, 두 매니저와 감시자를 소유한다.

use super::addon::AddonManager;
use super::events::EventBus;
use super::module::ModuleLoader;
use super::theme::{StyleHost, StyleTree, ThemeManager};
use super::watch::ExtensionWatcher;
use regild_foundation::{HostConfig, PermissionService, Result};
use std::sync::Arc;
use tracing::info;

pub struct ExtensionHost {
    config: HostConfig,
    permissions: Arc<PermissionService>,
    events: Arc<EventBus>,
    styles: Arc<StyleTree>,
    addons: Arc<AddonManager>,
    themes: Arc<ThemeManager>,
    watchers: Vec<ExtensionWatcher>,
}

impl ExtensionHost {
    /// 설정으로 호스트 구성 (권한은 데이터 디렉토리에서 로드)
    pub fn new(config: HostConfig, loader: Arc<dyn ModuleLoader>) -> Result<Self> {
        let permissions = Arc::new(PermissionService::load(config.data_dir()?)?);
        Self::with_permissions(config, loader, permissions)
    }

    pub fn with_permissions(
        config: HostConfig,
        loader: Arc<dyn ModuleLoader>,
        permissions: Arc<PermissionService>,
    ) -> Result<Self> {
        let events = Arc::new(EventBus::new());
        let styles = Arc::new(StyleTree::new());

        let addons = Arc::new(AddonManager::new(
            config.addons_dir()?,
            Arc::clone(&permissions),
            Arc::clone(&events),
            loader,
        ));
        let themes = Arc::new(ThemeManager::new(
            config.themes_dir()?,
            Arc::clone(&styles) as Arc<dyn StyleHost>,
            Arc::clone(&events),
        ));

        Ok(Self {
            config,
            permissions,
            events,
            styles,
            addons,
            themes,
            watchers: Vec::new(),
        })
    }

    /// 두 매니저 초기화 후 (설정에 따라) 감시 시작
    pub async fn start(&mut self) -> Result<()> {
        self.addons
            .initialize(self.config.enabled_addons.iter().cloned())
            .await?;
        self.themes
            .initialize(self.config.enabled_themes.iter().cloned())
            .await?;

        if self.config.watch_enabled() {
            let window = self.config.debounce();
            self.watchers.push(self.addons.spawn_watcher(window)?);
            self.watchers.push(self.themes.spawn_watcher(window)?);
        }

        info!(
            "Extension host started: {} addon(s), {} theme(s) loaded",
            self.addons.loaded().len(),
            self.themes.loaded().len()
        );
        Ok(())
    }

    /// 감시 중지 후 모든 확장 언로드
    pub async fn shutdown(&mut self) {
        self.watchers.clear();
        self.addons.shutdown().await;
        self.themes.shutdown().await;
        info!("Extension host stopped");
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn addons(&self) -> &Arc<AddonManager> {
        &self.addons
    }

    pub fn themes(&self) -> &Arc<ThemeManager> {
        &self.themes
    }

    pub fn permissions(&self) -> &Arc<PermissionService> {
        &self.permissions
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn styles(&self) -> &Arc<StyleTree> {
        &self.styles
    }

    pub fn is_watching(&self) -> bool {
        !self.watchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::module::StaticModuleLoader;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_start_without_watch() {
        let dir = TempDir::new().unwrap();
        let config = HostConfig {
            addons_dir: Some(dir.path().join("addons")),
            themes_dir: Some(dir.path().join("themes")),
            data_dir: Some(dir.path().join("data")),
            watch: Some(false),
            ..Default::default()
        };

        let mut host = ExtensionHost::new(config, Arc::new(StaticModuleLoader::new())).unwrap();
        host.start().await.unwrap();

        assert!(!host.is_watching());
        assert!(dir.path().join("addons").is_dir());
        assert!(dir.path().join("themes").is_dir());
        host.shutdown().await;
    }
}
