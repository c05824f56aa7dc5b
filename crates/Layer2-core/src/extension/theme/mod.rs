//! Theme Manager - CSS 전용 확장
//!
//! 애드온과 같은 발견/감시/로드/언로드 흐름을 따르지만 코드를 실행하지 않는다.
//! 로드는 선언된 CSS 파일과 설정 변수를 하나의 스타일 블록으로 붙이는 것이고,
//! 언로드는 그 블록을 떼는 것이다.

mod settings;
mod style;

pub use settings::{SettingType, SettingValue, ThemeSetting, ThemeSettings};
pub use style::{StyleBlock, StyleHost, StyleSheet, StyleTree, THEME_BLOCK_PREFIX, VARIABLES_PREFIX};

use super::descriptor::{DescriptorLoader, ExtensionDescriptor, ExtensionKind, SETTINGS_FILE};
use super::events::{EventBus, EventKind, ExtensionEvent};
use super::lifecycle::{scan_root, LoadOutcome};
use super::registry::ExtensionRegistry;
use super::sync::{Generations, KeyedLocks};
use super::watch::{ExtensionWatcher, WatchSignal, WatchTarget};
use async_trait::async_trait;
use parking_lot::RwLock;
use regild_foundation::{Error, JsonStore, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 테마 매니저
pub struct ThemeManager {
    root: PathBuf,
    registry: Arc<ExtensionRegistry>,
    events: Arc<EventBus>,
    styles: Arc<dyn StyleHost>,

    /// 마지막으로 읽은(또는 쓴) 설정
    settings: RwLock<HashMap<String, ThemeSettings>>,

    /// 스타일 블록이 붙어 있는 id
    active: RwLock<HashSet<String>>,

    id_locks: KeyedLocks,
    dir_locks: KeyedLocks,
    generations: Generations,
}

impl ThemeManager {
    pub fn new(
        root: impl Into<PathBuf>,
        styles: Arc<dyn StyleHost>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            root: root.into(),
            registry: Arc::new(ExtensionRegistry::new()),
            events,
            styles,
            settings: RwLock::new(HashMap::new()),
            active: RwLock::new(HashSet::new()),
            id_locks: KeyedLocks::new(),
            dir_locks: KeyedLocks::new(),
            generations: Generations::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    // ========================================================================
    // Host API
    // ========================================================================

    pub async fn initialize<I, S>(&self, enabled: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        info!("Initializing theme manager at {}", self.root.display());
        self.registry.replace_enabled(enabled);

        for signal in scan_root(&self.root).await? {
            self.handle_signal(signal).await;
        }

        info!(
            "Theme manager ready: {} discovered, {} attached",
            self.registry.len(),
            self.active.read().len()
        );
        Ok(())
    }

    pub async fn load(&self, id: &str) -> Result<LoadOutcome> {
        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("theme '{}'", id)))?;
        Ok(self.load_descriptor(&descriptor).await)
    }

    pub async fn unload(&self, id: &str) -> Result<bool> {
        let _guard = self.id_locks.lock(id).await;
        Ok(self.unload_locked(id))
    }

    pub async fn enable(&self, id: &str) -> Result<LoadOutcome> {
        self.registry.set_enabled(id, true);
        self.load(id).await
    }

    pub async fn disable(&self, id: &str) -> Result<bool> {
        self.registry.set_enabled(id, false);
        self.unload(id).await
    }

    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.active.read().iter().cloned().collect();
        for id in ids {
            let _ = self.unload(&id).await;
        }
        info!("Theme manager shut down");
    }

    /// 설정 값 변경
    ///
    /// `settings.json`에 쓰고, 테마가 붙어 있으면 바로 다시 렌더링한다.
    /// 이 파일은 감시에서 제외되므로 재로드가 일어나지 않는다.
    pub async fn assign_properties(&self, id: &str, values: &Map<String, Value>) -> Result<()> {
        let _guard = self.id_locks.lock(id).await;
        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("theme '{}'", id)))?;

        let current = self.settings.read().get(id).cloned();
        let mut settings = match current {
            Some(settings) => settings,
            None => read_settings(&descriptor).await?.ok_or_else(|| {
                Error::InvalidInput(format!("theme '{}' declares no settings", id))
            })?,
        };

        let unknown = settings.assign(values);
        if !unknown.is_empty() {
            warn!(extension = id, "Ignoring unknown settings properties: {}", unknown.join(", "));
        }

        JsonStore::new(&descriptor.directory).save(SETTINGS_FILE, &settings.to_json())?;
        self.settings.write().insert(id.to_string(), settings);
        debug!(extension = id, "Theme settings written");

        if self.is_loaded(id) {
            match self.build_block(&descriptor).await {
                Ok(block) => self.styles.attach(block),
                Err(e) => error!(extension = id, "Failed to re-render theme: {}", e),
            }
        }

        self.events.publish(ExtensionEvent::new(
            EventKind::SettingsChanged,
            id,
            Value::Object(values.clone()),
        ));
        Ok(())
    }

    pub fn get_all(&self) -> Vec<Arc<ExtensionDescriptor>> {
        self.registry.all()
    }

    pub fn get(&self, id: &str) -> Option<Arc<ExtensionDescriptor>> {
        self.registry.get(id)
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.registry.is_enabled(id)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.active.read().contains(id)
    }

    pub fn loaded(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.active.read().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// 마지막으로 적용된 설정
    pub fn settings(&self, id: &str) -> Option<ThemeSettings> {
        self.settings.read().get(id).cloned()
    }

    pub fn spawn_watcher(self: &Arc<Self>, window: Duration) -> Result<ExtensionWatcher> {
        ExtensionWatcher::start(&self.root, window, Arc::clone(self) as Arc<dyn WatchTarget>)
    }

    // ========================================================================
    // 신호 처리
    // ========================================================================

    pub async fn handle_signal(&self, signal: WatchSignal) {
        let generation = self.generations.bump(signal.dir_name());
        self.process_signal(signal, generation).await;
    }

    async fn process_signal(&self, signal: WatchSignal, generation: u64) {
        let key = signal.dir_name().to_string();
        let _guard = self.dir_locks.lock(&key).await;
        if !self.generations.is_current(&key, generation) {
            debug!(dir = %key, "Signal superseded by a newer one");
            return;
        }

        let previous = self.registry.find_by_dir_name(&key);
        if let Some(previous) = &previous {
            self.retire(&previous.id).await;
        }

        if signal.is_removed() {
            if let Some(previous) = previous {
                info!(extension = %previous.id, "Theme removed");
                self.events.emit(EventKind::Removed, &previous.id);
            }
            return;
        }

        let descriptor = match DescriptorLoader::load(signal.directory(), ExtensionKind::Theme) {
            Ok(descriptor) => Arc::new(descriptor),
            Err(e) if e.is_absence() => {
                debug!(dir = %key, "Not a theme directory");
                return;
            }
            Err(e) => {
                error!(dir = %key, "Failed to read theme metadata: {}", e);
                self.events.publish(ExtensionEvent::new(
                    EventKind::LoadFailed,
                    key,
                    serde_json::json!({ "error": e.to_string() }),
                ));
                return;
            }
        };

        if let Some(other) = self.registry.get(&descriptor.id) {
            warn!(
                extension = %descriptor.id,
                "Theme id also declared in {}; replacing it",
                other.directory.display()
            );
            self.retire(&other.id).await;
        }

        self.registry.insert(Arc::clone(&descriptor));
        debug!(extension = %descriptor.id, "Discovered theme '{}'", descriptor.name);
        self.events.emit(EventKind::Discovered, &descriptor.id);

        if self.registry.is_enabled(&descriptor.id) {
            self.load_descriptor(&descriptor).await;
        }
    }

    // ========================================================================
    // load / unload
    // ========================================================================

    async fn load_descriptor(&self, descriptor: &Arc<ExtensionDescriptor>) -> LoadOutcome {
        let id = descriptor.id.as_str();
        let _guard = self.id_locks.lock(id).await;

        match self.registry.get(id) {
            Some(current) if Arc::ptr_eq(&current, descriptor) => {}
            _ => return LoadOutcome::Failed,
        }
        if self.is_loaded(id) {
            return LoadOutcome::AlreadyLoaded;
        }

        match self.build_block(descriptor).await {
            Ok(block) => {
                self.styles.attach(block);
                self.active.write().insert(id.to_string());
                info!(extension = id, "Loaded theme '{}'", descriptor.name);
                self.events.emit(EventKind::ThemeAttached, id);
                self.events.emit(EventKind::Loaded, id);
                LoadOutcome::Loaded
            }
            Err(e) => {
                error!(extension = id, "Failed to load theme: {}", e);
                self.events.publish(ExtensionEvent::new(
                    EventKind::LoadFailed,
                    id,
                    serde_json::json!({ "error": e.to_string() }),
                ));
                LoadOutcome::Failed
            }
        }
    }

    /// CSS 파일들 + 설정 변수로 블록 생성
    ///
    /// CSS 파일 읽기 실패는 에러, 설정 문제는 경고 후 설정 없이 진행.
    async fn build_block(&self, descriptor: &ExtensionDescriptor) -> Result<StyleBlock> {
        let id = descriptor.id.as_str();
        let mut block = StyleBlock::new(id);

        for path in &descriptor.entry_files {
            let css = tokio::fs::read_to_string(path)
                .await
                .map_err(|_| Error::MissingEntryFile {
                    id: id.to_string(),
                    path: path.clone(),
                })?;
            block.sheets.push(StyleSheet {
                path: path.clone(),
                css,
            });
        }

        let cached = self.settings.read().get(id).cloned();
        let settings = match cached {
            Some(settings) => Some(settings),
            None => match read_settings(descriptor).await {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(extension = id, "{}; loading without settings", e);
                    None
                }
            },
        };

        if let Some(settings) = settings {
            if !settings.is_empty() {
                block.variables = Some(settings.to_css());
            }
            self.settings.write().insert(id.to_string(), settings);
        }
        Ok(block)
    }

    fn unload_locked(&self, id: &str) -> bool {
        if !self.active.write().remove(id) {
            return false;
        }
        self.styles.detach(id);
        info!(extension = id, "Unloaded theme");
        self.events.emit(EventKind::ThemeDetached, id);
        self.events.emit(EventKind::Unloaded, id);
        true
    }

    /// 언로드 후 설정 캐시와 레지스트리에서 제거
    async fn retire(&self, id: &str) {
        let _guard = self.id_locks.lock(id).await;
        self.unload_locked(id);
        self.settings.write().remove(id);
        self.registry.purge(id);
    }
}

#[async_trait]
impl WatchTarget for ThemeManager {
    fn stamp(&self, signal: &WatchSignal) -> u64 {
        self.generations.bump(signal.dir_name())
    }

    async fn on_signal(&self, signal: WatchSignal, generation: u64) {
        self.process_signal(signal, generation).await;
    }
}

/// `settings.json` 읽기 (없으면 None)
async fn read_settings(descriptor: &ExtensionDescriptor) -> Result<Option<ThemeSettings>> {
    let path = descriptor.settings_path();
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::malformed_settings(&descriptor.id, e.to_string())),
    };
    let json: Value = serde_json::from_str(&content)
        .map_err(|e| Error::malformed_settings(&descriptor.id, e.to_string()))?;
    ThemeSettings::parse(&descriptor.id, &json).map(Some)
}
