//! Addon Manager - 코드 확장의 수명주기 관리
//!
//! ## 상태
//!
//! ```text
//! unknown ──▶ discovered ──(enabled)──▶ loaded ⇄ unloaded
//!                              │
//!                  initialized (직교 플래그, 아티팩트당 한 번)
//! ```
//!
//! - `init`은 코드 아티팩트 수명 동안 한 번만 실행된다
//! - 비활성화는 `unload`만 호출하고 인스턴스와 초기화 기록을 유지한다
//! - 핫 리로드와 제거는 `uninit`까지 호출하고 초기화 기록을 지운다
//! - 확장 코드의 에러와 패닉은 여기서 가둬지고 호스트로 전파되지 않는다

use super::api::ExtensionApi;
use super::artifact::{Artifact, ArtifactCache};
use super::descriptor::{DescriptorLoader, ExtensionDescriptor, ExtensionKind};
use super::events::{EventBus, EventKind, ExtensionEvent};
use super::lifecycle::{isolate, scan_root, LoadOutcome};
use super::module::{ExtensionModule, LifecycleHook, ModuleLoader, ModuleSource};
use super::registry::ExtensionRegistry;
use super::sync::{Generations, KeyedLocks};
use super::watch::{ExtensionWatcher, WatchSignal, WatchTarget};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use regild_foundation::{AddonPermission, Error, PermissionService, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 로드된 애드온의 live 인스턴스 (exports)
#[derive(Clone)]
struct LoadedAddon {
    module: Arc<dyn ExtensionModule>,
    api: ExtensionApi,
}

/// 애드온 매니저
pub struct AddonManager {
    root: PathBuf,
    registry: Arc<ExtensionRegistry>,
    permissions: Arc<PermissionService>,
    events: Arc<EventBus>,
    loader: Arc<dyn ModuleLoader>,
    artifacts: ArtifactCache,

    /// id → 인스턴스 (비활성화 후에도 유지)
    instances: Mutex<HashMap<String, LoadedAddon>>,

    /// 현재 활성 상태인 id
    active: RwLock<HashSet<String>>,

    /// 같은 id의 load/unload 직렬화
    id_locks: KeyedLocks,

    /// 같은 디렉토리의 신호 직렬화
    dir_locks: KeyedLocks,
    generations: Generations,
}

impl AddonManager {
    pub fn new(
        root: impl Into<PathBuf>,
        permissions: Arc<PermissionService>,
        events: Arc<EventBus>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            root: root.into(),
            registry: Arc::new(ExtensionRegistry::new()),
            permissions,
            events,
            loader,
            artifacts: ArtifactCache::new(),
            instances: Mutex::new(HashMap::new()),
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

    pub fn artifacts(&self) -> &ArtifactCache {
        &self.artifacts
    }

    // ========================================================================
    // Host API
    // ========================================================================

    /// 활성화 목록을 설정하고 루트를 스캔해 모든 애드온을 발견/로드
    ///
    /// 한 애드온의 실패는 같은 배치의 다른 애드온에 영향을 주지 않는다.
    pub async fn initialize<I, S>(&self, enabled: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        info!("Initializing addon manager at {}", self.root.display());
        self.registry.replace_enabled(enabled);

        for signal in scan_root(&self.root).await? {
            self.handle_signal(signal).await;
        }

        info!(
            "Addon manager ready: {} discovered, {} loaded",
            self.registry.len(),
            self.active.read().len()
        );
        Ok(())
    }

    /// id로 로드
    pub async fn load(&self, id: &str) -> Result<LoadOutcome> {
        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("addon '{}'", id)))?;
        Ok(self.load_descriptor(&descriptor).await)
    }

    /// id로 언로드 (로드되지 않았으면 no-op, `Ok(false)`)
    pub async fn unload(&self, id: &str) -> Result<bool> {
        let _guard = self.id_locks.lock(id).await;
        Ok(self.unload_locked(id).await)
    }

    /// 활성화 목록에 추가하고, 발견된 애드온이면 로드
    pub async fn enable(&self, id: &str) -> Result<LoadOutcome> {
        self.registry.set_enabled(id, true);
        match self.registry.get(id) {
            Some(descriptor) => Ok(self.load_descriptor(&descriptor).await),
            None => Err(Error::NotFound(format!("addon '{}'", id))),
        }
    }

    /// 활성화 목록에서 제거하고 언로드 (초기화 기록은 유지)
    pub async fn disable(&self, id: &str) -> Result<bool> {
        self.registry.set_enabled(id, false);
        self.unload(id).await
    }

    /// 모든 활성 애드온 언로드
    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.active.read().iter().cloned().collect();
        for id in ids {
            if let Err(e) = self.unload(&id).await {
                warn!(extension = %id, "Failed to unload during shutdown: {}", e);
            }
        }
        info!("Addon manager shut down");
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

    pub fn is_initialized(&self, id: &str) -> bool {
        self.registry.is_initialized(id)
    }

    /// 현재 활성 id (정렬)
    pub fn loaded(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.active.read().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get_permissions(&self, id: &str) -> AddonPermission {
        self.permissions.get_permissions(id)
    }

    pub fn set_permissions(&self, id: &str, mask: AddonPermission) -> Result<()> {
        self.permissions.set_permissions(id, mask)
    }

    pub fn has_permission(&self, id: &str, flag: AddonPermission) -> bool {
        self.permissions.has_permission(id, flag)
    }

    /// 루트 감시 시작
    pub fn spawn_watcher(self: &Arc<Self>, window: Duration) -> Result<ExtensionWatcher> {
        ExtensionWatcher::start(&self.root, window, Arc::clone(self) as Arc<dyn WatchTarget>)
    }

    // ========================================================================
    // 신호 처리
    // ========================================================================

    /// 디렉토리 신호 처리 (도착 즉시 세대를 발급)
    pub async fn handle_signal(&self, signal: WatchSignal) {
        let generation = self.generations.bump(signal.dir_name());
        self.process_signal(signal, generation).await;
    }

    /// 세대가 발급된 신호 처리
    ///
    /// 같은 디렉토리의 신호는 직렬화되며, 대기 중에 더 새로운 신호가
    /// 도착했다면 이 신호는 버려진다.
    async fn process_signal(&self, signal: WatchSignal, generation: u64) {
        let key = signal.dir_name().to_string();
        let _guard = self.dir_locks.lock(&key).await;
        if !self.generations.is_current(&key, generation) {
            debug!(dir = %key, "Signal superseded by a newer one");
            return;
        }

        // 1~2. 기존 디스크립터가 있으면 언로드 후 제거
        let previous = self.registry.find_by_dir_name(&key);
        if let Some(previous) = &previous {
            self.retire(previous).await;
        }

        // 3. 제거 신호면 종료
        if signal.is_removed() {
            if let Some(previous) = previous {
                info!(extension = %previous.id, "Addon removed");
                self.events.emit(EventKind::Removed, &previous.id);
            }
            return;
        }

        // 4. 디스크립터 재해석
        let descriptor = match DescriptorLoader::load(signal.directory(), ExtensionKind::Addon) {
            Ok(descriptor) => Arc::new(descriptor),
            Err(e) if e.is_absence() => {
                debug!(dir = %key, "Not an addon directory");
                return;
            }
            Err(e) => {
                error!(dir = %key, "Failed to read addon metadata: {}", e);
                self.events.publish(ExtensionEvent::new(
                    EventKind::LoadFailed,
                    key,
                    serde_json::json!({ "error": e.to_string() }),
                ));
                return;
            }
        };

        // 다른 디렉토리에 같은 id가 있으면 교체
        if let Some(other) = self.registry.get(&descriptor.id) {
            warn!(
                extension = %descriptor.id,
                "Addon id also declared in {}; replacing it",
                other.directory.display()
            );
            self.retire(&other).await;
        }

        // 5. 추가
        self.registry.insert(Arc::clone(&descriptor));
        debug!(extension = %descriptor.id, "Discovered addon '{}'", descriptor.name);
        self.events.emit(EventKind::Discovered, &descriptor.id);

        // 6. 활성화 대상이면 로드
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

        // 락을 기다리는 동안 교체되었으면 버린다
        match self.registry.get(id) {
            Some(current) if Arc::ptr_eq(&current, descriptor) => {}
            _ => {
                debug!(extension = id, "Descriptor replaced before load; skipping");
                return LoadOutcome::Failed;
            }
        }

        if self.is_loaded(id) {
            return LoadOutcome::AlreadyLoaded;
        }

        let existing = self.instances.lock().get(id).cloned();
        let addon = match existing {
            // 재활성화: init 생략
            Some(addon) if self.registry.is_initialized(id) => addon,
            _ => match self.initialize_fresh(descriptor).await {
                Ok(addon) => addon,
                Err(e) => {
                    self.report_failure(id, &e);
                    return LoadOutcome::Failed;
                }
            },
        };

        if addon.module.hooks().contains(LifecycleHook::Load) {
            let hook = LifecycleHook::Load;
            if let Err(e) = isolate(id, hook.as_str(), addon.module.load(&addon.api)).await {
                self.report_failure(id, &e);
                return LoadOutcome::Failed;
            }
        }

        if let Some(path) = descriptor.entry_file() {
            self.artifacts.insert(Artifact::new(path, Arc::clone(&addon.module)));
        }
        self.active.write().insert(id.to_string());
        info!(extension = id, "Loaded addon '{}'", descriptor.name);
        self.events.emit(EventKind::Loaded, id);
        LoadOutcome::Loaded
    }

    /// 새 아티팩트 실행 + init
    async fn initialize_fresh(&self, descriptor: &ExtensionDescriptor) -> Result<LoadedAddon> {
        let id = descriptor.id.as_str();
        let api = ExtensionApi::new(
            descriptor,
            Arc::clone(&self.permissions),
            Arc::clone(&self.registry),
            Arc::clone(&self.events),
        );
        let module = self.instantiate(descriptor, &api).await?;
        let addon = LoadedAddon { module, api };

        if addon.module.hooks().contains(LifecycleHook::Init) {
            let hook = LifecycleHook::Init;
            isolate(id, hook.as_str(), addon.module.init(&addon.api)).await?;
        }

        self.instances.lock().insert(id.to_string(), addon.clone());
        self.registry.mark_initialized(id);
        debug!(extension = id, "Initialized addon");
        self.events.emit(EventKind::Initialized, id);
        Ok(addon)
    }

    /// 디스크에서 새로 읽은 엔트리 모듈 실행
    async fn instantiate(
        &self,
        descriptor: &ExtensionDescriptor,
        api: &ExtensionApi,
    ) -> Result<Arc<dyn ExtensionModule>> {
        let id = descriptor.id.as_str();
        let path = descriptor.entry_file().ok_or_else(|| Error::MissingEntryFile {
            id: id.to_string(),
            path: descriptor.directory.clone(),
        })?;

        let code = tokio::fs::read(path).await.map_err(|_| Error::MissingEntryFile {
            id: id.to_string(),
            path: path.to_path_buf(),
        })?;
        let source = ModuleSource {
            id: id.to_string(),
            path: path.to_path_buf(),
            code,
        };

        isolate(id, "execute", self.loader.execute(&source, api)).await
    }

    /// id 락을 잡은 상태에서 언로드
    async fn unload_locked(&self, id: &str) -> bool {
        if !self.active.write().remove(id) {
            return false;
        }

        let addon = self.instances.lock().get(id).cloned();
        if let Some(addon) = addon {
            if addon.module.hooks().contains(LifecycleHook::Unload) {
                let hook = LifecycleHook::Unload;
                // 실패해도 언로드는 진행
                let _ = isolate(id, hook.as_str(), addon.module.unload(&addon.api)).await;
            }
        }

        if let Some(descriptor) = self.registry.get(id) {
            self.invalidate_artifacts(&descriptor);
        }
        info!(extension = id, "Unloaded addon");
        self.events.emit(EventKind::Unloaded, id);
        true
    }

    /// 아티팩트 무효화: 언로드, uninit, 인스턴스 폐기, 레지스트리에서 제거
    async fn retire(&self, descriptor: &ExtensionDescriptor) {
        let id = descriptor.id.as_str();
        let _guard = self.id_locks.lock(id).await;

        self.unload_locked(id).await;

        let addon = self.instances.lock().remove(id);
        if let Some(addon) = addon.filter(|_| self.registry.is_initialized(id)) {
            if addon.module.hooks().contains(LifecycleHook::Uninit) {
                let hook = LifecycleHook::Uninit;
                let _ = isolate(id, hook.as_str(), addon.module.uninit(&addon.api)).await;
            }
            debug!(extension = id, "Uninitialized addon");
            self.events.emit(EventKind::Uninitialized, id);
        }

        self.invalidate_artifacts(descriptor);
        self.registry.purge(id);
    }

    fn invalidate_artifacts(&self, descriptor: &ExtensionDescriptor) {
        for path in &descriptor.entry_files {
            self.artifacts.invalidate(path);
        }
    }

    fn report_failure(&self, id: &str, err: &Error) {
        // 확장 코드 에러는 isolate에서 이미 로그됨
        if !err.is_extension_fault() {
            error!(extension = id, "Failed to load addon: {}", err);
        }
        self.events.publish(ExtensionEvent::new(
            EventKind::LoadFailed,
            id,
            serde_json::json!({ "error": err.to_string() }),
        ));
    }
}

#[async_trait]
impl WatchTarget for AddonManager {
    fn stamp(&self, signal: &WatchSignal) -> u64 {
        self.generations.bump(signal.dir_name())
    }

    async fn on_signal(&self, signal: WatchSignal, generation: u64) {
        self.process_signal(signal, generation).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::descriptor::DESCRIPTOR_FILE;
    use crate::extension::module::{HookSet, StaticModuleLoader};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Counters {
        init: AtomicUsize,
        load: AtomicUsize,
        unload: AtomicUsize,
        uninit: AtomicUsize,
        executed: AtomicUsize,
    }

    struct Counting(Arc<Counters>);

    #[async_trait]
    impl ExtensionModule for Counting {
        async fn init(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
            self.0.init.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn load(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
            self.0.load.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn unload(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
            self.0.unload.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn uninit(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
            self.0.uninit.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingInit;

    #[async_trait]
    impl ExtensionModule for FailingInit {
        fn hooks(&self) -> HookSet {
            HookSet::of(&[LifecycleHook::Init])
        }

        async fn init(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
            anyhow::bail!("init exploded")
        }
    }

    fn write_addon(root: &Path, dir: &str, id: &str) -> PathBuf {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("main.js"), format!("// {}", id)).unwrap();
        std::fs::write(
            path.join(DESCRIPTOR_FILE),
            format!(r#"{{ "id": "{}", "name": "{}", "files": "main.js" }}"#, id, id),
        )
        .unwrap();
        path
    }

    fn manager(root: &Path, counters: &Arc<Counters>) -> AddonManager {
        let loader = StaticModuleLoader::new();
        let c = Arc::clone(counters);
        loader.register("sample", move |_, _| {
            c.executed.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Counting(Arc::clone(&c))) as Arc<dyn ExtensionModule>)
        });
        loader.register("broken", |_, _| {
            Ok(Arc::new(FailingInit) as Arc<dyn ExtensionModule>)
        });
        AddonManager::new(
            root,
            Arc::new(PermissionService::new()),
            Arc::new(EventBus::new()),
            Arc::new(loader),
        )
    }

    #[tokio::test]
    async fn test_initialize_runs_init_then_load() {
        let root = TempDir::new().unwrap();
        write_addon(root.path(), "sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);

        manager.initialize(["sample"]).await.unwrap();

        assert_eq!(counters.init.load(Ordering::SeqCst), 1);
        assert_eq!(counters.load.load(Ordering::SeqCst), 1);
        assert!(manager.is_initialized("sample"));
        assert!(manager.is_loaded("sample"));
    }

    #[tokio::test]
    async fn test_reenable_skips_init() {
        let root = TempDir::new().unwrap();
        write_addon(root.path(), "sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);
        manager.initialize(["sample"]).await.unwrap();

        assert!(manager.unload("sample").await.unwrap());
        assert!(!manager.unload("sample").await.unwrap());
        assert_eq!(manager.load("sample").await.unwrap(), LoadOutcome::Loaded);
        assert_eq!(manager.load("sample").await.unwrap(), LoadOutcome::AlreadyLoaded);

        assert_eq!(counters.init.load(Ordering::SeqCst), 1);
        assert_eq!(counters.load.load(Ordering::SeqCst), 2);
        assert_eq!(counters.unload.load(Ordering::SeqCst), 1);
        assert_eq!(counters.uninit.load(Ordering::SeqCst), 0);
        assert_eq!(counters.executed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unload_invalidates_artifact() {
        let root = TempDir::new().unwrap();
        let dir = write_addon(root.path(), "sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);
        manager.initialize(["sample"]).await.unwrap();

        let entry = dir.canonicalize().unwrap().join("main.js");
        let first = manager.artifacts().get(&entry).unwrap();
        manager.disable("sample").await.unwrap();
        assert!(!manager.artifacts().contains(&entry));
        assert!(manager.is_initialized("sample"));
        assert!(!manager.is_enabled("sample"));

        // 재활성화는 유지된 인스턴스를 다시 기록하고 코드를 다시 실행하지 않는다
        manager.enable("sample").await.unwrap();
        let second = manager.artifacts().get(&entry).unwrap();
        assert!(Arc::ptr_eq(&first.module, &second.module));
        assert_eq!(counters.executed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_removal_clears_initialized() {
        let root = TempDir::new().unwrap();
        let dir = write_addon(root.path(), "sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);
        manager.initialize(["sample"]).await.unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
        manager.handle_signal(WatchSignal::inspect("sample", &dir)).await;

        assert!(manager.get_all().is_empty());
        assert!(!manager.is_initialized("sample"));
        assert!(!manager.is_loaded("sample"));
        assert_eq!(counters.uninit.load(Ordering::SeqCst), 1);

        write_addon(root.path(), "sample", "sample");
        manager.handle_signal(WatchSignal::inspect("sample", &dir)).await;
        assert_eq!(counters.init.load(Ordering::SeqCst), 2);
        assert_eq!(counters.executed.load(Ordering::SeqCst), 2);
        assert!(manager.is_loaded("sample"));
    }

    #[tokio::test]
    async fn test_failing_init_is_contained() {
        let root = TempDir::new().unwrap();
        write_addon(root.path(), "a-broken", "broken");
        write_addon(root.path(), "b-sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);

        manager.initialize(["broken", "sample"]).await.unwrap();

        assert_eq!(manager.get_all().len(), 2);
        assert!(!manager.is_loaded("broken"));
        assert!(!manager.is_initialized("broken"));
        assert!(manager.is_enabled("broken"));
        assert!(manager.is_loaded("sample"));
        assert_eq!(manager.artifacts().len(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_module_fails_without_panicking() {
        let root = TempDir::new().unwrap();
        write_addon(root.path(), "ghost", "ghost");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);

        manager.initialize(["ghost"]).await.unwrap();
        assert_eq!(manager.load("ghost").await.unwrap(), LoadOutcome::Failed);
        assert!(manager.load("nobody").await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_addon_is_only_discovered() {
        let root = TempDir::new().unwrap();
        write_addon(root.path(), "sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);

        manager.initialize(Vec::<String>::new()).await.unwrap();
        assert_eq!(manager.get_all().len(), 1);
        assert_eq!(counters.executed.load(Ordering::SeqCst), 0);

        assert_eq!(manager.enable("sample").await.unwrap(), LoadOutcome::Loaded);
        assert_eq!(counters.init.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_addon_found_and_removed() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let real = write_addon(elsewhere.path(), "real-sample", "sample");
        let link = root.path().join("sample");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);

        manager.initialize(["sample"]).await.unwrap();
        assert_eq!(manager.get_all().len(), 1);
        assert_eq!(manager.get("sample").unwrap().dir_name, "sample");
        assert!(manager.is_loaded("sample"));

        std::fs::remove_file(&link).unwrap();
        let signal = WatchSignal::inspect("sample", &link);
        assert!(signal.is_removed());
        manager.handle_signal(signal).await;

        assert!(manager.get_all().is_empty());
        assert!(!manager.is_loaded("sample"));
        assert!(!manager.is_initialized("sample"));
        assert_eq!(counters.uninit.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_older_signal_superseded_by_arrival_order() {
        let root = TempDir::new().unwrap();
        let dir = write_addon(root.path(), "sample", "sample");
        let counters = Arc::new(Counters::default());
        let manager = manager(root.path(), &counters);
        manager.initialize(["sample"]).await.unwrap();

        let target: &dyn WatchTarget = &manager;
        let first = target.stamp(&WatchSignal::inspect("sample", &dir));
        let second = target.stamp(&WatchSignal::inspect("sample", &dir));

        // 나중에 도착한 신호가 먼저 실행되어도 이전 신호는 버려진다
        target.on_signal(WatchSignal::inspect("sample", &dir), second).await;
        target.on_signal(WatchSignal::inspect("sample", &dir), first).await;

        assert_eq!(counters.init.load(Ordering::SeqCst), 2);
        assert_eq!(counters.uninit.load(Ordering::SeqCst), 1);
        assert!(manager.is_loaded("sample"));
    }
}
