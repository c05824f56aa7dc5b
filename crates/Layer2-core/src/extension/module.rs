//! Extension Module - 실행된 확장 코드의 인터페이스
//!
//! 로드된 모듈은 선택적 훅 집합 {init, load, unload, uninit} 위에서 다형적이다.
//! 훅이 없는 것도 유효한 변형이며 에러가 아니다.

use super::api::ExtensionApi;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// LifecycleHook / HookSet
// ============================================================================

/// 수명주기 훅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    /// 코드 아티팩트당 한 번
    Init,
    /// 활성화마다
    Load,
    /// 비활성화마다
    Unload,
    /// 아티팩트가 무효화될 때 한 번 (init과 짝)
    Uninit,
}

impl LifecycleHook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Load => "load",
            Self::Unload => "unload",
            Self::Uninit => "uninit",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Init => 1,
            Self::Load => 1 << 1,
            Self::Unload => 1 << 2,
            Self::Uninit => 1 << 3,
        }
    }
}

impl std::fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 모듈이 구현한 훅 집합
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookSet(u8);

impl HookSet {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    pub fn of(hooks: &[LifecycleHook]) -> Self {
        Self(hooks.iter().fold(0, |acc, h| acc | h.bit()))
    }

    pub fn with(self, hook: LifecycleHook) -> Self {
        Self(self.0 | hook.bit())
    }

    pub fn contains(self, hook: LifecycleHook) -> bool {
        self.0 & hook.bit() != 0
    }
}

// ============================================================================
// ExtensionModule
// ============================================================================

/// 엔트리 모듈 실행 결과 (exports)
///
/// 모든 훅은 기본 구현이 있으므로 필요한 것만 구현하면 된다.
/// [`hooks`](ExtensionModule::hooks)가 선언하지 않은 훅은 호출되지 않는다.
#[async_trait]
pub trait ExtensionModule: Send + Sync {
    fn hooks(&self) -> HookSet {
        HookSet::ALL
    }

    async fn init(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
        Ok(())
    }

    async fn load(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
        Ok(())
    }

    async fn unload(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
        Ok(())
    }

    async fn uninit(&self, _api: &ExtensionApi) -> anyhow::Result<()> {
        Ok(())
    }
}

/// 아무 훅도 없는 모듈 (메타데이터만 있는 애드온)
pub struct InertModule;

impl ExtensionModule for InertModule {
    fn hooks(&self) -> HookSet {
        HookSet::NONE
    }
}

// ============================================================================
// ModuleLoader
// ============================================================================

/// 실행할 엔트리 모듈
///
/// `code`는 로드할 때마다 디스크에서 새로 읽은 내용이다.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    pub id: String,
    pub path: PathBuf,
    pub code: Vec<u8>,
}

/// 엔트리 모듈을 실행해 exports를 얻는 전략
///
/// 샌드박싱 방식은 구현체의 몫이다.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn execute(
        &self,
        source: &ModuleSource,
        api: &ExtensionApi,
    ) -> anyhow::Result<Arc<dyn ExtensionModule>>;
}

/// 모듈 팩토리
pub type ModuleFactory = Arc<
    dyn Fn(&ModuleSource, &ExtensionApi) -> anyhow::Result<Arc<dyn ExtensionModule>> + Send + Sync,
>;

/// 호스트가 등록한 네이티브 모듈을 id로 찾는 로더
#[derive(Default)]
pub struct StaticModuleLoader {
    factories: RwLock<HashMap<String, ModuleFactory>>,
    fallback: Option<ModuleFactory>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 등록되지 않은 id에 쓸 팩토리
    pub fn with_fallback<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ModuleSource, &ExtensionApi) -> anyhow::Result<Arc<dyn ExtensionModule>>
            + Send
            + Sync
            + 'static,
    {
        self.fallback = Some(Arc::new(factory));
        self
    }

    /// id에 팩토리 등록 (기존 등록은 교체)
    pub fn register<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn(&ModuleSource, &ExtensionApi) -> anyhow::Result<Arc<dyn ExtensionModule>>
            + Send
            + Sync
            + 'static,
    {
        self.factories.write().insert(id.into(), Arc::new(factory));
    }

    pub fn unregister(&self, id: &str) -> bool {
        self.factories.write().remove(id).is_some()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.factories.read().contains_key(id)
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn execute(
        &self,
        source: &ModuleSource,
        api: &ExtensionApi,
    ) -> anyhow::Result<Arc<dyn ExtensionModule>> {
        let factory = self
            .factories
            .read()
            .get(&source.id)
            .cloned()
            .or_else(|| self.fallback.clone());

        match factory {
            Some(factory) => factory(source, api),
            None => anyhow::bail!("no module registered for '{}'", source.id),
        }
    }
}
