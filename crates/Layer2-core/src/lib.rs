//! regild-core: Core Runtime for regild
//!
//! Layer2 - 확장 수명주기 레이어
//!
//! # 주요 모듈
//!
//! - `extension`: 확장 발견, 감시/디바운스, 레지스트리, 애드온 수명주기, 테마 렌더러
//!
//! # 사용 예시
//!
//! ```ignore
//! use regild_core::{ExtensionHost, StaticModuleLoader};
//! use regild_foundation::HostConfig;
//!
//! let mut host = ExtensionHost::new(HostConfig::load()?, Arc::new(StaticModuleLoader::new()))?;
//! host.start().await?;
//!
//! // 권한 부여
//! host.addons().set_permissions("sample", AddonPermission::USE_API)?;
//!
//! // 비활성화 / 재활성화 (init은 다시 실행되지 않음)
//! host.addons().disable("sample").await?;
//! host.addons().enable("sample").await?;
//! ```

pub mod extension;

// Re-exports: Extension
pub use extension::{
    AddonManager, Diagnostics, EventBus, EventKind, ExtensionApi, ExtensionData,
    ExtensionDescriptor, ExtensionEvent, ExtensionHost, ExtensionKind, ExtensionModule,
    ExtensionRegistry, ExtensionWatcher, HookSet, InertModule, LifecycleHook, LoadOutcome,
    ModuleLoader, ModuleSource, StaticModuleLoader, StyleBlock, StyleHost, StyleTree,
    ThemeManager, ThemeSettings, WatchSignal, WatchTarget,
};

// Re-exports: Foundation
pub use regild_foundation::{AddonPermission, Error, HostConfig, PermissionService, Result};
