//! # Extension System
//!
//! 애드온(코드)과 테마(CSS) 확장의 발견, 핫 리로드, 수명주기 관리
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ExtensionHost                          │
//! │                                                              │
//! │   ExtensionWatcher ──signal──▶ AddonManager / ThemeManager   │
//! │   (notify + Debouncer)              │                        │
//! │                                     ├─▶ DescriptorLoader     │
//! │                                     ├─▶ ExtensionRegistry    │
//! │                                     ├─▶ ArtifactCache        │
//! │                                     ├─▶ PermissionService    │
//! │                                     ├─▶ StyleTree (테마)     │
//! │                                     └─▶ EventBus             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let loader = StaticModuleLoader::new();
//! loader.register("sample", |_, _| Ok(Arc::new(SampleAddon) as Arc<dyn ExtensionModule>));
//!
//! let mut host = ExtensionHost::new(HostConfig::load()?, Arc::new(loader))?;
//! host.start().await?;
//! ```

pub mod addon;
pub mod api;
pub mod artifact;
pub mod descriptor;
pub mod events;
pub mod host;
pub mod lifecycle;
pub mod module;
pub mod registry;
pub mod sync;
pub mod theme;
pub mod watch;

pub use addon::AddonManager;
pub use api::{Diagnostics, ExtensionApi, ExtensionData};
pub use artifact::{Artifact, ArtifactCache};
pub use descriptor::{
    is_valid_id, DescriptorLoader, ExtensionDescriptor, ExtensionKind, DATA_FILE,
    DESCRIPTOR_FILE, SETTINGS_FILE,
};
pub use events::{EventBus, EventKind, ExtensionEvent};
pub use host::ExtensionHost;
pub use lifecycle::LoadOutcome;
pub use module::{
    ExtensionModule, HookSet, InertModule, LifecycleHook, ModuleFactory, ModuleLoader,
    ModuleSource, StaticModuleLoader,
};
pub use registry::ExtensionRegistry;
pub use theme::{
    SettingType, SettingValue, StyleBlock, StyleHost, StyleSheet, StyleTree, ThemeManager,
    ThemeSetting, ThemeSettings,
};
pub use watch::{Debouncer, ExtensionWatcher, WatchSignal, WatchTarget};
