//! # regild-foundation
//!
//! Foundation layer for regild:
//! - Error: 확장 수명주기 전반의 에러 분류 (Error, Result)
//! - Storage: JSON 파일 저장소 (JsonStore)
//! - Permission: 확장별 비트마스크 권한 (AddonPermission, PermissionService)
//! - Config: 호스트 설정 (HostConfig)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  regild-core (AddonManager / ThemeManager)              │
//! │                     │                                   │
//! │          ┌──────────┴──────────┐                        │
//! │          ▼                     ▼                        │
//! │   PermissionService       HostConfig                    │
//! │   (permissions.json)      (config.json)                 │
//! │          │                     │                        │
//! │          └──────────┬──────────┘                        │
//! │                     ▼                                   │
//! │                 JsonStore                               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod permission;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{HostConfig, DEFAULT_DEBOUNCE_MS, HOST_CONFIG_FILE};

// ============================================================================
// Permission (권한 시스템)
// ============================================================================
pub use permission::{AddonPermission, PermissionService, PermissionSettings, PERMISSIONS_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
