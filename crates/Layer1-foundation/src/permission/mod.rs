//! Permission system for regild
//!
//! - `types`: 비트마스크 권한 플래그 (AddonPermission)
//! - `settings`: JSON 설정 저장/로드 (PermissionSettings)
//! - `service`: 런타임 권한 관리 (PermissionService)
//!
//! 권한은 보안 경계가 아니라 기록용 장부다. 호스트와 확장이
//! 스스로 조회하고 따르는 방식으로 동작한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use regild_foundation::permission::{AddonPermission, PermissionService};
//!
//! let service = PermissionService::load(data_dir)?;
//! service.set_permissions("sample", AddonPermission::USE_API | AddonPermission::EXTRA_INFO)?;
//!
//! if service.has_permission("sample", AddonPermission::USE_API) {
//!     // 확장 API 노출
//! }
//! ```

mod service;
mod settings;
mod types;

pub use service::PermissionService;
pub use settings::{PermissionSettings, PERMISSIONS_FILE};
pub use types::AddonPermission;
