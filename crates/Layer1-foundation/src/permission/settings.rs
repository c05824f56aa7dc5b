//! Permission 설정 저장/로드
//!
//! 확장 id → 비트마스크 매핑을 JSON으로 관리

use super::types::AddonPermission;
use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 설정 파일명
pub const PERMISSIONS_FILE: &str = "permissions.json";

/// Permission 설정 파일 구조
///
/// ```json
/// { "grants": { "sample": 24 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSettings {
    #[serde(default)]
    pub grants: BTreeMap<String, AddonPermission>,
}

impl PermissionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장소에서 로드 (파일이 없으면 빈 설정)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store.load_optional(PERMISSIONS_FILE)?.unwrap_or_default())
    }

    /// 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(PERMISSIONS_FILE, self)
    }

    /// 권한 조회 (없으면 0)
    pub fn get(&self, id: &str) -> AddonPermission {
        self.grants.get(id).copied().unwrap_or_default()
    }

    /// 권한 덮어쓰기. 빈 마스크는 항목을 지운다.
    ///
    /// 이전 값을 반환한다.
    pub fn set(&mut self, id: &str, mask: AddonPermission) -> Option<AddonPermission> {
        if mask.is_empty() {
            self.grants.remove(id)
        } else {
            self.grants.insert(id.to_string(), mask)
        }
    }
}
