//! Extension API - 확장에 제공되는 권한 범위의 인터페이스
//!
//! 애드온 id마다 하나씩 만들어지고 재사용된다.
//! 권한 검사는 기록용이며 보안 경계가 아니다.

use super::descriptor::{ExtensionDescriptor, DATA_FILE};
use super::events::{EventBus, EventKind, ExtensionEvent};
use super::registry::ExtensionRegistry;
use regild_foundation::{AddonPermission, Error, JsonStore, PermissionService, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct ApiInner {
    id: String,
    directory: Option<PathBuf>,
    permissions: Arc<PermissionService>,
    registry: Option<Arc<ExtensionRegistry>>,
    events: Option<Arc<EventBus>>,
}

/// 확장별 API 객체
#[derive(Clone)]
pub struct ExtensionApi {
    inner: Arc<ApiInner>,
}

/// 진단 정보 (`EXTRA_INFO` 필요)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub id: String,
    pub directory: Option<PathBuf>,
    pub enabled: bool,
    pub initialized: bool,
    pub granted: AddonPermission,
    pub known_extensions: usize,
}

impl ExtensionApi {
    pub fn new(
        descriptor: &ExtensionDescriptor,
        permissions: Arc<PermissionService>,
        registry: Arc<ExtensionRegistry>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                id: descriptor.id.clone(),
                directory: Some(descriptor.directory.clone()),
                permissions,
                registry: Some(registry),
                events: Some(events),
            }),
        }
    }

    /// 레지스트리/이벤트 없이 권한만 가진 API (테스트, 임베딩용)
    pub fn detached(id: impl Into<String>, permissions: Arc<PermissionService>) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                id: id.into(),
                directory: None,
                permissions,
                registry: None,
                events: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn directory(&self) -> Option<&Path> {
        self.inner.directory.as_deref()
    }

    // ========================================================================
    // 권한
    // ========================================================================

    /// 현재 부여된 권한 (매번 조회하므로 변경이 바로 반영됨)
    pub fn permissions(&self) -> AddonPermission {
        self.inner.permissions.get_permissions(&self.inner.id)
    }

    pub fn has_permission(&self, flag: AddonPermission) -> bool {
        self.inner.permissions.has_permission(&self.inner.id, flag)
    }

    pub fn require(&self, flag: AddonPermission) -> Result<()> {
        if self.has_permission(flag) {
            Ok(())
        } else {
            Err(Error::PermissionDenied {
                id: self.inner.id.clone(),
                permission: flag.to_string(),
            })
        }
    }

    // ========================================================================
    // 레지스트리 / 진단
    // ========================================================================

    /// 알려진 확장 목록 (`USE_API` 필요)
    pub fn extensions(&self) -> Result<Vec<Arc<ExtensionDescriptor>>> {
        self.require(AddonPermission::USE_API)?;
        Ok(self
            .inner
            .registry
            .as_ref()
            .map(|r| r.all())
            .unwrap_or_default())
    }

    /// 자신에 대한 진단 정보 (`EXTRA_INFO` 필요)
    pub fn diagnostics(&self) -> Result<Diagnostics> {
        self.require(AddonPermission::EXTRA_INFO)?;
        let id = &self.inner.id;
        let registry = self.inner.registry.as_ref();
        Ok(Diagnostics {
            id: id.clone(),
            directory: self.inner.directory.clone(),
            enabled: registry.map(|r| r.is_enabled(id)).unwrap_or(false),
            initialized: registry.map(|r| r.is_initialized(id)).unwrap_or(false),
            granted: self.permissions(),
            known_extensions: registry.map(|r| r.len()).unwrap_or(0),
        })
    }

    /// 사용자 정의 이벤트 발행 (`USE_EXTERNAL_API` 필요)
    pub fn emit(&self, name: &str, payload: Value) -> Result<()> {
        self.require(AddonPermission::USE_EXTERNAL_API)?;
        if let Some(events) = &self.inner.events {
            events.publish(ExtensionEvent::new(
                EventKind::Custom,
                self.inner.id.clone(),
                serde_json::json!({ "name": name, "payload": payload }),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // 데이터
    // ========================================================================

    /// 확장 디렉토리의 `data.json`
    pub fn data(&self) -> Result<ExtensionData> {
        let directory = self.inner.directory.as_ref().ok_or_else(|| {
            Error::InvalidInput(format!("extension '{}' has no directory", self.inner.id))
        })?;
        Ok(ExtensionData {
            store: JsonStore::new(directory),
        })
    }
}

/// 애드온 개인 데이터 (키-값 JSON 객체)
///
/// 파일은 감시 대상에서 제외되므로 쓰기가 재로드를 일으키지 않는다.
pub struct ExtensionData {
    store: JsonStore,
}

impl ExtensionData {
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let data: Map<String, Value> = self.store.load_optional(DATA_FILE)?.unwrap_or_default();
        Ok(data.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.store
            .update(DATA_FILE, |data: &mut Map<String, Value>| {
                data.insert(key.to_string(), value);
            })
            .map(|_| ())
    }

    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        let mut removed = None;
        self.store.update(DATA_FILE, |data: &mut Map<String, Value>| {
            removed = data.remove(key);
        })?;
        Ok(removed)
    }

    pub fn all(&self) -> Result<Map<String, Value>> {
        Ok(self.store.load_optional(DATA_FILE)?.unwrap_or_default())
    }
}
