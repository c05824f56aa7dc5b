//! Extension Registry - 알려진 확장, 활성화 목록, 초기화 기록
//!
//! 읽기는 스냅샷 복사본으로 하므로 변경 도중에도 안전하게 열거할 수 있다.
//! id 단위의 원자성은 상위 매니저의 id 락이 보장한다.

use super::descriptor::ExtensionDescriptor;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    /// 발견 순서
    all: Vec<Arc<ExtensionDescriptor>>,
    enabled: HashSet<String>,
    initialized: HashSet<String>,
}

/// 확장 레지스트리
#[derive(Default)]
pub struct ExtensionRegistry {
    state: RwLock<RegistryState>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성화 목록을 지정해 생성
    pub fn with_enabled<I, S>(enabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        registry.replace_enabled(enabled);
        registry
    }

    // ========================================================================
    // all
    // ========================================================================

    /// 발견 순서대로의 스냅샷
    pub fn all(&self) -> Vec<Arc<ExtensionDescriptor>> {
        self.state.read().all.clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<ExtensionDescriptor>> {
        self.state.read().all.iter().find(|d| d.id == id).cloned()
    }

    pub fn find_by_dir_name(&self, dir_name: &str) -> Option<Arc<ExtensionDescriptor>> {
        self.state
            .read()
            .all
            .iter()
            .find(|d| d.dir_name == dir_name)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.read().all.iter().any(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.state.read().all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().all.is_empty()
    }

    /// 디스크립터 추가
    ///
    /// 같은 id나 같은 디렉토리의 기존 항목은 교체되며 반환된다.
    pub fn insert(&self, descriptor: Arc<ExtensionDescriptor>) -> Vec<Arc<ExtensionDescriptor>> {
        let mut state = self.state.write();
        let mut replaced = Vec::new();
        state.all.retain(|existing| {
            let clash = existing.id == descriptor.id || existing.directory == descriptor.directory;
            if clash {
                replaced.push(Arc::clone(existing));
            }
            !clash
        });
        debug!(extension = %descriptor.id, "Registered descriptor ({} replaced)", replaced.len());
        state.all.push(descriptor);
        replaced
    }

    /// 확장이 사라졌을 때: `all`과 `initialized`에서 모두 제거
    ///
    /// `enabled`는 사용자의 선택이므로 유지한다.
    pub fn purge(&self, id: &str) -> Option<Arc<ExtensionDescriptor>> {
        let mut state = self.state.write();
        state.initialized.remove(id);
        let index = state.all.iter().position(|d| d.id == id)?;
        Some(state.all.remove(index))
    }

    // ========================================================================
    // enabled
    // ========================================================================

    pub fn is_enabled(&self, id: &str) -> bool {
        self.state.read().enabled.contains(id)
    }

    /// 반환값: 상태가 바뀌었는지
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut state = self.state.write();
        if enabled {
            state.enabled.insert(id.to_string())
        } else {
            state.enabled.remove(id)
        }
    }

    pub fn replace_enabled<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write();
        state.enabled = ids.into_iter().map(Into::into).collect();
    }

    /// 정렬된 활성화 id 목록
    pub fn enabled(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.state.read().enabled.iter().cloned().collect();
        ids.sort();
        ids
    }

    // ========================================================================
    // initialized
    // ========================================================================

    pub fn is_initialized(&self, id: &str) -> bool {
        self.state.read().initialized.contains(id)
    }

    pub fn mark_initialized(&self, id: &str) -> bool {
        self.state.write().initialized.insert(id.to_string())
    }

    pub fn initialized(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.state.read().initialized.iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::descriptor::ExtensionKind;
    use regild_foundation::AddonPermission;
    use std::path::PathBuf;

    fn descriptor(id: &str, dir: &str) -> Arc<ExtensionDescriptor> {
        Arc::new(ExtensionDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            kind: ExtensionKind::Addon,
            directory: PathBuf::from("/addons").join(dir),
            dir_name: dir.to_string(),
            entry_files: vec![PathBuf::from("/addons").join(dir).join("main.js")],
            version: None,
            description: None,
            author: None,
            requested_permissions: AddonPermission::NONE,
        })
    }

    #[test]
    fn test_insert_keeps_discovery_order() {
        let registry = ExtensionRegistry::new();
        registry.insert(descriptor("b", "b"));
        registry.insert(descriptor("a", "a"));

        let ids: Vec<_> = registry.all().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_id_replaces() {
        let registry = ExtensionRegistry::new();
        registry.insert(descriptor("sample", "one"));
        let replaced = registry.insert(descriptor("sample", "two"));

        assert_eq!(replaced.len(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("sample").unwrap().dir_name, "two");
    }

    #[test]
    fn test_same_directory_replaces() {
        let registry = ExtensionRegistry::new();
        registry.insert(descriptor("old-id", "dir"));
        registry.insert(descriptor("new-id", "dir"));

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("old-id"));
    }

    #[test]
    fn test_purge_clears_initialized_but_keeps_enabled() {
        let registry = ExtensionRegistry::with_enabled(["sample"]);
        registry.insert(descriptor("sample", "sample"));
        registry.mark_initialized("sample");

        registry.purge("sample");
        assert!(!registry.is_initialized("sample"));
        assert!(registry.is_enabled("sample"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let registry = ExtensionRegistry::new();
        registry.insert(descriptor("a", "a"));
        let snapshot = registry.all();
        registry.purge("a");

        assert_eq!(snapshot.len(), 1);
        assert!(registry.find_by_dir_name("a").is_none());
    }
}
