//! Permission service for regild
//!
//! Holds the id → mask mapping in memory and persists every mutation.
//! Grants are not tied to installed extensions; an id may be granted
//! permissions before it is ever discovered.

use super::settings::PermissionSettings;
use super::types::AddonPermission;
use crate::storage::JsonStore;
use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Permission service managing grants and queries
pub struct PermissionService {
    settings: RwLock<PermissionSettings>,

    /// None이면 메모리 전용
    store: Option<JsonStore>,
}

impl PermissionService {
    /// In-memory service (nothing is persisted)
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(PermissionSettings::default()),
            store: None,
        }
    }

    /// Service backed by `<dir>/permissions.json`
    pub fn with_store(store: JsonStore, settings: PermissionSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            store: Some(store),
        }
    }

    /// Load persisted grants from a data directory
    ///
    /// A corrupt file is reported and replaced by an empty mapping on the next write.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = JsonStore::new(data_dir);
        let settings = match PermissionSettings::load_from(&store) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load permissions, starting empty: {}", e);
                PermissionSettings::default()
            }
        };
        debug!("Loaded {} permission grant(s)", settings.grants.len());
        Ok(Self::with_store(store, settings))
    }

    /// Full mask for an id (absent ids are 0)
    pub fn get_permissions(&self, id: &str) -> AddonPermission {
        self.settings.read().get(id)
    }

    /// `mask & flag != 0`
    pub fn has_permission(&self, id: &str, flag: AddonPermission) -> bool {
        self.get_permissions(id).intersects(flag)
    }

    /// Overwrite the mask for an id and persist before returning
    ///
    /// On a failed write the in-memory mapping is restored.
    pub fn set_permissions(&self, id: &str, mask: AddonPermission) -> Result<()> {
        let mut settings = self.settings.write();
        let previous = settings.set(id, mask);

        if let Some(store) = &self.store {
            if let Err(e) = settings.save_to(store) {
                match previous {
                    Some(prev) => settings.grants.insert(id.to_string(), prev),
                    None => settings.grants.remove(id),
                };
                return Err(e);
            }
        }

        debug!(extension = id, "Permissions set to {}", mask);
        Ok(())
    }

    /// Add flags to the current mask
    pub fn grant(&self, id: &str, flags: AddonPermission) -> Result<AddonPermission> {
        let mask = self.get_permissions(id) | flags;
        self.set_permissions(id, mask)?;
        Ok(mask)
    }

    /// Remove flags from the current mask
    pub fn revoke(&self, id: &str, flags: AddonPermission) -> Result<AddonPermission> {
        let mut mask = self.get_permissions(id);
        mask.remove(flags);
        self.set_permissions(id, mask)?;
        Ok(mask)
    }

    /// Snapshot of every grant
    pub fn all(&self) -> BTreeMap<String, AddonPermission> {
        self.settings.read().grants.clone()
    }
}

impl Default for PermissionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_id_has_no_permissions() {
        let service = PermissionService::new();
        assert_eq!(service.get_permissions("ghost"), AddonPermission::NONE);
        assert!(!service.has_permission("ghost", AddonPermission::USE_API));
    }

    #[test]
    fn test_round_trip_exact_mask() {
        let service = PermissionService::new();
        let mask = AddonPermission::from_bits(0b10_1010);
        service.set_permissions("sample", mask).unwrap();

        assert_eq!(service.get_permissions("sample"), mask);
        assert!(service.has_permission("sample", AddonPermission::MODIFY_ELEMENTS));
        assert!(!service.has_permission("sample", AddonPermission::USE_ELEMENTS));
    }

    #[test]
    fn test_set_persists_before_returning() {
        let dir = TempDir::new().unwrap();
        let service = PermissionService::load(dir.path()).unwrap();
        service
            .set_permissions("not-installed", AddonPermission::USE_API)
            .unwrap();

        let reloaded = PermissionService::load(dir.path()).unwrap();
        assert_eq!(
            reloaded.get_permissions("not-installed"),
            AddonPermission::USE_API
        );
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        // 디렉토리 자리에 파일을 두어 쓰기를 실패시킨다
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();

        let service =
            PermissionService::with_store(JsonStore::new(&blocker), PermissionSettings::default());
        assert!(service
            .set_permissions("sample", AddonPermission::USE_API)
            .is_err());
        assert_eq!(service.get_permissions("sample"), AddonPermission::NONE);
    }

    #[test]
    fn test_grant_and_revoke() {
        let service = PermissionService::new();
        service.grant("a", AddonPermission::USE_API).unwrap();
        service.grant("a", AddonPermission::EXTRA_INFO).unwrap();
        let mask = service.revoke("a", AddonPermission::USE_API).unwrap();

        assert_eq!(mask, AddonPermission::EXTRA_INFO);
        assert_eq!(service.all().len(), 1);
    }
}
