//! Artifact Cache - 활성 애드온을 뒷받침하는 실행 아티팩트 기록
//!
//! 해석된 엔트리 파일 경로를 키로 한다. 로드가 끝나면 기록되고
//! 언로드 때 제거된다. 모듈 실행은 항상 디스크에서 새로 읽은 내용으로
//! 하며, 재활성화는 유지된 인스턴스를 다시 기록한다.

use super::module::ExtensionModule;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// 실행된 코드 아티팩트
pub struct Artifact {
    pub path: PathBuf,
    pub module: Arc<dyn ExtensionModule>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, module: Arc<dyn ExtensionModule>) -> Self {
        Self {
            path: path.into(),
            module,
            loaded_at: chrono::Utc::now(),
        }
    }
}

/// 엔트리 경로 → 아티팩트
#[derive(Default)]
pub struct ArtifactCache {
    entries: Mutex<HashMap<PathBuf, Arc<Artifact>>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Artifact>> {
        self.entries.lock().get(path).cloned()
    }

    pub fn insert(&self, artifact: Artifact) -> Arc<Artifact> {
        let artifact = Arc::new(artifact);
        trace!("Caching artifact {}", artifact.path.display());
        self.entries
            .lock()
            .insert(artifact.path.clone(), Arc::clone(&artifact));
        artifact
    }

    /// 반환값: 캐시에 있었는지
    pub fn invalidate(&self, path: &Path) -> bool {
        let removed = self.entries.lock().remove(path).is_some();
        if removed {
            trace!("Invalidated artifact {}", path.display());
        }
        removed
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.lock().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
