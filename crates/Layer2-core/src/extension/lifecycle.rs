//! 애드온/테마 매니저가 공유하는 수명주기 도구
//!
//! - 확장 코드 실패 격리 (`isolate`)
//! - 확장 루트 스캔 (`scan_root`)

use super::watch::WatchSignal;
use futures::FutureExt;
use regild_foundation::{Error, Result};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tracing::error;

/// `load` 호출 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    AlreadyLoaded,
    /// 실패는 로그로 남고 확장은 비활성 상태로 `all`에 남는다
    Failed,
}

impl LoadOutcome {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Loaded | Self::AlreadyLoaded)
    }
}

/// 확장이 제공한 코드를 실행하고, 에러와 패닉을 [`Error::ExtensionRuntime`]으로 가둔다
///
/// 에러는 확장 id와 함께 여기서 로그로 남는다.
pub(crate) async fn isolate<T, F>(id: &str, phase: &str, fut: F) -> Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let message = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => format!("{:#}", e),
        Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
    };

    error!(extension = id, phase, "Extension failed: {}", message);
    Err(Error::extension_runtime(id, phase, message))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 루트 바로 아래 디렉토리마다 신호 하나 (디렉토리 이름 순)
///
/// 루트가 없으면 만든다.
pub(crate) async fn scan_root(root: &Path) -> Result<Vec<WatchSignal>> {
    tokio::fs::create_dir_all(root).await?;

    let mut entries = tokio::fs::read_dir(root).await?;
    let mut signals = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        // 링크를 따라간다 (끊어진 링크는 건너뜀)
        match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => continue,
        }
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        signals.push(WatchSignal::inspect(dir_name, entry.path()));
    }
    signals.sort_by(|a, b| a.dir_name().cmp(b.dir_name()));
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::descriptor::DESCRIPTOR_FILE;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_isolate_passes_values() {
        let value = isolate("ok", "load", async { Ok::<_, anyhow::Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    async fn fails() -> anyhow::Result<()> {
        anyhow::bail!("boom")
    }

    async fn explodes() -> anyhow::Result<()> {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_isolate_contains_errors() {
        let err = isolate("bad", "init", fails()).await.unwrap_err();
        assert!(matches!(err, Error::ExtensionRuntime { ref phase, .. } if phase == "init"));
    }

    #[tokio::test]
    async fn test_isolate_contains_panics() {
        let err = isolate("bad", "load", explodes()).await.unwrap_err();
        assert!(err.to_string().contains("kaboom"));
    }

    #[tokio::test]
    async fn test_scan_root() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("b")).unwrap();
        std::fs::create_dir(root.path().join("a")).unwrap();
        std::fs::write(root.path().join("a").join(DESCRIPTOR_FILE), "{}").unwrap();
        std::fs::write(root.path().join("stray.txt"), "").unwrap();

        let signals = scan_root(root.path()).await.unwrap();
        assert_eq!(signals.len(), 2);
        assert!(!signals[0].is_removed());
        assert!(signals[1].is_removed());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_follows_symlinked_directories() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let real = elsewhere.path().join("real-sample");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join(DESCRIPTOR_FILE), "{}").unwrap();
        std::os::unix::fs::symlink(&real, root.path().join("sample")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join("missing"), root.path().join("dangling"))
            .unwrap();

        let signals = scan_root(root.path()).await.unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].dir_name(), "sample");
        assert!(!signals[0].is_removed());
    }

    #[tokio::test]
    async fn test_scan_creates_missing_root() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("addons");
        assert!(scan_root(&missing).await.unwrap().is_empty());
        assert!(missing.is_dir());
    }
}
