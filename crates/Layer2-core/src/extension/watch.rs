//! Watch & Debounce - 확장 루트 디렉토리 감시
//!
//! 파일 시스템 이벤트를 확장 디렉토리별로 모아, 윈도우 동안 조용하면
//! 신호 하나만 내보낸다. 호스트가 직접 쓰는 `settings.json`/`data.json`은
//! 재로드 루프를 피하기 위해 무시한다.
//!
//! ```text
//! notify ──▶ event channel ──▶ Debouncer (디렉토리별 타이머) ──▶ signal channel ──▶ WatchTarget
//! ```

use super::descriptor::{DATA_FILE, DESCRIPTOR_FILE, SETTINGS_FILE};
use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use regild_foundation::{Error, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

// ============================================================================
// WatchSignal / WatchTarget
// ============================================================================

/// 디바운스된 디렉토리 신호
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSignal {
    /// 메타데이터 파일이 존재함 → 재해석
    Changed { dir_name: String, directory: PathBuf },
    /// 메타데이터 파일이 사라짐 → 언로드 후 제거
    Removed { dir_name: String, directory: PathBuf },
}

impl WatchSignal {
    /// 현재 디스크 상태로 신호 결정
    pub fn inspect(dir_name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        let dir_name = dir_name.into();
        let directory = directory.into();
        if directory.join(DESCRIPTOR_FILE).is_file() {
            Self::Changed { dir_name, directory }
        } else {
            Self::Removed { dir_name, directory }
        }
    }

    pub fn dir_name(&self) -> &str {
        match self {
            Self::Changed { dir_name, .. } | Self::Removed { dir_name, .. } => dir_name,
        }
    }

    pub fn directory(&self) -> &Path {
        match self {
            Self::Changed { directory, .. } | Self::Removed { directory, .. } => directory,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }
}

/// 신호를 받는 쪽 (애드온/테마 매니저)
///
/// `stamp`는 디스패치 루프에서 도착 순서대로 호출되고, 발급된 세대가
/// `on_signal`에 함께 전달된다. 같은 디렉토리의 더 오래된 세대는 버려진다.
#[async_trait]
pub trait WatchTarget: Send + Sync {
    fn stamp(&self, signal: &WatchSignal) -> u64;

    async fn on_signal(&self, signal: WatchSignal, generation: u64);
}

// ============================================================================
// Debouncer
// ============================================================================

/// 디렉토리별 취소 가능한 타이머
pub struct Debouncer {
    root: PathBuf,
    window: Duration,
    pending: HashMap<String, JoinHandle<()>>,
    tx: mpsc::UnboundedSender<WatchSignal>,
}

impl Debouncer {
    pub fn new(
        root: impl Into<PathBuf>,
        window: Duration,
        tx: mpsc::UnboundedSender<WatchSignal>,
    ) -> Self {
        Self {
            root: root.into(),
            window,
            pending: HashMap::new(),
            tx,
        }
    }

    /// 경로 변경을 기록하고 해당 디렉토리의 타이머를 (재)시작
    ///
    /// 반환값: 타이머가 걸린 디렉토리 이름 (무시된 경로는 None)
    pub fn touch(&mut self, path: &Path) -> Option<String> {
        let dir_name = self.dir_name_of(path)?;

        if let Some(previous) = self.pending.remove(&dir_name) {
            previous.abort();
        }
        self.pending.retain(|_, handle| !handle.is_finished());

        let directory = self.root.join(&dir_name);
        let window = self.window;
        let tx = self.tx.clone();
        let name = dir_name.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let signal = WatchSignal::inspect(name, directory);
            trace!("Debounced signal: {:?}", signal);
            let _ = tx.send(signal);
        });

        self.pending.insert(dir_name.clone(), handle);
        Some(dir_name)
    }

    /// 대기 중인 타이머 수
    pub fn pending(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }

    fn dir_name_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;

        let file_name = path.file_name().and_then(|n| n.to_str());
        if matches!(file_name, Some(SETTINGS_FILE) | Some(DATA_FILE)) {
            return None;
        }

        match relative.components().next()? {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

// ============================================================================
// ExtensionWatcher
// ============================================================================

/// 확장 루트 감시자
///
/// drop하면 감시와 백그라운드 태스크가 모두 멈춘다.
pub struct ExtensionWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
    tasks: Vec<JoinHandle<()>>,
}

impl ExtensionWatcher {
    /// 루트를 (없으면 만들고) 재귀 감시 시작
    pub fn start(
        root: impl AsRef<Path>,
        window: Duration,
        target: Arc<dyn WatchTarget>,
    ) -> Result<Self> {
        std::fs::create_dir_all(root.as_ref())?;
        let root = root.as_ref().canonicalize()?;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                let _ = event_tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| Error::Watch(e.to_string()))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::Watch(format!("{}: {}", root.display(), e)))?;

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(root.clone(), window, signal_tx);

        let events_task = tokio::spawn(async move {
            while let Some(res) = event_rx.recv().await {
                match res {
                    Ok(event) => {
                        if matches!(event.kind, notify::EventKind::Access(_)) {
                            continue;
                        }
                        for path in &event.paths {
                            debouncer.touch(path);
                        }
                    }
                    Err(e) => warn!("Watch error: {}", e),
                }
            }
        });

        let dispatch_task = tokio::spawn(dispatch(signal_rx, target));

        info!("Watching {} (debounce {:?})", root.display(), window);
        Ok(Self {
            root,
            _watcher: watcher,
            tasks: vec![events_task, dispatch_task],
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// 신호마다 태스크 하나 (세대는 스폰 전에 발급)
async fn dispatch(mut rx: mpsc::UnboundedReceiver<WatchSignal>, target: Arc<dyn WatchTarget>) {
    while let Some(signal) = rx.recv().await {
        debug!("Dispatching {:?}", signal);
        let generation = target.stamp(&signal);
        let target = Arc::clone(&target);
        tokio::spawn(async move {
            target.on_signal(signal, generation).await;
        });
    }
}

impl Drop for ExtensionWatcher {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        debug!("Stopped watching {}", self.root.display());
    }
}
