//! Extension Events - 수명주기 이벤트 버스

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::broadcast;
use tracing::debug;

// ============================================================================
// ExtensionEvent
// ============================================================================

/// 수명주기 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionEvent {
    pub kind: EventKind,

    /// 대상 확장 id (디렉토리만 알 때는 디렉토리 이름)
    pub extension_id: String,

    pub data: Value,

    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ExtensionEvent {
    pub fn new(kind: EventKind, extension_id: impl Into<String>, data: Value) -> Self {
        Self {
            kind,
            extension_id: extension_id.into(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn simple(kind: EventKind, extension_id: impl Into<String>) -> Self {
        Self::new(kind, extension_id, Value::Null)
    }
}

/// 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Discovered,
    Initialized,
    Loaded,
    Unloaded,
    Uninitialized,
    Removed,
    LoadFailed,
    ThemeAttached,
    ThemeDetached,
    SettingsChanged,
    /// 확장이 직접 발행한 이벤트
    Custom,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Discovered => "discovered",
            Self::Initialized => "initialized",
            Self::Loaded => "loaded",
            Self::Unloaded => "unloaded",
            Self::Uninitialized => "uninitialized",
            Self::Removed => "removed",
            Self::LoadFailed => "load_failed",
            Self::ThemeAttached => "theme_attached",
            Self::ThemeDetached => "theme_detached",
            Self::SettingsChanged => "settings_changed",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// 이벤트 버스 - 발행/구독 + 최근 히스토리
pub struct EventBus {
    sender: broadcast::Sender<ExtensionEvent>,

    /// 최근 N개 (0이면 기록하지 않음)
    history: parking_lot::Mutex<VecDeque<ExtensionEvent>>,

    history_size: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(256, 100)
    }

    pub fn with_capacity(channel_capacity: usize, history_size: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity);
        Self {
            sender,
            history: parking_lot::Mutex::new(VecDeque::with_capacity(history_size)),
            history_size,
        }
    }

    /// 이벤트 발행
    pub fn publish(&self, event: ExtensionEvent) {
        debug!(extension = %event.extension_id, "Event: {}", event.kind);

        if self.history_size > 0 {
            let mut history = self.history.lock();
            while history.len() >= self.history_size {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        // 구독자가 없어도 OK
        let _ = self.sender.send(event);
    }

    pub fn emit(&self, kind: EventKind, extension_id: &str) {
        self.publish(ExtensionEvent::simple(kind, extension_id));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExtensionEvent> {
        self.sender.subscribe()
    }

    pub fn history(&self) -> Vec<ExtensionEvent> {
        self.history.lock().iter().cloned().collect()
    }

    /// 특정 확장의 이벤트 히스토리
    pub fn history_for(&self, extension_id: &str) -> Vec<ExtensionEvent> {
        self.history
            .lock()
            .iter()
            .filter(|e| e.extension_id == extension_id)
            .cloned()
            .collect()
    }

    /// 특정 확장의 이벤트 종류만 순서대로
    pub fn kinds_for(&self, extension_id: &str) -> Vec<EventKind> {
        self.history_for(extension_id)
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let bus = EventBus::with_capacity(8, 3);
        for i in 0..5 {
            bus.emit(EventKind::Loaded, &format!("ext-{}", i));
        }

        let history = bus.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].extension_id, "ext-2");
    }

    #[tokio::test]
    async fn test_zero_history_still_delivers() {
        let bus = EventBus::with_capacity(16, 0);
        let mut receiver = bus.subscribe();

        bus.emit(EventKind::Loaded, "x");
        bus.emit(EventKind::Unloaded, "x");

        assert!(bus.history().is_empty());
        assert_eq!(receiver.recv().await.unwrap().kind, EventKind::Loaded);
        assert_eq!(receiver.recv().await.unwrap().kind, EventKind::Unloaded);
    }

    #[test]
    fn test_history_for_extension() {
        let bus = EventBus::new();
        bus.emit(EventKind::Discovered, "a");
        bus.emit(EventKind::Discovered, "b");
        bus.emit(EventKind::Loaded, "a");

        assert_eq!(bus.kinds_for("a"), vec![EventKind::Discovered, EventKind::Loaded]);
    }

    #[tokio::test]
    async fn test_subscribe() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.publish(ExtensionEvent::new(
            EventKind::Custom,
            "sample",
            serde_json::json!({ "name": "ping" }),
        ));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::Custom);
        assert_eq!(event.data["name"], "ping");
    }
}
