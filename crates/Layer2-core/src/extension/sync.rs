//! 키 단위 동기화 도구
//!
//! - `KeyedLocks`: 같은 키의 작업은 직렬화, 다른 키는 병렬
//! - `Generations`: 새 신호가 이전 신호를 대체했는지 판단

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// 키별 비동기 락
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키의 락을 획득할 때까지 대기
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        mutex.lock_owned().await
    }

    /// 대기 없이 시도
    pub fn try_lock(&self, key: &str) -> Option<OwnedMutexGuard<()>> {
        let mutex = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        mutex.try_lock_owned().ok()
    }
}

/// 키별 세대 카운터
#[derive(Default)]
pub struct Generations {
    counters: Mutex<HashMap<String, u64>>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 세대를 시작하고 번호를 반환
    pub fn bump(&self, key: &str) -> u64 {
        let mut counters = self.counters.lock();
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// 주어진 세대가 여전히 최신인지
    pub fn is_current(&self, key: &str, generation: u64) -> bool {
        self.counters.lock().get(key).copied() == Some(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = KeyedLocks::new();
        let guard = locks.lock("a").await;

        assert!(locks.try_lock("a").is_none());
        assert!(locks.try_lock("b").is_some());

        drop(guard);
        assert!(locks.try_lock("a").is_some());
    }

    #[test]
    fn test_generations_supersede() {
        let generations = Generations::new();
        let first = generations.bump("dir");
        let second = generations.bump("dir");

        assert!(!generations.is_current("dir", first));
        assert!(generations.is_current("dir", second));
        assert!(!generations.is_current("other", 1));
    }
}
