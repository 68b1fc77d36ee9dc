// ==========================================
// 供应链洞察 - 重算取消
// ==========================================
// 同一 (org, 时间范围) 的并发重算共用一个令牌；只有新数据导入会取消该 org 的重算
// 取消是正常结果，不是错误
// ==========================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 取消令牌（克隆共享同一状态）
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// 可取消计算的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> ComputeOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ComputeOutcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            ComputeOutcome::Completed(value) => Some(value),
            ComputeOutcome::Cancelled => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ComputeOutcome<U> {
        match self {
            ComputeOutcome::Completed(value) => ComputeOutcome::Completed(f(value)),
            ComputeOutcome::Cancelled => ComputeOutcome::Cancelled,
        }
    }
}

// ==========================================
// RecomputeRegistry
// ==========================================
#[derive(Debug)]
struct Inflight {
    token: CancellationToken,
    readers: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RecomputeRegistry {
    // (org_id, range_key) → 在途令牌 + 持有者数
    inflight: Arc<Mutex<HashMap<(String, String), Inflight>>>,
}

impl RecomputeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记重算；同键已有在途重算时共用其令牌
    pub fn begin(&self, org_id: &str, range_key: &str) -> CancellationToken {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        let entry = inflight
            .entry((org_id.to_string(), range_key.to_string()))
            .or_insert_with(|| Inflight {
                token: CancellationToken::new(),
                readers: 0,
            });
        entry.readers += 1;
        if entry.readers > 1 {
            debug!(org_id, range_key, readers = entry.readers, "共用在途重算令牌");
        }
        entry.token.clone()
    }

    /// 重算结束；最后一个持有者离开时移除（令牌已被导入替换时忽略）
    pub fn finish(&self, org_id: &str, range_key: &str, token: &CancellationToken) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        let key = (org_id.to_string(), range_key.to_string());
        let Some(entry) = inflight.get_mut(&key) else {
            return;
        };
        if !entry.token.same_as(token) {
            return;
        }
        entry.readers = entry.readers.saturating_sub(1);
        if entry.readers == 0 {
            inflight.remove(&key);
        }
    }

    /// 取消某 org 的所有在途重算
    ///
    /// # 返回
    /// - 被取消的数量
    pub fn cancel_org(&self, org_id: &str) -> usize {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        let mut cancelled = 0;
        inflight.retain(|(org, _), entry| {
            if org == org_id {
                entry.token.cancel();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        cancelled
    }

    pub fn inflight_count(&self) -> usize {
        self.inflight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_begin_shares_token() {
        let registry = RecomputeRegistry::new();
        let first = registry.begin("acme", "30d");
        let second = registry.begin("acme", "30d");
        assert!(first.same_as(&second));
        assert!(!first.is_cancelled());

        let other = registry.begin("acme", "90d");
        assert!(!other.same_as(&first));
        assert_eq!(registry.inflight_count(), 2);
    }

    #[test]
    fn test_cancel_org_only_touches_that_org() {
        let registry = RecomputeRegistry::new();
        let a = registry.begin("acme", "30d");
        let b = registry.begin("globex", "30d");
        assert_eq!(registry.cancel_org("acme"), 1);
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }

    #[test]
    fn test_finish_waits_for_last_reader() {
        let registry = RecomputeRegistry::new();
        let first = registry.begin("acme", "30d");
        let second = registry.begin("acme", "30d");
        registry.finish("acme", "30d", &first);
        assert_eq!(registry.inflight_count(), 1);
        registry.finish("acme", "30d", &second);
        assert_eq!(registry.inflight_count(), 0);
    }

    #[test]
    fn test_finish_ignores_token_cancelled_by_ingest() {
        let registry = RecomputeRegistry::new();
        let stale = registry.begin("acme", "30d");
        registry.cancel_org("acme");
        let fresh = registry.begin("acme", "30d");
        assert!(stale.is_cancelled());
        assert!(!fresh.is_cancelled());

        registry.finish("acme", "30d", &stale);
        assert_eq!(registry.inflight_count(), 1);
        registry.finish("acme", "30d", &fresh);
        assert_eq!(registry.inflight_count(), 0);
    }
}
