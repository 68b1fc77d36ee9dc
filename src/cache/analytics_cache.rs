// ==========================================
// 供应链洞察 - 分析结果 TTL 缓存
// ==========================================
// 职责: 按键缓存聚合结果（KPI、汇总、告警等），TTL 过期 + 前缀失效
// 约定:
// - 键 = 操作名 + 排序后的参数列表（调用方无关、确定性）
// - 读取时惰性淘汰过期条目；类型不匹配按未命中处理
// - clear 推进代数（generation），clear 之前开始的计算结果不会写回
// - 同键并发 set 后写者胜
// ==========================================

use crate::cache::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// 默认 TTL（5 分钟）
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
/// KPI / 汇总类 TTL（10 分钟）
pub const ROLLUP_TTL: Duration = Duration::from_secs(600);

type Payload = Arc<dyn Any + Send + Sync>;

struct CacheEntry {
    payload: Payload,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        match age.to_std() {
            Ok(age) => age >= self.ttl,
            // 时钟回拨: 视为新鲜
            Err(_) => false,
        }
    }
}

// ==========================================
// CacheKey - 确定性键构造
// ==========================================
#[derive(Debug, Clone)]
pub struct CacheKey {
    operation: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// 形如 `kpis:days=30&org=acme`（参数按名称排序）
    pub fn build(mut self) -> String {
        self.params.sort();
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}:{}", self.operation, params)
    }
}

/// 分析操作名（即缓存键前缀）
pub mod ops {
    pub const PROCESSED_PRODUCTS: &str = "processed_products";
    pub const KPIS: &str = "kpis";
    pub const ALERTS: &str = "alerts";
    pub const PROCUREMENT: &str = "procurement_recommendations";
    pub const STOCK_EFFICIENCY: &str = "stock_efficiency";
    pub const PERFORMANCE: &str = "performance_rollup";

    /// 新数据导入后需要失效的全部前缀
    pub const ALL: &[&str] = &[
        PROCESSED_PRODUCTS,
        KPIS,
        ALERTS,
        PROCUREMENT,
        STOCK_EFFICIENCY,
        PERFORMANCE,
    ];
}

// ==========================================
// CacheStats - 命中统计快照
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub type_mismatches: u64,
    pub skipped_writes: u64,
}

#[derive(Debug, Default)]
struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    type_mismatches: AtomicU64,
    skipped_writes: AtomicU64,
}

impl AtomicCacheStats {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            type_mismatches: self.type_mismatches.load(Ordering::Relaxed),
            skipped_writes: self.skipped_writes.load(Ordering::Relaxed),
        }
    }
}

// ==========================================
// AnalyticsCache
// ==========================================
pub struct AnalyticsCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
    clock: Arc<dyn Clock>,
    stats: AtomicCacheStats,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            clock,
            stats: AtomicCacheStats::default(),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 读取缓存
    ///
    /// # 返回
    /// - Some: 未过期且类型匹配
    /// - None: 不存在 / 已过期（顺带淘汰）/ 类型不匹配
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        let now = self.clock.now();
        let found = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            entries
                .get(key)
                .map(|entry| (entry.is_stale(now), entry.created_at, entry.payload.clone()))
        };

        let (stale, created_at, payload) = match found {
            Some(found) => found,
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if stale {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            // 仅淘汰同一条目（期间可能已被重新写入）
            if entries.get(key).map_or(false, |e| e.created_at == created_at) {
                entries.remove(key);
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key, "缓存过期");
            return None;
        }

        match payload.downcast::<T>() {
            Ok(value) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Err(_) => {
                self.stats.type_mismatches.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                warn!(key, expected = std::any::type_name::<T>(), "缓存类型不匹配，按未命中处理");
                None
            }
        }
    }

    /// 写入缓存（后写者胜）
    pub fn set<T: Send + Sync + 'static>(&self, key: &str, value: T, ttl: Duration) -> Arc<T> {
        let value = Arc::new(value);
        self.insert(key, value.clone(), ttl);
        value
    }

    /// 仅当期间未发生 clear 时写入
    ///
    /// # 参数
    /// - generation: 计算开始前读取的 `generation()`
    ///
    /// # 返回
    /// - (值, 是否写入)
    pub fn set_if_generation<T: Send + Sync + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
        generation: u64,
    ) -> (Arc<T>, bool) {
        let value = Arc::new(value);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // 代数检查与写入在同一把写锁内，clear 无法插入其间
        if self.generation.load(Ordering::Acquire) != generation {
            self.stats.skipped_writes.fetch_add(1, Ordering::Relaxed);
            debug!(key, "计算期间缓存已失效，结果不写回");
            return (value, false);
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload: value.clone(),
                created_at: self.clock.now(),
                ttl,
            },
        );
        (value, true)
    }

    fn insert(&self, key: &str, payload: Payload, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                created_at: self.clock.now(),
                ttl,
            },
        );
    }

    /// 失效
    ///
    /// # 参数
    /// - prefix: Some 时删除该前缀的所有键；None 时全部清空
    ///
    /// # 返回
    /// - 删除条目数（返回时删除已对后续读取可见）
    pub fn clear(&self, prefix: Option<&str>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::AcqRel);

        let before = entries.len();
        match prefix {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => entries.clear(),
        }
        let removed = before - entries.len();
        debug!(prefix = prefix.unwrap_or("*"), removed, "缓存失效");
        removed
    }

    /// 当前代数
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new()
    }
}
