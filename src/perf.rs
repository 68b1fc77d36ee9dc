// ==========================================
// 供应链洞察 - 性能统计
// ==========================================
// PerfGuard: drop 时记录 op / elapsed_ms / items（target = "perf"）
// 超过慢操作阈值时额外输出 warn
// 阈值: SUPPLY_CHAIN_INSIGHTS_SLOW_OP_MS（默认 debug 500ms，release 2000ms）
// ==========================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

static SLOW_OP_THRESHOLD_MS: OnceLock<u64> = OnceLock::new();

fn slow_op_threshold_ms() -> u64 {
    *SLOW_OP_THRESHOLD_MS.get_or_init(|| {
        std::env::var("SUPPLY_CHAIN_INSIGHTS_SLOW_OP_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 500 } else { 2_000 })
    })
}

/// 性能统计 Guard
///
/// 使用方式：
/// ```ignore
/// let perf = supply_chain_insights::perf::PerfGuard::new("ingest_inventory");
/// // do work...
/// perf.set_items(records.len());
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    items: AtomicU64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            items: AtomicU64::new(0),
        }
    }

    /// 记录本次处理的条目数
    pub fn set_items(&self, items: usize) {
        self.items.store(items as u64, Ordering::Relaxed);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        let items = self.items.load(Ordering::Relaxed);

        tracing::info!(target: "perf", op = self.op, elapsed_ms, items, "done");

        if elapsed_ms >= slow_op_threshold_ms() {
            tracing::warn!(target: "perf", op = self.op, elapsed_ms, items, "slow op");
        }
    }
}
