// ==========================================
// 供应链洞察 - 缓存层
// ==========================================
// 显式缓存服务对象（持有自己的时钟与存储），进程内构造一次，按引用传递
// ==========================================

pub mod analytics_cache;
pub mod clock;

pub use analytics_cache::{ops, AnalyticsCache, CacheKey, CacheStats, DEFAULT_TTL, ROLLUP_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
