// ==========================================
// 供应链洞察 - 配置层
// ==========================================
// 职责: 分析参数（交货期、告警规则、缓存 TTL）
// 存储: config_kv 表
// ==========================================

pub mod analytics_config_trait;
pub mod config_manager;

pub use analytics_config_trait::{AnalyticsConfigReader, ConfigResult};
pub use config_manager::{config_keys, ConfigManager};
