// ==========================================
// 供应链洞察 - 核心库
// ==========================================
// 流程: 原始行 → 校验 → 记录 → 单品指标 → {KPI, 告警, 补货建议} → 缓存
// 技术栈: Rust + SQLite + tokio
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 指标与规则
pub mod engine;

// 导入层 - 校验与处理
pub mod importer;

// 缓存层 - 分析结果 TTL 缓存
pub mod cache;

// 配置层 - 分析参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// API 层 - 调用方门面
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertSeverity, AlertType, EfficiencyBand, ProcurementAction, RecommendationPriority,
    RecordType, StockStatus,
};

// 领域实体
pub use domain::{
    Alert, InventoryRecord, KpiData, PerformanceRollup, ProcessedProduct,
    ProcurementRecommendation, RawRow, SalesRecord, StockEfficiencyData, TimeRange,
    ValidationResult,
};

// 引擎
pub use engine::{
    AlertEngine, KpiAggregator, MetricsCalculator, ProcurementPlanner, RecomputeRegistry,
};

// 导入与 API
pub use api::{AnalyticsApi, ApiError, ApiResult};
pub use cache::AnalyticsCache;
pub use importer::{IngestReport, IngestService};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称（同时用作数据目录名）
pub const APP_NAME: &str = "supply-chain-insights";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.contains(' '));
    }
}
