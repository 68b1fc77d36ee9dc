// ==========================================
// 供应链洞察 - 引擎层
// ==========================================
// 职责: 指标计算、预警规则、KPI 汇总、补货建议
// 红线: Engine 不拼 SQL，只处理内存中的记录；所有预警/建议必须输出原因
// ==========================================

pub mod alerts;
pub mod cancellation;
pub mod efficiency;
pub mod kpi;
pub mod lead_time;
pub mod metrics;
pub mod performance;
pub mod procurement;

// 重导出核心引擎
pub use alerts::{AlertContext, AlertEngine, AlertRule, AlertRulesConfig};
pub use cancellation::{CancellationToken, ComputeOutcome, RecomputeRegistry};
pub use efficiency::stock_efficiency;
pub use kpi::{health_score, KpiAggregator};
pub use lead_time::{LeadTimeTable, DEFAULT_LEAD_TIME_DAYS};
pub use metrics::{MetricsCalculator, SalesSummary};
pub use performance::performance_rollup;
pub use procurement::ProcurementPlanner;
