// ==========================================
// 供应链洞察 - 领域层
// ==========================================
// 职责: 实体与类型定义（无业务逻辑）
// ==========================================

pub mod alert;
pub mod product;
pub mod records;
pub mod time_range;
pub mod types;
pub mod validation;

pub use alert::{Alert, KpiData, ProcurementRecommendation};
pub use product::{
    GroupPerformance, PerformanceRollup, ProcessedProduct, StockEfficiencyData,
    TerritoryPerformance,
};
pub use records::{InventoryRecord, RawRow, SalesRecord};
pub use time_range::{ResolvedRange, TimeRange};
pub use types::{
    AlertSeverity, AlertType, EfficiencyBand, ProcurementAction, RecommendationPriority,
    RecordType, StockStatus,
};
pub use validation::{ValidationIssue, ValidationResult};
