// ==========================================
// 供应链洞察 - 领域类型定义
// ==========================================
// 库存状态 / 告警等级 / 告警类型 / 补货动作等枚举
// 序列化格式与展示层约定保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 库存状态 (Stock Status)
// ==========================================
// 判定顺序: 缺货 → 低库存 → 超储 → 正常（互斥且完备）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Normal,     // 正常
    LowStock,   // 低于最低库存
    OutOfStock, // 缺货
    Overstock,  // 超储
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Normal => write!(f, "NORMAL"),
            StockStatus::LowStock => write!(f, "LOW_STOCK"),
            StockStatus::OutOfStock => write!(f, "OUT_OF_STOCK"),
            StockStatus::Overstock => write!(f, "OVERSTOCK"),
        }
    }
}

// ==========================================
// 告警严重度 (Alert Severity)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// 是否计入 KPI 的关键告警数（High 及以上）
    pub fn is_critical_for_kpi(&self) -> bool {
        *self >= AlertSeverity::High
    }

    /// 高价值商品告警的严重度跟随库存状态
    pub fn from_stock_status(status: StockStatus) -> Self {
        match status {
            StockStatus::OutOfStock => AlertSeverity::Critical,
            StockStatus::LowStock => AlertSeverity::High,
            StockStatus::Overstock => AlertSeverity::Medium,
            StockStatus::Normal => AlertSeverity::Low,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "low"),
            AlertSeverity::Medium => write!(f, "medium"),
            AlertSeverity::High => write!(f, "high"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// 告警类型 (Alert Type)
// ==========================================
// 十一条独立规则各对应一种类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    OutOfStock,
    LowStock,
    Overstock,
    SlowMoving,
    MarginCompression,
    Discontinued,
    HighValue,
    LeadTimeRisk,
    SeasonalDemand,
    SupplierRisk,
    CashFlowImpact,
}

impl AlertType {
    /// 全部告警类型（规则引擎注册顺序）
    pub const ALL: [AlertType; 11] = [
        AlertType::OutOfStock,
        AlertType::LowStock,
        AlertType::Overstock,
        AlertType::SlowMoving,
        AlertType::MarginCompression,
        AlertType::Discontinued,
        AlertType::HighValue,
        AlertType::LeadTimeRisk,
        AlertType::SeasonalDemand,
        AlertType::SupplierRisk,
        AlertType::CashFlowImpact,
    ];

    /// 用于告警 ID 拼接的短标识
    pub fn as_slug(&self) -> &'static str {
        match self {
            AlertType::OutOfStock => "out_of_stock",
            AlertType::LowStock => "low_stock",
            AlertType::Overstock => "overstock",
            AlertType::SlowMoving => "slow_moving",
            AlertType::MarginCompression => "margin_compression",
            AlertType::Discontinued => "discontinued",
            AlertType::HighValue => "high_value",
            AlertType::LeadTimeRisk => "lead_time_risk",
            AlertType::SeasonalDemand => "seasonal_demand",
            AlertType::SupplierRisk => "supplier_risk",
            AlertType::CashFlowImpact => "cash_flow_impact",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

// ==========================================
// 补货动作 (Procurement Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcurementAction {
    Immediate, // 立即补货（缺货）
    Planned,   // 计划补货（低库存且覆盖天数不足提前期）
    Reduce,    // 削减库存（超储且覆盖天数 > 90）
}

impl ProcurementAction {
    pub fn priority(&self) -> RecommendationPriority {
        match self {
            ProcurementAction::Immediate => RecommendationPriority::High,
            ProcurementAction::Planned => RecommendationPriority::Medium,
            ProcurementAction::Reduce => RecommendationPriority::Low,
        }
    }
}

// ==========================================
// 建议优先级
// ==========================================
// 顺序: Low < Medium < High（输出按降序排列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

// ==========================================
// 库存效率分档
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EfficiencyBand {
    Excellent, // 年周转 >= 12
    Good,      // >= 6
    Fair,      // >= 2
    Poor,
}

impl EfficiencyBand {
    pub fn from_turnover(turnover_rate: f64) -> Self {
        if turnover_rate >= 12.0 {
            EfficiencyBand::Excellent
        } else if turnover_rate >= 6.0 {
            EfficiencyBand::Good
        } else if turnover_rate >= 2.0 {
            EfficiencyBand::Fair
        } else {
            EfficiencyBand::Poor
        }
    }
}

// ==========================================
// 记录类型（导入批次）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Inventory,
    Sales,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Inventory => write!(f, "INVENTORY"),
            RecordType::Sales => write!(f, "SALES"),
        }
    }
}
