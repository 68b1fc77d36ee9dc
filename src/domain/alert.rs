// ==========================================
// 供应链洞察 - 告警 / KPI / 补货建议
// ==========================================
// 每次评估临时生成，核心层不修改（确认标记由展示层持有）
// ==========================================

use crate::domain::types::{AlertSeverity, AlertType, ProcurementAction, RecommendationPriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Alert - 规则告警
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String, // {product_code}-{alert_type}
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub product_code: String,
    pub product_name: String,
    pub message: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    pub recommended_actions: Vec<String>,
}

impl Alert {
    /// 告警 ID 由商品编码与规则类型派生（同一商品同一规则稳定）
    pub fn make_id(product_code: &str, alert_type: AlertType) -> String {
        format!("{}-{}", product_code, alert_type.as_slug())
    }
}

// ==========================================
// KpiData - 组合层指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiData {
    pub total_products: usize,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub over_stock: usize,
    pub normal_stock: usize,
    pub total_revenue: f64,
    pub avg_gross_margin: f64,
    pub supply_chain_health_score: f64, // [0, 100]
    pub critical_alerts: usize,
}

impl KpiData {
    /// 展示用整数健康分
    pub fn rounded_health_score(&self) -> u32 {
        self.supply_chain_health_score.round().clamp(0.0, 100.0) as u32
    }
}

// ==========================================
// ProcurementRecommendation - 补货建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRecommendation {
    pub product_code: String,
    pub product_name: String,
    pub action: ProcurementAction,
    pub priority: RecommendationPriority,
    pub quantity: f64,
    pub estimated_cost: f64, // reduce 为负值（节省的持有成本）
    pub current_stock: f64,
    pub days_of_supply: f64,
    pub reason: String,
}
