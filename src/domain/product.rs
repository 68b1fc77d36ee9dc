// ==========================================
// 供应链洞察 - 商品派生视图
// ==========================================
// ProcessedProduct: 库存 + 销售 + 时间窗 的纯计算结果，不落库
// StockEfficiencyData / PerformanceRollup: 面向展示层的汇总
// ==========================================

use crate::domain::types::{EfficiencyBand, StockStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProcessedProduct - 单品指标视图
// ==========================================
// 不变量:
// - turnover_rate >= 0（NaN/∞ 归零）
// - days_of_supply <= 999
// - margin ∈ [-100, 100]
// - monthly_sales > 0 时 minimum_level <= maximum_level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedProduct {
    // ===== 标识 =====
    pub code: String,
    pub name: String,
    pub group: Option<String>,
    pub subgroup: Option<String>,
    pub unit_type: Option<String>,
    pub period: NaiveDate,           // 最新快照期间
    pub last_seen_period: NaiveDate, // 最后一次出现在库存快照中的期间

    // ===== 库存与成本 =====
    pub current_stock: f64,
    pub average_cost: f64,

    // ===== 销售 =====
    pub monthly_sales: f64, // 时间窗内月均销量
    pub revenue: f64,       // 时间窗内月均净销售额
    pub margin: f64,        // 毛利率（%）

    // ===== 补货水位 =====
    pub minimum_level: f64,
    pub maximum_level: f64,
    pub stock_status: StockStatus,
    pub lead_time_days: u32,

    // ===== 周转 =====
    pub turnover_rate: f64,
    pub days_in_inventory: f64,
    pub days_of_supply: f64,
    pub monthly_usage: f64,
    pub monthly_receipts: f64,
    pub monthly_balance: f64,
    pub average_inventory: f64,
    pub inventory_carrying_cost: f64,
}

impl ProcessedProduct {
    /// 库存金额（当前库存 × 平均成本）
    pub fn stock_value(&self) -> f64 {
        self.current_stock * self.average_cost
    }

    /// 日均销量
    pub fn daily_sales(&self) -> f64 {
        self.monthly_sales / 30.0
    }
}

// ==========================================
// StockEfficiencyData - 库存效率
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEfficiencyData {
    pub code: String,
    pub name: String,
    pub group: Option<String>,
    pub turnover_rate: f64,
    pub days_in_inventory: f64,
    pub days_of_supply: f64,
    pub stock_value: f64,
    pub carrying_cost: f64,
    pub efficiency: EfficiencyBand,
}

// ==========================================
// PerformanceRollup - 业绩汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceRollup {
    pub by_group: Vec<GroupPerformance>,
    pub by_territory: Vec<TerritoryPerformance>,
}

/// 按商品组汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPerformance {
    pub group: String,
    pub product_count: usize,
    pub revenue: f64,
    pub stock_value: f64,
    pub average_turnover: f64,
}

/// 按销售区域汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryPerformance {
    pub territory: String,
    pub revenue: f64,
    pub quantity: f64,
    pub customer_count: usize,
}
