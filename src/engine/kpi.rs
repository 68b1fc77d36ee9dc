// ==========================================
// 供应链洞察 - KPI 汇总
// ==========================================
// 健康分 = clamp(正常占比×100 − 超储占比×30 + 毛利奖励, 0, 100)
// 毛利奖励: 平均毛利率 > 20% 时 +10（平均只统计有销售额的商品）
// ==========================================

use crate::domain::alert::{Alert, KpiData};
use crate::domain::product::ProcessedProduct;
use crate::domain::types::StockStatus;

const OVERSTOCK_PENALTY_WEIGHT: f64 = 30.0;
const MARGIN_BONUS_THRESHOLD: f64 = 20.0;
const MARGIN_BONUS: f64 = 10.0;

pub struct KpiAggregator;

impl KpiAggregator {
    /// 从商品与告警快照汇总 KPI（空输入返回全零）
    pub fn aggregate(products: &[ProcessedProduct], alerts: &[Alert]) -> KpiData {
        let total = products.len();
        let count = |status: StockStatus| products.iter().filter(|p| p.stock_status == status).count();

        let out_of_stock = count(StockStatus::OutOfStock);
        let low_stock = count(StockStatus::LowStock);
        let over_stock = count(StockStatus::Overstock);
        let normal_stock = count(StockStatus::Normal);

        let selling: Vec<&ProcessedProduct> = products.iter().filter(|p| p.revenue > 0.0).collect();
        let avg_gross_margin = if selling.is_empty() {
            0.0
        } else {
            selling.iter().map(|p| p.margin).sum::<f64>() / selling.len() as f64
        };

        KpiData {
            total_products: total,
            out_of_stock,
            low_stock,
            over_stock,
            normal_stock,
            total_revenue: products.iter().map(|p| p.revenue).sum(),
            avg_gross_margin,
            supply_chain_health_score: health_score(total, normal_stock, over_stock, avg_gross_margin),
            critical_alerts: alerts
                .iter()
                .filter(|a| a.severity.is_critical_for_kpi())
                .count(),
        }
    }
}

pub fn health_score(total: usize, normal: usize, overstock: usize, avg_margin: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let stock_health_pct = normal as f64 / total * 100.0;
    let overstock_penalty = overstock as f64 / total * OVERSTOCK_PENALTY_WEIGHT;
    let margin_bonus = if avg_margin > MARGIN_BONUS_THRESHOLD {
        MARGIN_BONUS
    } else {
        0.0
    };
    (stock_health_pct - overstock_penalty + margin_bonus).clamp(0.0, 100.0)
}
