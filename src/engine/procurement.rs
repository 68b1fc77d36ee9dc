// ==========================================
// 供应链洞察 - 补货建议
// ==========================================
// 每个商品至多一条建议:
// - 缺货 → immediate，数量 max(最低库存, 月均销量)
// - 低库存且覆盖天数 < 交货期 → planned，数量 最高库存 − 当前库存
// - 超储且覆盖天数 > 90 → reduce，数量 当前库存 − 最高库存，成本为负（节省的持有成本）
// 输出按优先级降序（同优先级保持输入顺序）
// ==========================================

use crate::domain::alert::ProcurementRecommendation;
use crate::domain::product::ProcessedProduct;
use crate::domain::types::{ProcurementAction, StockStatus};
use crate::engine::metrics::MONTHLY_CARRYING_RATE;

/// 超储削减的覆盖天数门槛
pub const REDUCE_DAYS_OF_SUPPLY: f64 = 90.0;

pub struct ProcurementPlanner;

impl ProcurementPlanner {
    pub fn recommend(products: &[ProcessedProduct]) -> Vec<ProcurementRecommendation> {
        let mut recommendations: Vec<ProcurementRecommendation> =
            products.iter().filter_map(Self::recommend_one).collect();
        // sort_by 是稳定排序
        recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
        recommendations
    }

    pub fn recommend_one(p: &ProcessedProduct) -> Option<ProcurementRecommendation> {
        let (action, quantity, reason) = match p.stock_status {
            StockStatus::OutOfStock => (
                ProcurementAction::Immediate,
                p.minimum_level.max(p.monthly_sales),
                "缺货，需立即补货".to_string(),
            ),
            StockStatus::LowStock if p.days_of_supply < p.lead_time_days as f64 => (
                ProcurementAction::Planned,
                p.maximum_level - p.current_stock,
                format!(
                    "可用 {:.1} 天，短于交货期 {} 天",
                    p.days_of_supply, p.lead_time_days
                ),
            ),
            StockStatus::Overstock if p.days_of_supply > REDUCE_DAYS_OF_SUPPLY => (
                ProcurementAction::Reduce,
                p.current_stock - p.maximum_level,
                format!("超储，可用 {:.0} 天", p.days_of_supply),
            ),
            _ => return None,
        };

        let quantity = quantity.max(0.0);
        let estimated_cost = match action {
            ProcurementAction::Reduce => -(quantity * p.average_cost * MONTHLY_CARRYING_RATE),
            _ => quantity * p.average_cost,
        };

        Some(ProcurementRecommendation {
            product_code: p.code.clone(),
            product_name: p.name.clone(),
            action,
            priority: action.priority(),
            quantity,
            estimated_cost,
            current_stock: p.current_stock,
            days_of_supply: p.days_of_supply,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecommendationPriority;
    use chrono::NaiveDate;

    fn product(code: &str, status: StockStatus, stock: f64, dos: f64) -> ProcessedProduct {
        let period = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        ProcessedProduct {
            code: code.to_string(),
            name: code.to_string(),
            group: None,
            subgroup: None,
            unit_type: None,
            period,
            last_seen_period: period,
            current_stock: stock,
            average_cost: 10.0,
            monthly_sales: 40.0,
            revenue: 800.0,
            margin: 50.0,
            minimum_level: 28.0,
            maximum_level: 80.0,
            stock_status: status,
            lead_time_days: 14,
            turnover_rate: 8.0,
            days_in_inventory: 45.0,
            days_of_supply: dos,
            monthly_usage: 40.0,
            monthly_receipts: 0.0,
            monthly_balance: stock,
            average_inventory: stock,
            inventory_carrying_cost: 0.0,
        }
    }

    #[test]
    fn test_actions_and_quantities() {
        let recs = ProcurementPlanner::recommend(&[
            product("R", StockStatus::Overstock, 200.0, 150.0),
            product("P", StockStatus::LowStock, 10.0, 7.5),
            product("N", StockStatus::Normal, 60.0, 45.0),
            product("I", StockStatus::OutOfStock, 0.0, 0.0),
        ]);

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].product_code, "I");
        assert_eq!(recs[0].action, ProcurementAction::Immediate);
        assert_eq!(recs[0].quantity, 40.0);
        assert_eq!(recs[0].estimated_cost, 400.0);

        assert_eq!(recs[1].product_code, "P");
        assert_eq!(recs[1].priority, RecommendationPriority::Medium);
        assert_eq!(recs[1].quantity, 70.0);

        assert_eq!(recs[2].product_code, "R");
        assert_eq!(recs[2].quantity, 120.0);
        assert!((recs[2].estimated_cost + 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_stock_with_enough_cover_is_skipped() {
        assert!(ProcurementPlanner::recommend_one(&product("P", StockStatus::LowStock, 20.0, 15.0)).is_none());
        assert!(ProcurementPlanner::recommend_one(&product("R", StockStatus::Overstock, 130.0, 90.0)).is_none());
    }
}
