// ==========================================
// 供应链洞察 - 库存效率
// ==========================================

use crate::domain::product::{ProcessedProduct, StockEfficiencyData};
use crate::domain::types::EfficiencyBand;

/// 按持有成本降序输出（持有成本相同按编码）
pub fn stock_efficiency(products: &[ProcessedProduct]) -> Vec<StockEfficiencyData> {
    let mut rows: Vec<StockEfficiencyData> = products
        .iter()
        .map(|p| StockEfficiencyData {
            code: p.code.clone(),
            name: p.name.clone(),
            group: p.group.clone(),
            turnover_rate: p.turnover_rate,
            days_in_inventory: p.days_in_inventory,
            days_of_supply: p.days_of_supply,
            stock_value: p.stock_value(),
            carrying_cost: p.inventory_carrying_cost,
            efficiency: EfficiencyBand::from_turnover(p.turnover_rate),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.carrying_cost
            .total_cmp(&a.carrying_cost)
            .then_with(|| a.code.cmp(&b.code))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::StockStatus;
    use chrono::NaiveDate;

    fn product(code: &str, turnover: f64, carrying: f64) -> ProcessedProduct {
        let period = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        ProcessedProduct {
            code: code.to_string(),
            name: code.to_string(),
            group: Some("G".to_string()),
            subgroup: None,
            unit_type: None,
            period,
            last_seen_period: period,
            current_stock: 10.0,
            average_cost: 3.0,
            monthly_sales: 0.0,
            revenue: 0.0,
            margin: 0.0,
            minimum_level: 0.0,
            maximum_level: 0.0,
            stock_status: StockStatus::Overstock,
            lead_time_days: 14,
            turnover_rate: turnover,
            days_in_inventory: 0.0,
            days_of_supply: 999.0,
            monthly_usage: 0.0,
            monthly_receipts: 0.0,
            monthly_balance: 0.0,
            average_inventory: 10.0,
            inventory_carrying_cost: carrying,
        }
    }

    #[test]
    fn test_sorted_by_carrying_cost_with_bands() {
        let rows = stock_efficiency(&[product("A", 1.0, 5.0), product("B", 13.0, 50.0), product("C", 6.0, 5.0)]);
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A", "C"]);
        assert_eq!(rows[0].efficiency, EfficiencyBand::Excellent);
        assert_eq!(rows[1].efficiency, EfficiencyBand::Poor);
        assert_eq!(rows[2].efficiency, EfficiencyBand::Good);
        assert_eq!(rows[0].stock_value, 30.0);
    }
}
