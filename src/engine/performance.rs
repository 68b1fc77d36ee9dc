// ==========================================
// 供应链洞察 - 业绩汇总
// ==========================================
// 按商品组: 商品数、月均销售额、库存金额、平均周转
// 按销售区域: 时间窗内净销售额、数量、去重客户数
// 缺失维度归入 "未分组" / "未指定区域"
// ==========================================

use crate::domain::product::{GroupPerformance, PerformanceRollup, ProcessedProduct, TerritoryPerformance};
use crate::domain::records::SalesRecord;
use crate::domain::time_range::ResolvedRange;
use std::collections::{BTreeMap, HashSet};

pub const UNGROUPED: &str = "未分组";
pub const UNASSIGNED_TERRITORY: &str = "未指定区域";

pub fn performance_rollup(
    products: &[ProcessedProduct],
    sales: &[SalesRecord],
    range: &ResolvedRange,
) -> PerformanceRollup {
    PerformanceRollup {
        by_group: by_group(products),
        by_territory: by_territory(sales, range),
    }
}

fn by_group(products: &[ProcessedProduct]) -> Vec<GroupPerformance> {
    let mut groups: BTreeMap<&str, Vec<&ProcessedProduct>> = BTreeMap::new();
    for p in products {
        groups.entry(p.group.as_deref().unwrap_or(UNGROUPED)).or_default().push(p);
    }

    let mut rows: Vec<GroupPerformance> = groups
        .into_iter()
        .map(|(group, members)| GroupPerformance {
            group: group.to_string(),
            product_count: members.len(),
            revenue: members.iter().map(|p| p.revenue).sum(),
            stock_value: members.iter().map(|p| p.stock_value()).sum(),
            average_turnover: members.iter().map(|p| p.turnover_rate).sum::<f64>() / members.len() as f64,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows
}

fn by_territory(sales: &[SalesRecord], range: &ResolvedRange) -> Vec<TerritoryPerformance> {
    let mut territories: BTreeMap<&str, (f64, f64, HashSet<&str>)> = BTreeMap::new();
    for sale in sales.iter().filter(|s| range.contains(s.document_date)) {
        let entry = territories
            .entry(sale.territory.as_deref().unwrap_or(UNASSIGNED_TERRITORY))
            .or_default();
        entry.0 += sale.net_value;
        entry.1 += sale.quantity;
        if let Some(customer) = sale.customer.as_deref() {
            entry.2.insert(customer);
        }
    }

    let mut rows: Vec<TerritoryPerformance> = territories
        .into_iter()
        .map(|(territory, (revenue, quantity, customers))| TerritoryPerformance {
            territory: territory.to_string(),
            revenue,
            quantity,
            customer_count: customers.len(),
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sale(territory: Option<&str>, customer: &str, net: f64, on: NaiveDate) -> SalesRecord {
        SalesRecord {
            product_code: "A".to_string(),
            document_date: on,
            document_number: None,
            quantity: 1.0,
            net_value: net,
            gross_value: net,
            discount: 0.0,
            customer: Some(customer.to_string()),
            territory: territory.map(str::to_string),
            salesperson: None,
        }
    }

    #[test]
    fn test_territory_rollup() {
        let range = ResolvedRange {
            start: date(1),
            end: date(15),
        };
        let sales = vec![
            sale(Some("Norte"), "c1", 100.0, date(2)),
            sale(Some("Norte"), "c1", 50.0, date(3)),
            sale(Some("Norte"), "c2", 10.0, date(4)),
            sale(None, "c3", 500.0, date(5)),
            sale(Some("Sur"), "c9", 999.0, date(20)),
        ];
        let rows = by_territory(&sales, &range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].territory, UNASSIGNED_TERRITORY);
        assert_eq!(rows[1].territory, "Norte");
        assert_eq!(rows[1].revenue, 160.0);
        assert_eq!(rows[1].quantity, 3.0);
        assert_eq!(rows[1].customer_count, 2);
    }

    #[test]
    fn test_empty_inputs() {
        let range = ResolvedRange {
            start: date(1),
            end: date(2),
        };
        assert_eq!(performance_rollup(&[], &[], &range), PerformanceRollup::default());
    }
}
