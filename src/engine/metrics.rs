// ==========================================
// 供应链洞察 - 单品指标计算
// ==========================================
// 输入: 库存快照（全部历史期间）+ 时间窗内销售 + 时间窗
// 输出: ProcessedProduct（纯函数，不落库）
// 公式:
// - 提前期需求 = 日均销量 × 交货期；安全库存 = 提前期需求 × 0.5
// - 最低库存 = ceil(提前期需求 + 安全库存)，有销量时至少 1
// - 最高库存 = ceil(月均销量 × 2)
// - 周转率 = 月均出库 × 12 / 平均库存（NaN/∞/负数归零）
// - 持有成本 = 平均库存 × 最新平均成本 × 2%
// ==========================================

use crate::domain::product::ProcessedProduct;
use crate::domain::records::{InventoryRecord, SalesRecord};
use crate::domain::time_range::ResolvedRange;
use crate::domain::types::StockStatus;
use crate::engine::cancellation::{CancellationToken, ComputeOutcome};
use crate::engine::lead_time::LeadTimeTable;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// 天数类指标上限
pub const MAX_DAYS: f64 = 999.0;
/// 月持有成本率
pub const MONTHLY_CARRYING_RATE: f64 = 0.02;
/// 安全库存系数
pub const SAFETY_STOCK_FACTOR: f64 = 0.5;
/// 最高库存覆盖月数
pub const MAX_LEVEL_MONTHS: f64 = 2.0;
/// 超储判定倍数
pub const OVERSTOCK_FACTOR: f64 = 1.5;

const DAYS_PER_MONTH: f64 = 30.0;

// ==========================================
// 公式（独立可测）
// ==========================================

/// 向上取整前先消除浮点噪声（28.000000000000004 → 28）
fn ceil_level(value: f64) -> f64 {
    ((value * 1e6).round() / 1e6).ceil()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn minimum_level(monthly_sales: f64, lead_time_days: u32) -> f64 {
    if monthly_sales <= 0.0 {
        return 0.0;
    }
    let lead_time_demand = monthly_sales / DAYS_PER_MONTH * lead_time_days as f64;
    let safety_stock = lead_time_demand * SAFETY_STOCK_FACTOR;
    ceil_level(lead_time_demand + safety_stock).max(1.0)
}

pub fn maximum_level(monthly_sales: f64) -> f64 {
    if monthly_sales <= 0.0 {
        return 0.0;
    }
    ceil_level(monthly_sales * MAX_LEVEL_MONTHS)
}

/// 库存状态（按优先级判定，互斥且完备）
pub fn classify_stock_status(current_stock: f64, minimum_level: f64, maximum_level: f64) -> StockStatus {
    if current_stock <= 0.0 {
        StockStatus::OutOfStock
    } else if current_stock < minimum_level {
        StockStatus::LowStock
    } else if current_stock > maximum_level * OVERSTOCK_FACTOR {
        StockStatus::Overstock
    } else {
        StockStatus::Normal
    }
}

pub fn turnover_rate(monthly_usage: f64, average_inventory: f64) -> f64 {
    let rate = finite_or_zero(monthly_usage * 12.0 / average_inventory);
    rate.max(0.0)
}

pub fn days_in_inventory(turnover_rate: f64) -> f64 {
    if turnover_rate <= 0.0 {
        return MAX_DAYS;
    }
    finite_or_zero(365.0 / turnover_rate).min(MAX_DAYS)
}

pub fn days_of_supply(current_stock: f64, daily_sales: f64) -> f64 {
    if daily_sales <= 0.0 {
        return if current_stock > 0.0 { MAX_DAYS } else { 0.0 };
    }
    (current_stock / daily_sales).clamp(0.0, MAX_DAYS)
}

pub fn gross_margin(revenue: f64, monthly_sales: f64, unit_cost: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    finite_or_zero((revenue - monthly_sales * unit_cost) / revenue * 100.0).clamp(-100.0, 100.0)
}

// ==========================================
// SalesSummary - 单品时间窗内销售汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesSummary {
    pub monthly_sales: f64,
    pub monthly_revenue: f64,
    pub active_months: usize,
}

impl SalesSummary {
    /// 按商品汇总（数量为 0 的记录不参与；分母 = 有销量的自然月数）
    pub fn by_product(sales: &[SalesRecord], range: &ResolvedRange) -> HashMap<String, SalesSummary> {
        let mut totals: HashMap<&str, (f64, f64, HashSet<(i32, u32)>)> = HashMap::new();
        for sale in sales
            .iter()
            .filter(|s| s.counts_toward_average() && range.contains(s.document_date))
        {
            let entry = totals.entry(sale.product_code.as_str()).or_default();
            entry.0 += sale.quantity;
            entry.1 += sale.net_value;
            entry.2.insert((sale.document_date.year(), sale.document_date.month()));
        }

        totals
            .into_iter()
            .map(|(code, (qty, net, months))| {
                let n = months.len().max(1) as f64;
                (
                    code.to_string(),
                    SalesSummary {
                        monthly_sales: (qty / n).max(0.0),
                        monthly_revenue: net / n,
                        active_months: months.len(),
                    },
                )
            })
            .collect()
    }
}

// ==========================================
// MetricsCalculator
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MetricsCalculator {
    lead_times: LeadTimeTable,
}

impl MetricsCalculator {
    pub fn new(lead_times: LeadTimeTable) -> Self {
        Self { lead_times }
    }

    /// 计算全部商品（不可取消）
    pub fn calculate(
        &self,
        inventory: &[InventoryRecord],
        sales: &[SalesRecord],
        range: &ResolvedRange,
    ) -> Vec<ProcessedProduct> {
        match self.calculate_cancellable(inventory, sales, range, &CancellationToken::new()) {
            ComputeOutcome::Completed(products) => products,
            ComputeOutcome::Cancelled => Vec::new(),
        }
    }

    /// 计算全部商品，每个商品之间检查取消令牌
    ///
    /// # 说明
    /// - 库存驱动：只有出现在库存快照中的商品才会输出
    /// - 只使用期间不晚于时间窗结束日的快照
    /// - 输出按商品编码排序
    #[instrument(skip_all, fields(inventory = inventory.len(), sales = sales.len(), range = %range))]
    pub fn calculate_cancellable(
        &self,
        inventory: &[InventoryRecord],
        sales: &[SalesRecord],
        range: &ResolvedRange,
        token: &CancellationToken,
    ) -> ComputeOutcome<Vec<ProcessedProduct>> {
        let mut history: BTreeMap<&str, Vec<&InventoryRecord>> = BTreeMap::new();
        for record in inventory.iter().filter(|r| r.period <= range.end) {
            history.entry(record.product_code.as_str()).or_default().push(record);
        }
        let summaries = SalesSummary::by_product(sales, range);

        let mut products = Vec::with_capacity(history.len());
        for (code, mut periods) in history {
            if token.is_cancelled() {
                debug!(computed = products.len(), "指标计算被取消");
                return ComputeOutcome::Cancelled;
            }
            periods.sort_by_key(|r| r.period);
            let summary = summaries.get(code).copied().unwrap_or_default();
            if let Some(product) = self.build_product(&periods, &summary) {
                products.push(product);
            }
        }

        debug!(products = products.len(), "指标计算完成");
        ComputeOutcome::Completed(products)
    }

    /// 由单品的期间序列（升序）与销售汇总构建指标视图
    pub fn build_product(
        &self,
        periods: &[&InventoryRecord],
        sales: &SalesSummary,
    ) -> Option<ProcessedProduct> {
        let latest = *periods.last()?;
        let n = periods.len() as f64;

        let monthly_usage = periods.iter().map(|r| r.exits).sum::<f64>() / n;
        let monthly_receipts = periods.iter().map(|r| r.entries).sum::<f64>() / n;
        let monthly_balance = periods.iter().map(|r| r.computed_balance()).sum::<f64>() / n;

        let average_inventory = if periods.len() > 1 {
            (latest.previous_balance + latest.current_balance) / 2.0
        } else {
            latest.current_balance
        };

        let turnover = turnover_rate(monthly_usage, average_inventory);
        let lead_time_days = self.lead_times.lookup(latest.group.as_deref());
        let current_stock = latest.current_balance;
        let monthly_sales = sales.monthly_sales;

        let minimum = minimum_level(monthly_sales, lead_time_days);
        let maximum = maximum_level(monthly_sales).max(minimum);

        Some(ProcessedProduct {
            code: latest.product_code.clone(),
            name: latest.name.clone(),
            group: latest.group.clone(),
            subgroup: latest.subgroup.clone(),
            unit_type: latest.unit_type.clone(),
            period: latest.period,
            last_seen_period: last_seen(periods),
            current_stock,
            average_cost: latest.average_cost,
            monthly_sales,
            revenue: sales.monthly_revenue,
            margin: gross_margin(sales.monthly_revenue, monthly_sales, latest.average_cost),
            minimum_level: minimum,
            maximum_level: maximum,
            stock_status: classify_stock_status(current_stock, minimum, maximum),
            lead_time_days,
            turnover_rate: turnover,
            days_in_inventory: days_in_inventory(turnover),
            days_of_supply: days_of_supply(current_stock, monthly_sales / DAYS_PER_MONTH),
            monthly_usage,
            monthly_receipts,
            monthly_balance,
            average_inventory,
            inventory_carrying_cost: finite_or_zero(
                average_inventory * latest.average_cost * MONTHLY_CARRYING_RATE,
            ),
        })
    }
}

fn last_seen(periods: &[&InventoryRecord]) -> NaiveDate {
    periods
        .iter()
        .map(|r| r.period)
        .max()
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inventory(code: &str, period: NaiveDate, prev: f64, entries: f64, exits: f64, current: f64) -> InventoryRecord {
        InventoryRecord {
            product_code: code.to_string(),
            period,
            name: format!("Producto {}", code),
            group: None,
            subgroup: None,
            unit_type: None,
            previous_balance: prev,
            entries,
            exits,
            current_balance: current,
            average_cost: 10.0,
            last_cost: 10.0,
        }
    }

    fn sale(code: &str, on: NaiveDate, qty: f64, net: f64) -> SalesRecord {
        SalesRecord {
            product_code: code.to_string(),
            document_date: on,
            document_number: None,
            quantity: qty,
            net_value: net,
            gross_value: net,
            discount: 0.0,
            customer: None,
            territory: None,
            salesperson: None,
        }
    }

    fn january() -> ResolvedRange {
        ResolvedRange {
            start: date(2024, 1, 1),
            end: date(2024, 1, 31),
        }
    }

    #[test]
    fn test_reorder_levels_scenario() {
        let inv = vec![inventory("A1", date(2024, 1, 31), 100.0, 0.0, 40.0, 60.0)];
        let sales = vec![sale("A1", date(2024, 1, 10), 25.0, 500.0), sale("A1", date(2024, 1, 20), 15.0, 300.0)];
        let products = MetricsCalculator::default().calculate(&inv, &sales, &january());

        let p = &products[0];
        assert_eq!(p.monthly_sales, 40.0);
        assert_eq!(p.lead_time_days, 14);
        assert_eq!(p.minimum_level, 28.0);
        assert_eq!(p.maximum_level, 80.0);
        assert_eq!(p.stock_status, StockStatus::Normal);
        assert_eq!(p.turnover_rate, 8.0);
        assert!((p.inventory_carrying_cost - 12.0).abs() < 1e-9);
        assert!((p.days_of_supply - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_stock_scenario() {
        let inv = vec![inventory("A1", date(2024, 1, 31), 100.0, 0.0, 100.0, 0.0)];
        let sales = vec![sale("A1", date(2024, 1, 10), 40.0, 800.0)];
        let products = MetricsCalculator::default().calculate(&inv, &sales, &january());
        assert_eq!(products[0].stock_status, StockStatus::OutOfStock);
        assert_eq!(products[0].days_of_supply, 0.0);
    }

    #[test]
    fn test_status_classification_is_exhaustive() {
        assert_eq!(classify_stock_status(0.0, 28.0, 80.0), StockStatus::OutOfStock);
        assert_eq!(classify_stock_status(-3.0, 0.0, 0.0), StockStatus::OutOfStock);
        assert_eq!(classify_stock_status(27.0, 28.0, 80.0), StockStatus::LowStock);
        assert_eq!(classify_stock_status(121.0, 28.0, 80.0), StockStatus::Overstock);
        assert_eq!(classify_stock_status(120.0, 28.0, 80.0), StockStatus::Normal);
        // 无销量：任何正库存都超储
        assert_eq!(classify_stock_status(5.0, 0.0, 0.0), StockStatus::Overstock);
    }

    #[test]
    fn test_minimum_level_floor() {
        assert_eq!(minimum_level(0.0, 14), 0.0);
        assert_eq!(minimum_level(0.5, 14), 1.0);
        assert!(minimum_level(0.5, 14) <= maximum_level(0.5));
    }

    #[test]
    fn test_turnover_guards() {
        assert_eq!(turnover_rate(40.0, 0.0), 0.0);
        assert_eq!(turnover_rate(0.0, 0.0), 0.0);
        assert_eq!(days_in_inventory(0.0), MAX_DAYS);
        assert_eq!(days_in_inventory(0.1), MAX_DAYS);
        assert_eq!(days_of_supply(10.0, 0.0), MAX_DAYS);
        assert_eq!(days_of_supply(100_000.0, 0.01), MAX_DAYS);
    }

    #[test]
    fn test_margin_clamped() {
        assert_eq!(gross_margin(0.0, 10.0, 5.0), 0.0);
        assert_eq!(gross_margin(100.0, 10.0, 5.0), 50.0);
        assert_eq!(gross_margin(10.0, 100.0, 50.0), -100.0);
    }

    #[test]
    fn test_multi_period_averages() {
        let inv = vec![
            inventory("B", date(2024, 2, 29), 80.0, 20.0, 30.0, 70.0),
            inventory("B", date(2024, 1, 31), 100.0, 10.0, 30.0, 80.0),
        ];
        let range = ResolvedRange {
            start: date(2024, 1, 1),
            end: date(2024, 2, 29),
        };
        let p = &MetricsCalculator::default().calculate(&inv, &[], &range)[0];
        assert_eq!(p.period, date(2024, 2, 29));
        assert_eq!(p.monthly_usage, 30.0);
        assert_eq!(p.monthly_receipts, 15.0);
        assert_eq!(p.average_inventory, 75.0);
        assert_eq!(p.current_stock, 70.0);
        assert_eq!(p.monthly_sales, 0.0);
        assert_eq!(p.margin, 0.0);
    }

    #[test]
    fn test_zero_quantity_sales_excluded_from_average() {
        let sales = vec![
            sale("A", date(2024, 1, 5), 30.0, 300.0),
            sale("A", date(2024, 2, 5), 0.0, 50.0),
            sale("A", date(2024, 3, 5), 10.0, 100.0),
        ];
        let range = ResolvedRange {
            start: date(2024, 1, 1),
            end: date(2024, 3, 31),
        };
        let summary = SalesSummary::by_product(&sales, &range)["A"];
        assert_eq!(summary.active_months, 2);
        assert_eq!(summary.monthly_sales, 20.0);
        assert_eq!(summary.monthly_revenue, 200.0);
    }

    #[test]
    fn test_snapshots_after_range_end_ignored() {
        let inv = vec![
            inventory("A", date(2024, 1, 31), 10.0, 0.0, 0.0, 10.0),
            inventory("A", date(2024, 3, 31), 10.0, 0.0, 10.0, 0.0),
        ];
        let p = &MetricsCalculator::default().calculate(&inv, &[], &january())[0];
        assert_eq!(p.current_stock, 10.0);
    }

    #[test]
    fn test_cancelled_token_yields_cancelled() {
        let inv = vec![inventory("A", date(2024, 1, 31), 1.0, 0.0, 0.0, 1.0)];
        let token = CancellationToken::new();
        token.cancel();
        let outcome = MetricsCalculator::default().calculate_cancellable(&inv, &[], &january(), &token);
        assert!(outcome.is_cancelled());
    }

    #[test]
    fn test_invariants_hold_for_edge_inputs() {
        let inv = vec![
            inventory("Z", date(2024, 1, 31), 0.0, 0.0, 50.0, 0.0),
            inventory("Y", date(2024, 1, 31), 0.0, 1000.0, 0.0, 1000.0),
        ];
        let sales = vec![sale("Y", date(2024, 1, 3), 0.001, -50.0)];
        for p in MetricsCalculator::default().calculate(&inv, &sales, &january()) {
            assert!(p.turnover_rate >= 0.0);
            assert!(p.days_of_supply <= MAX_DAYS);
            assert!((-100.0..=100.0).contains(&p.margin));
            if p.monthly_sales > 0.0 {
                assert!(p.minimum_level <= p.maximum_level);
            }
        }
    }
}
