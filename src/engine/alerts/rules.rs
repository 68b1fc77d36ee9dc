// ==========================================
// 供应链洞察 - 十一条告警规则
// ==========================================
// 每条规则纯函数、无状态、与顺序无关
// 同一商品可同时触发多种告警（不跨规则去重）
// ==========================================

use crate::domain::alert::Alert;
use crate::domain::product::ProcessedProduct;
use crate::domain::types::{AlertSeverity, AlertType, StockStatus};
use crate::engine::alerts::config::{
    CashFlowRuleConfig, DiscontinuedRuleConfig, HighValueRuleConfig, LowStockRuleConfig,
    MarginRuleConfig, SeasonalRuleConfig, SlowMovingRuleConfig, SupplierRiskRuleConfig,
};
use crate::engine::alerts::{AlertContext, AlertRule};
use chrono::Months;

/// 告警构造
struct AlertDraft<'a> {
    product: &'a ProcessedProduct,
    alert_type: AlertType,
    severity: AlertSeverity,
    message: String,
    current_value: f64,
    threshold_value: f64,
    actions: &'static [&'static str],
}

impl AlertDraft<'_> {
    fn build(self, ctx: &AlertContext) -> Alert {
        Alert {
            id: Alert::make_id(&self.product.code, self.alert_type),
            alert_type: self.alert_type,
            severity: self.severity,
            product_code: self.product.code.clone(),
            product_name: self.product.name.clone(),
            message: self.message,
            current_value: self.current_value,
            threshold_value: self.threshold_value,
            timestamp: ctx.timestamp,
            acknowledged: false,
            recommended_actions: self.actions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ==========================================
// 1. 缺货
// ==========================================
pub struct OutOfStockRule;

impl AlertRule for OutOfStockRule {
    fn alert_type(&self) -> AlertType {
        AlertType::OutOfStock
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| p.stock_status == StockStatus::OutOfStock)
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::Critical,
                    message: format!("{} 已缺货", p.name),
                    current_value: p.current_stock,
                    threshold_value: 0.0,
                    actions: &["立即下达采购订单", "联系供应商确认最快到货时间", "评估替代商品"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 2. 低库存
// ==========================================
pub struct LowStockRule {
    pub config: LowStockRuleConfig,
}

impl AlertRule for LowStockRule {
    fn alert_type(&self) -> AlertType {
        AlertType::LowStock
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| p.stock_status == StockStatus::LowStock)
            .map(|p| {
                let severity = if p.days_of_supply < self.config.high_below_days {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity,
                    message: format!(
                        "{} 库存 {:.0} 低于最低库存 {:.0}（可用 {:.1} 天）",
                        p.name, p.current_stock, p.minimum_level, p.days_of_supply
                    ),
                    current_value: p.current_stock,
                    threshold_value: p.minimum_level,
                    actions: &["安排补货至最高库存", "检查在途订单"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 3. 超储
// ==========================================
pub struct OverstockRule;

impl AlertRule for OverstockRule {
    fn alert_type(&self) -> AlertType {
        AlertType::Overstock
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| p.stock_status == StockStatus::Overstock)
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::Medium,
                    message: format!(
                        "{} 库存 {:.0} 超过最高库存 {:.0} 的 1.5 倍",
                        p.name, p.current_stock, p.maximum_level
                    ),
                    current_value: p.current_stock,
                    threshold_value: p.maximum_level * 1.5,
                    actions: &["暂停采购", "安排促销或调拨", "复核最高库存设置"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 4. 滞销
// ==========================================
pub struct SlowMovingRule {
    pub config: SlowMovingRuleConfig,
}

impl AlertRule for SlowMovingRule {
    fn alert_type(&self) -> AlertType {
        AlertType::SlowMoving
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| p.turnover_rate < self.config.min_turnover && p.current_stock > 0.0)
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::Low,
                    message: format!("{} 年周转率 {:.2} 偏低", p.name, p.turnover_rate),
                    current_value: p.turnover_rate,
                    threshold_value: self.config.min_turnover,
                    actions: &["评估降价清货", "减少后续采购量"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 5. 毛利压缩
// ==========================================
pub struct MarginCompressionRule {
    pub config: MarginRuleConfig,
}

impl AlertRule for MarginCompressionRule {
    fn alert_type(&self) -> AlertType {
        AlertType::MarginCompression
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        // 无销售额的商品毛利率为 0，不代表毛利压缩
        products
            .iter()
            .filter(|p| p.revenue > 0.0 && p.margin < self.config.min_margin_pct)
            .map(|p| {
                let severity = if p.margin < self.config.high_below_pct {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity,
                    message: format!("{} 毛利率 {:.1}% 低于 {:.1}%", p.name, p.margin, self.config.min_margin_pct),
                    current_value: p.margin,
                    threshold_value: self.config.min_margin_pct,
                    actions: &["复核售价", "与供应商重新议价"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 6. 疑似停产
// ==========================================
pub struct DiscontinuedRule {
    pub config: DiscontinuedRuleConfig,
}

impl AlertRule for DiscontinuedRule {
    fn alert_type(&self) -> AlertType {
        AlertType::Discontinued
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        let months = Months::new(self.config.months_threshold);
        products
            .iter()
            .filter(|p| p.revenue > 0.0)
            .filter(|p| {
                p.last_seen_period
                    .checked_add_months(months)
                    .map_or(false, |cutoff| cutoff < ctx.reference_date)
            })
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::Medium,
                    message: format!(
                        "{} 自 {} 起未出现在库存快照中，但仍有销售",
                        p.name, p.last_seen_period
                    ),
                    current_value: p.revenue,
                    threshold_value: self.config.months_threshold as f64,
                    actions: &["确认商品是否停产", "更新商品主数据"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 7. 高价值商品
// ==========================================
pub struct HighValueRule {
    pub config: HighValueRuleConfig,
}

impl AlertRule for HighValueRule {
    fn alert_type(&self) -> AlertType {
        AlertType::HighValue
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| p.revenue > self.config.min_revenue)
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::from_stock_status(p.stock_status),
                    message: format!(
                        "高价值商品 {} 月销售额 {:.2}，当前状态 {}",
                        p.name, p.revenue, p.stock_status
                    ),
                    current_value: p.revenue,
                    threshold_value: self.config.min_revenue,
                    actions: &["重点监控库存水位", "保证供应连续性"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 8. 交货期风险
// ==========================================
pub struct LeadTimeRiskRule;

impl AlertRule for LeadTimeRiskRule {
    fn alert_type(&self) -> AlertType {
        AlertType::LeadTimeRisk
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| {
                p.stock_status != StockStatus::OutOfStock && p.days_of_supply < p.lead_time_days as f64
            })
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::High,
                    message: format!(
                        "{} 可用 {:.1} 天，短于交货期 {} 天",
                        p.name, p.days_of_supply, p.lead_time_days
                    ),
                    current_value: p.days_of_supply,
                    threshold_value: p.lead_time_days as f64,
                    actions: &["立即下单以覆盖交货期", "考虑加急运输"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 9. 季节性需求
// ==========================================
pub struct SeasonalDemandRule {
    keywords: Vec<String>,
}

impl SeasonalDemandRule {
    pub fn new(config: &SeasonalRuleConfig) -> Self {
        Self {
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn is_seasonal(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }
}

impl AlertRule for SeasonalDemandRule {
    fn alert_type(&self) -> AlertType {
        AlertType::SeasonalDemand
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| matches!(p.stock_status, StockStatus::LowStock | StockStatus::OutOfStock))
            .filter(|p| self.is_seasonal(&p.name))
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::High,
                    message: format!("季节性商品 {} 库存不足（{}）", p.name, p.stock_status),
                    current_value: p.current_stock,
                    threshold_value: p.minimum_level,
                    actions: &["在旺季前补足库存", "参考去年同期销量调整订货"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 10. 供应商风险
// ==========================================
pub struct SupplierRiskRule {
    pub config: SupplierRiskRuleConfig,
}

impl AlertRule for SupplierRiskRule {
    fn alert_type(&self) -> AlertType {
        AlertType::SupplierRisk
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter(|p| {
                p.lead_time_days > self.config.max_lead_time_days && p.stock_status == StockStatus::LowStock
            })
            .map(|p| {
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity: AlertSeverity::Medium,
                    message: format!("{} 交货期 {} 天且库存偏低", p.name, p.lead_time_days),
                    current_value: p.lead_time_days as f64,
                    threshold_value: self.config.max_lead_time_days as f64,
                    actions: &["寻找备选供应商", "提高安全库存"],
                }
                .build(ctx)
            })
            .collect()
    }
}

// ==========================================
// 11. 现金流影响
// ==========================================
pub struct CashFlowImpactRule {
    pub config: CashFlowRuleConfig,
}

impl AlertRule for CashFlowImpactRule {
    fn alert_type(&self) -> AlertType {
        AlertType::CashFlowImpact
    }

    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        products
            .iter()
            .filter_map(|p| {
                let exposure = p.revenue.max(p.inventory_carrying_cost);
                (exposure > self.config.threshold).then_some((p, exposure))
            })
            .map(|(p, exposure)| {
                let severity = if exposure > self.config.high_above {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                AlertDraft {
                    product: p,
                    alert_type: self.alert_type(),
                    severity,
                    message: format!("{} 对现金流影响 {:.2}", p.name, exposure),
                    current_value: exposure,
                    threshold_value: self.config.threshold,
                    actions: &["复核采购预算", "优化库存资金占用"],
                }
                .build(ctx)
            })
            .collect()
    }
}
