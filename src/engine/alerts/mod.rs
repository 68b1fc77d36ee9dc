// ==========================================
// 供应链洞察 - 告警规则引擎
// ==========================================
// 职责: 注册规则、逐条评估、合并输出
// 输出: 各规则结果的并集（按规则注册顺序，规则内按商品顺序）
// ==========================================

pub mod config;
pub mod rules;

use crate::domain::alert::Alert;
use crate::domain::product::ProcessedProduct;
use crate::domain::types::AlertType;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

pub use config::AlertRulesConfig;
use rules::*;

/// 一次评估的上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertContext {
    /// 告警时间戳
    pub timestamp: DateTime<Utc>,
    /// 停产判定的参照日（通常为时间窗结束日）
    pub reference_date: NaiveDate,
}

// ==========================================
// AlertRule Trait
// ==========================================
pub trait AlertRule: Send + Sync {
    fn alert_type(&self) -> AlertType;

    /// 检查全部商品，从不失败（无输入即无告警）
    fn check(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert>;
}

// ==========================================
// AlertEngine
// ==========================================
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertEngine {
    /// 按配置注册已启用的规则
    pub fn from_config(config: &AlertRulesConfig) -> Self {
        let mut rules: Vec<Box<dyn AlertRule>> = Vec::with_capacity(AlertType::ALL.len());

        if config.out_of_stock.enabled {
            rules.push(Box::new(OutOfStockRule));
        }
        if config.low_stock.enabled {
            rules.push(Box::new(LowStockRule {
                config: config.low_stock,
            }));
        }
        if config.overstock.enabled {
            rules.push(Box::new(OverstockRule));
        }
        if config.slow_moving.enabled {
            rules.push(Box::new(SlowMovingRule {
                config: config.slow_moving,
            }));
        }
        if config.margin_compression.enabled {
            rules.push(Box::new(MarginCompressionRule {
                config: config.margin_compression,
            }));
        }
        if config.discontinued.enabled {
            rules.push(Box::new(DiscontinuedRule {
                config: config.discontinued,
            }));
        }
        if config.high_value.enabled {
            rules.push(Box::new(HighValueRule {
                config: config.high_value,
            }));
        }
        if config.lead_time_risk.enabled {
            rules.push(Box::new(LeadTimeRiskRule));
        }
        if config.seasonal_demand.enabled {
            rules.push(Box::new(SeasonalDemandRule::new(&config.seasonal_demand)));
        }
        if config.supplier_risk.enabled {
            rules.push(Box::new(SupplierRiskRule {
                config: config.supplier_risk,
            }));
        }
        if config.cash_flow_impact.enabled {
            rules.push(Box::new(CashFlowImpactRule {
                config: config.cash_flow_impact,
            }));
        }

        Self { rules }
    }

    pub fn with_rules(rules: Vec<Box<dyn AlertRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_types(&self) -> Vec<AlertType> {
        self.rules.iter().map(|r| r.alert_type()).collect()
    }

    pub fn evaluate(&self, products: &[ProcessedProduct], ctx: &AlertContext) -> Vec<Alert> {
        let alerts: Vec<Alert> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(products, ctx))
            .collect();
        debug!(products = products.len(), rules = self.rules.len(), alerts = alerts.len(), "告警评估完成");
        alerts
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::from_config(&AlertRulesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AlertSeverity, StockStatus};
    use chrono::TimeZone;

    fn ctx() -> AlertContext {
        AlertContext {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap(),
            reference_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        }
    }

    fn product(code: &str, status: StockStatus) -> ProcessedProduct {
        ProcessedProduct {
            code: code.to_string(),
            name: format!("Producto {}", code),
            group: None,
            subgroup: None,
            unit_type: None,
            period: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            last_seen_period: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            current_stock: 60.0,
            average_cost: 10.0,
            monthly_sales: 40.0,
            revenue: 800.0,
            margin: 50.0,
            minimum_level: 28.0,
            maximum_level: 80.0,
            stock_status: status,
            lead_time_days: 14,
            turnover_rate: 8.0,
            days_in_inventory: 45.6,
            days_of_supply: 45.0,
            monthly_usage: 40.0,
            monthly_receipts: 0.0,
            monthly_balance: 60.0,
            average_inventory: 60.0,
            inventory_carrying_cost: 12.0,
        }
    }

    fn types_for(alerts: &[Alert], code: &str) -> Vec<AlertType> {
        alerts
            .iter()
            .filter(|a| a.product_code == code)
            .map(|a| a.alert_type)
            .collect()
    }

    #[test]
    fn test_healthy_product_raises_nothing() {
        let alerts = AlertEngine::default().evaluate(&[product("A1", StockStatus::Normal)], &ctx());
        assert!(alerts.is_empty(), "unexpected: {:?}", alerts);
    }

    #[test]
    fn test_out_of_stock_is_critical_with_actions() {
        let mut p = product("A1", StockStatus::OutOfStock);
        p.current_stock = 0.0;
        p.days_of_supply = 0.0;
        let alerts = AlertEngine::default().evaluate(&[p], &ctx());

        let oos: Vec<&Alert> = alerts.iter().filter(|a| a.alert_type == AlertType::OutOfStock).collect();
        assert_eq!(oos.len(), 1);
        assert_eq!(oos[0].severity, AlertSeverity::Critical);
        assert!(!oos[0].recommended_actions.is_empty());
        assert_eq!(oos[0].id, "A1-out_of_stock");
        // 缺货不再重复报交货期风险
        assert!(!types_for(&alerts, "A1").contains(&AlertType::LeadTimeRisk));
    }

    #[test]
    fn test_low_stock_severity_by_days_of_supply() {
        let mut urgent = product("U", StockStatus::LowStock);
        urgent.days_of_supply = 5.0;
        let mut later = product("L", StockStatus::LowStock);
        later.days_of_supply = 20.0;
        let alerts = AlertEngine::default().evaluate(&[urgent, later], &ctx());

        let severity = |code: &str| {
            alerts
                .iter()
                .find(|a| a.product_code == code && a.alert_type == AlertType::LowStock)
                .map(|a| a.severity)
        };
        assert_eq!(severity("U"), Some(AlertSeverity::High));
        assert_eq!(severity("L"), Some(AlertSeverity::Medium));
        assert!(types_for(&alerts, "U").contains(&AlertType::LeadTimeRisk));
        assert!(!types_for(&alerts, "L").contains(&AlertType::LeadTimeRisk));
    }

    #[test]
    fn test_product_can_trigger_multiple_rules() {
        let mut p = product("S", StockStatus::LowStock);
        p.name = "Arbol de Navidad".to_string();
        p.lead_time_days = 35;
        p.days_of_supply = 10.0;
        p.revenue = 12_000.0;
        let alerts = AlertEngine::default().evaluate(&[p], &ctx());
        let types = types_for(&alerts, "S");

        for expected in [
            AlertType::LowStock,
            AlertType::LeadTimeRisk,
            AlertType::SeasonalDemand,
            AlertType::SupplierRisk,
            AlertType::HighValue,
            AlertType::CashFlowImpact,
        ] {
            assert!(types.contains(&expected), "missing {:?} in {:?}", expected, types);
        }
        let high_value = alerts.iter().find(|a| a.alert_type == AlertType::HighValue).unwrap();
        assert_eq!(high_value.severity, AlertSeverity::High);
        let cash = alerts.iter().find(|a| a.alert_type == AlertType::CashFlowImpact).unwrap();
        assert_eq!(cash.severity, AlertSeverity::High);
    }

    #[test]
    fn test_margin_compression_thresholds() {
        let mut thin = product("T", StockStatus::Normal);
        thin.margin = 7.0;
        let mut negative = product("N", StockStatus::Normal);
        negative.margin = -20.0;
        let mut unsold = product("Z", StockStatus::Normal);
        unsold.revenue = 0.0;
        unsold.margin = 0.0;
        let alerts = AlertEngine::default().evaluate(&[thin, negative, unsold], &ctx());

        let margin: Vec<(&str, AlertSeverity)> = alerts
            .iter()
            .filter(|a| a.alert_type == AlertType::MarginCompression)
            .map(|a| (a.product_code.as_str(), a.severity))
            .collect();
        assert_eq!(margin, vec![("T", AlertSeverity::Medium), ("N", AlertSeverity::High)]);
    }

    #[test]
    fn test_slow_moving_and_discontinued() {
        let mut slow = product("S", StockStatus::Normal);
        slow.turnover_rate = 1.0;
        slow.last_seen_period = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut empty_slow = product("E", StockStatus::OutOfStock);
        empty_slow.turnover_rate = 0.0;
        empty_slow.current_stock = 0.0;
        let alerts = AlertEngine::default().evaluate(&[slow, empty_slow], &ctx());

        assert!(types_for(&alerts, "S").contains(&AlertType::SlowMoving));
        assert!(types_for(&alerts, "S").contains(&AlertType::Discontinued));
        assert!(!types_for(&alerts, "E").contains(&AlertType::SlowMoving));
    }

    #[test]
    fn test_disabled_rule_is_not_registered() {
        let mut config = AlertRulesConfig::default();
        config.overstock.enabled = false;
        let engine = AlertEngine::from_config(&config);
        assert_eq!(engine.rule_types().len(), 10);
        assert!(engine
            .evaluate(&[product("O", StockStatus::Overstock)], &ctx())
            .iter()
            .all(|a| a.alert_type != AlertType::Overstock));
    }

    #[test]
    fn test_all_eleven_rules_registered_by_default() {
        assert_eq!(AlertEngine::default().rule_types(), AlertType::ALL.to_vec());
    }
}
