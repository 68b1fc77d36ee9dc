// ==========================================
// 供应链洞察 - 告警规则配置
// ==========================================
// 每条规则一个强类型参数结构，缺省字段取默认值
// 存储: config_kv.alert_rules（JSON）
// ==========================================

use serde::{Deserialize, Serialize};

/// 仅有开关的规则
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleRuleConfig {
    pub enabled: bool,
}

impl Default for ToggleRuleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowStockRuleConfig {
    pub enabled: bool,
    /// 覆盖天数低于该值时升为 high
    pub high_below_days: f64,
}

impl Default for LowStockRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            high_below_days: 7.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowMovingRuleConfig {
    pub enabled: bool,
    pub min_turnover: f64,
}

impl Default for SlowMovingRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_turnover: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginRuleConfig {
    pub enabled: bool,
    /// 毛利率（%）低于该值告警
    pub min_margin_pct: f64,
    /// 低于该值升为 high
    pub high_below_pct: f64,
}

impl Default for MarginRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_margin_pct: 10.0,
            high_below_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscontinuedRuleConfig {
    pub enabled: bool,
    pub months_threshold: u32,
}

impl Default for DiscontinuedRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            months_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighValueRuleConfig {
    pub enabled: bool,
    pub min_revenue: f64,
}

impl Default for HighValueRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_revenue: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalRuleConfig {
    pub enabled: bool,
    /// 商品名称关键字（不区分大小写）
    pub keywords: Vec<String>,
}

pub const DEFAULT_SEASONAL_KEYWORDS: &[&str] = &[
    "navidad",
    "christmas",
    "verano",
    "invierno",
    "escolar",
    "halloween",
    "summer",
    "winter",
    "pascua",
];

impl Default for SeasonalRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keywords: DEFAULT_SEASONAL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierRiskRuleConfig {
    pub enabled: bool,
    pub max_lead_time_days: u32,
}

impl Default for SupplierRiskRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_lead_time_days: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlowRuleConfig {
    pub enabled: bool,
    /// 月销售额或持有成本超过该值告警
    pub threshold: f64,
    /// 超过该值升为 high
    pub high_above: f64,
}

impl Default for CashFlowRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 5_000.0,
            high_above: 10_000.0,
        }
    }
}

// ==========================================
// AlertRulesConfig - 全部规则配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRulesConfig {
    pub out_of_stock: ToggleRuleConfig,
    pub low_stock: LowStockRuleConfig,
    pub overstock: ToggleRuleConfig,
    pub slow_moving: SlowMovingRuleConfig,
    pub margin_compression: MarginRuleConfig,
    pub discontinued: DiscontinuedRuleConfig,
    pub high_value: HighValueRuleConfig,
    pub lead_time_risk: ToggleRuleConfig,
    pub seasonal_demand: SeasonalRuleConfig,
    pub supplier_risk: SupplierRiskRuleConfig,
    pub cash_flow_impact: CashFlowRuleConfig,
}
