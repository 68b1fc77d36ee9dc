// ==========================================
// 供应链洞察 - 分析配置读取 Trait
// ==========================================
// 职责: 定义分析层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::alerts::AlertRulesConfig;
use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// AnalyticsConfigReader Trait
// ==========================================
// 用途: 分析门面与导入服务所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
//
// 所有方法在配置缺失或格式错误时返回默认值，仅存储错误才返回 Err
#[async_trait]
pub trait AnalyticsConfigReader: Send + Sync {
    /// 获取默认交货期（天）
    ///
    /// # 默认值
    /// - 14
    async fn get_default_lead_time_days(&self) -> ConfigResult<u32>;

    /// 获取告警规则配置
    ///
    /// # 说明
    /// - 存储为 JSON，缺省字段取各规则默认值
    /// - JSON 格式错误时记录 warn 并整体回退到默认配置
    async fn get_alert_rules(&self) -> ConfigResult<AlertRulesConfig>;

    /// 获取季节性商品关键字
    ///
    /// # 说明
    /// - 逗号分隔；未配置时返回 None，沿用告警规则配置中的关键字
    async fn get_seasonal_keywords(&self) -> ConfigResult<Option<Vec<String>>>;

    /// 获取默认缓存 TTL（秒）
    ///
    /// # 默认值
    /// - 300
    async fn get_cache_default_ttl_secs(&self) -> ConfigResult<u64>;

    /// 获取汇总类（KPI / 业绩）缓存 TTL（秒）
    ///
    /// # 默认值
    /// - 600
    async fn get_cache_rollup_ttl_secs(&self) -> ConfigResult<u64>;
}
