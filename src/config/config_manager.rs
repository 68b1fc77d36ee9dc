// ==========================================
// 供应链洞察 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope，当前只使用 global)
// ==========================================

use crate::cache::{DEFAULT_TTL, ROLLUP_TTL};
use crate::config::analytics_config_trait::{AnalyticsConfigReader, ConfigResult};
use crate::db::open_sqlite_connection;
use crate::engine::alerts::AlertRulesConfig;
use crate::engine::lead_time::DEFAULT_LEAD_TIME_DAYS;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 数值型配置，解析失败时回退默认值
    fn get_parsed_or_default<T: std::str::FromStr + Copy>(&self, key: &str, default: T) -> ConfigResult<T> {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %value, "配置值无法解析，使用默认值");
                Ok(default)
            }
        }
    }

    /// 获取所有 global 配置的快照（JSON 格式，键有序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// AnalyticsConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AnalyticsConfigReader for ConfigManager {
    async fn get_default_lead_time_days(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::DEFAULT_LEAD_TIME_DAYS, DEFAULT_LEAD_TIME_DAYS)
    }

    async fn get_alert_rules(&self) -> ConfigResult<AlertRulesConfig> {
        let value = self.get_config_or_default(config_keys::ALERT_RULES, "{}")?;
        let rules: AlertRulesConfig = serde_json::from_str(&value).unwrap_or_else(|e| {
            tracing::warn!(
                config_key = config_keys::ALERT_RULES,
                raw_value = %value,
                error = %e,
                "告警规则配置格式错误，使用默认配置"
            );
            AlertRulesConfig::default()
        });
        Ok(rules)
    }

    async fn get_seasonal_keywords(&self) -> ConfigResult<Option<Vec<String>>> {
        let value = match self.get_config_value(config_keys::SEASONAL_KEYWORDS)? {
            Some(v) => v,
            None => return Ok(None),
        };

        let keywords: Vec<String> = value
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if keywords.is_empty() {
            Ok(None)
        } else {
            Ok(Some(keywords))
        }
    }

    async fn get_cache_default_ttl_secs(&self) -> ConfigResult<u64> {
        self.get_parsed_or_default(config_keys::CACHE_DEFAULT_TTL_SECS, DEFAULT_TTL.as_secs())
    }

    async fn get_cache_rollup_ttl_secs(&self) -> ConfigResult<u64> {
        self.get_parsed_or_default(config_keys::CACHE_ROLLUP_TTL_SECS, ROLLUP_TTL.as_secs())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 交货期
    pub const DEFAULT_LEAD_TIME_DAYS: &str = "default_lead_time_days";

    // 告警规则 (JSON)
    pub const ALERT_RULES: &str = "alert_rules";
    pub const SEASONAL_KEYWORDS: &str = "seasonal_keywords";

    // 缓存
    pub const CACHE_DEFAULT_TTL_SECS: &str = "cache_default_ttl_secs";
    pub const CACHE_ROLLUP_TTL_SECS: &str = "cache_rollup_ttl_secs";
}
