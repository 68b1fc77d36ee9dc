// ==========================================
// 供应链洞察 - 分析 API
// ==========================================
// 职责: 以 (org, 时间窗) 为键，经缓存对外提供指标 / KPI / 告警 / 补货建议 / 效率 / 业绩汇总
// 流程: 查缓存 → 记录代数 → 并发拉取库存与销售 → 计算 → 代数未变才写回
// 说明: 重算被新导入取消时返回 ComputeOutcome::Cancelled，结果不缓存
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::cache::{ops, AnalyticsCache, CacheKey, CacheStats};
use crate::config::AnalyticsConfigReader;
use crate::domain::alert::{Alert, KpiData, ProcurementRecommendation};
use crate::domain::product::{PerformanceRollup, ProcessedProduct, StockEfficiencyData};
use crate::domain::time_range::{ResolvedRange, TimeRange};
use crate::engine::alerts::{AlertContext, AlertEngine};
use crate::engine::cancellation::{ComputeOutcome, RecomputeRegistry};
use crate::engine::efficiency::stock_efficiency;
use crate::engine::kpi::KpiAggregator;
use crate::engine::lead_time::LeadTimeTable;
use crate::engine::metrics::MetricsCalculator;
use crate::engine::performance::performance_rollup;
use crate::engine::procurement::ProcurementPlanner;
use crate::perf::PerfGuard;
use crate::repository::RecordRepository;
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// 库存历史的查询起点（只需覆盖全部历史期间）
fn earliest_period() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// 可能被取消的共享结果
pub type Shared<T> = ComputeOutcome<Arc<T>>;

// ==========================================
// AnalyticsApi
// ==========================================
pub struct AnalyticsApi {
    repo: Arc<dyn RecordRepository>,
    cache: Arc<AnalyticsCache>,
    config: Arc<dyn AnalyticsConfigReader>,
    registry: RecomputeRegistry,
}

impl AnalyticsApi {
    /// # 参数
    /// - repo: 源记录仓储
    /// - cache: 与导入服务共享的缓存（其时钟决定"今天"与告警时间戳）
    /// - config: 分析配置读取器
    /// - registry: 与导入服务共享的重算登记表
    pub fn new(
        repo: Arc<dyn RecordRepository>,
        cache: Arc<AnalyticsCache>,
        config: Arc<dyn AnalyticsConfigReader>,
        registry: RecomputeRegistry,
    ) -> Self {
        Self {
            repo,
            cache,
            config,
            registry,
        }
    }

    /// 按注入时钟解析时间窗
    pub fn resolve(&self, range: TimeRange) -> ResolvedRange {
        range.resolve(self.cache.clock().today())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 校验 org 并生成 (缓存键, 已解析区间)
    fn scope(&self, op: &str, org_id: &str, range: TimeRange) -> ApiResult<(String, ResolvedRange)> {
        if org_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("org_id 不能为空".to_string()));
        }
        let resolved = self.resolve(range);
        let key = CacheKey::new(op)
            .param("org", org_id)
            .param("start", resolved.start)
            .param("end", resolved.end)
            .build();
        Ok((key, resolved))
    }

    async fn default_ttl(&self) -> ApiResult<Duration> {
        Ok(Duration::from_secs(self.config.get_cache_default_ttl_secs().await?))
    }

    async fn rollup_ttl(&self) -> ApiResult<Duration> {
        Ok(Duration::from_secs(self.config.get_cache_rollup_ttl_secs().await?))
    }

    /// 读穿缓存
    ///
    /// # 说明
    /// - 代数在计算之前读取，计算期间发生的失效会让结果不写回
    /// - 同键并发未命中时各自计算，后写者胜
    async fn cached<T, F, Fut>(&self, key: String, ttl: Duration, compute: F) -> ApiResult<Shared<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<ComputeOutcome<T>>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            debug!(key = %key, "缓存命中");
            return Ok(ComputeOutcome::Completed(hit));
        }

        let generation = self.cache.generation();
        match compute().await? {
            ComputeOutcome::Completed(value) => {
                let (value, stored) = self.cache.set_if_generation(&key, value, ttl, generation);
                debug!(key = %key, stored, "计算完成");
                Ok(ComputeOutcome::Completed(value))
            }
            ComputeOutcome::Cancelled => {
                info!(key = %key, "重算已取消，结果不缓存");
                Ok(ComputeOutcome::Cancelled)
            }
        }
    }

    // ==========================================
    // 单品指标
    // ==========================================

    /// 单品指标视图（按商品编码排序）
    #[instrument(skip(self))]
    pub async fn processed_products(&self, org_id: &str, range: TimeRange) -> ApiResult<Shared<Vec<ProcessedProduct>>> {
        let (key, resolved) = self.scope(ops::PROCESSED_PRODUCTS, org_id, range)?;
        let ttl = self.default_ttl().await?;

        self.cached(key, ttl, || self.compute_products(org_id, resolved)).await
    }

    async fn compute_products(
        &self,
        org_id: &str,
        range: ResolvedRange,
    ) -> ApiResult<ComputeOutcome<Vec<ProcessedProduct>>> {
        let perf = PerfGuard::new("compute_products");
        let range_key = range.to_string();
        let token = self.registry.begin(org_id, &range_key);

        let lead_time_days = self.config.get_default_lead_time_days().await?;
        let fetched = futures::try_join!(
            self.repo.query_inventory_range(org_id, earliest_period(), range.end),
            self.repo.query_sales_range(org_id, range.start, range.end),
        );
        let (inventory, sales) = match fetched {
            Ok(data) => data,
            Err(e) => {
                self.registry.finish(org_id, &range_key, &token);
                return Err(e.into());
            }
        };

        let calculator = MetricsCalculator::new(LeadTimeTable::new(lead_time_days));
        let outcome = calculator.calculate_cancellable(&inventory, &sales, &range, &token);
        self.registry.finish(org_id, &range_key, &token);

        if let ComputeOutcome::Completed(products) = &outcome {
            perf.set_items(products.len());
        }
        Ok(outcome)
    }

    // ==========================================
    // 告警
    // ==========================================

    /// 全部已启用规则的告警并集
    #[instrument(skip(self))]
    pub async fn alerts(&self, org_id: &str, range: TimeRange) -> ApiResult<Shared<Vec<Alert>>> {
        let (key, resolved) = self.scope(ops::ALERTS, org_id, range)?;
        let ttl = self.default_ttl().await?;

        self.cached(key, ttl, || self.compute_alerts(org_id, range, resolved)).await
    }

    async fn compute_alerts(
        &self,
        org_id: &str,
        range: TimeRange,
        resolved: ResolvedRange,
    ) -> ApiResult<ComputeOutcome<Vec<Alert>>> {
        let products = match self.processed_products(org_id, range).await? {
            ComputeOutcome::Completed(products) => products,
            ComputeOutcome::Cancelled => return Ok(ComputeOutcome::Cancelled),
        };

        let engine = self.alert_engine().await?;
        let ctx = AlertContext {
            timestamp: self.cache.clock().now(),
            reference_date: resolved.end,
        };
        Ok(ComputeOutcome::Completed(engine.evaluate(&products, &ctx)))
    }

    async fn alert_engine(&self) -> ApiResult<AlertEngine> {
        let mut rules = self.config.get_alert_rules().await?;
        if let Some(keywords) = self.config.get_seasonal_keywords().await? {
            rules.seasonal_demand.keywords = keywords;
        }
        Ok(AlertEngine::from_config(&rules))
    }

    // ==========================================
    // KPI
    // ==========================================

    #[instrument(skip(self))]
    pub async fn kpis(&self, org_id: &str, range: TimeRange) -> ApiResult<Shared<KpiData>> {
        let (key, _) = self.scope(ops::KPIS, org_id, range)?;
        let ttl = self.rollup_ttl().await?;

        self.cached(key, ttl, || self.compute_kpis(org_id, range)).await
    }

    async fn compute_kpis(&self, org_id: &str, range: TimeRange) -> ApiResult<ComputeOutcome<KpiData>> {
        let products = match self.processed_products(org_id, range).await? {
            ComputeOutcome::Completed(products) => products,
            ComputeOutcome::Cancelled => return Ok(ComputeOutcome::Cancelled),
        };
        let alerts = match self.alerts(org_id, range).await? {
            ComputeOutcome::Completed(alerts) => alerts,
            ComputeOutcome::Cancelled => return Ok(ComputeOutcome::Cancelled),
        };
        Ok(ComputeOutcome::Completed(KpiAggregator::aggregate(&products, &alerts)))
    }

    // ==========================================
    // 补货建议 / 库存效率
    // ==========================================

    #[instrument(skip(self))]
    pub async fn procurement_recommendations(
        &self,
        org_id: &str,
        range: TimeRange,
    ) -> ApiResult<Shared<Vec<ProcurementRecommendation>>> {
        let (key, _) = self.scope(ops::PROCUREMENT, org_id, range)?;
        let ttl = self.default_ttl().await?;

        self.cached(key, ttl, || self.compute_procurement(org_id, range)).await
    }

    async fn compute_procurement(
        &self,
        org_id: &str,
        range: TimeRange,
    ) -> ApiResult<ComputeOutcome<Vec<ProcurementRecommendation>>> {
        Ok(self
            .processed_products(org_id, range)
            .await?
            .map(|products| ProcurementPlanner::recommend(&products)))
    }

    #[instrument(skip(self))]
    pub async fn stock_efficiency(&self, org_id: &str, range: TimeRange) -> ApiResult<Shared<Vec<StockEfficiencyData>>> {
        let (key, _) = self.scope(ops::STOCK_EFFICIENCY, org_id, range)?;
        let ttl = self.default_ttl().await?;

        self.cached(key, ttl, || self.compute_efficiency(org_id, range)).await
    }

    async fn compute_efficiency(
        &self,
        org_id: &str,
        range: TimeRange,
    ) -> ApiResult<ComputeOutcome<Vec<StockEfficiencyData>>> {
        Ok(self
            .processed_products(org_id, range)
            .await?
            .map(|products| stock_efficiency(&products)))
    }

    // ==========================================
    // 业绩汇总
    // ==========================================

    #[instrument(skip(self))]
    pub async fn performance_rollup(&self, org_id: &str, range: TimeRange) -> ApiResult<Shared<PerformanceRollup>> {
        let (key, resolved) = self.scope(ops::PERFORMANCE, org_id, range)?;
        let ttl = self.rollup_ttl().await?;

        self.cached(key, ttl, || self.compute_performance(org_id, range, resolved)).await
    }

    async fn compute_performance(
        &self,
        org_id: &str,
        range: TimeRange,
        resolved: ResolvedRange,
    ) -> ApiResult<ComputeOutcome<PerformanceRollup>> {
        let products = match self.processed_products(org_id, range).await? {
            ComputeOutcome::Completed(products) => products,
            ComputeOutcome::Cancelled => return Ok(ComputeOutcome::Cancelled),
        };
        let sales = self
            .repo
            .query_sales_range(org_id, resolved.start, resolved.end)
            .await?;
        Ok(ComputeOutcome::Completed(performance_rollup(&products, &sales, &resolved)))
    }
}
