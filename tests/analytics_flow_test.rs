// ==========================================
// 导入 → 分析 端到端测试
// ==========================================
// 测试目标: 导入后 KPI / 告警 / 补货建议的口径，缓存命中与失效，重算取消
// ==========================================


use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use supply_chain_insights::domain::{InventoryRecord, SalesRecord, TimeRange};
use supply_chain_insights::engine::{ComputeOutcome, RecomputeRegistry};
use supply_chain_insights::logging;
use supply_chain_insights::repository::{RecordRepository, RecordRepositoryImpl, RepositoryResult};
use supply_chain_insights::{AlertSeverity, AlertType, ApiError, ProcurementAction, StockStatus};
use test_helpers::{healthy_portfolio, inventory_row, sales_row, TestEnv};

const ORG: &str = "acme";

fn january() -> TimeRange {
    TimeRange::between(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

async fn load_healthy(env: &TestEnv) {
    let (inventory, sales) = healthy_portfolio();
    env.ingest.ingest_inventory(ORG, &inventory).await.unwrap();
    env.ingest.ingest_sales(ORG, &sales).await.unwrap();
}

// ==========================================
// 测试用例
// ==========================================

#[tokio::test]
async fn test_reorder_levels_through_full_pipeline() {
    logging::init_test();
    let env = TestEnv::new();
    load_healthy(&env).await;

    let products = env.analytics.processed_products(ORG, january()).await.unwrap().completed().unwrap();
    let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["A1", "C3", "D4"]);

    let a1 = &products[0];
    assert_eq!(a1.monthly_sales, 40.0);
    assert_eq!(a1.minimum_level, 28.0);
    assert_eq!(a1.maximum_level, 80.0);
    assert_eq!(a1.stock_status, StockStatus::Normal);
    assert_eq!(a1.turnover_rate, 8.0);
    assert!((a1.margin - 50.0).abs() < 1e-9);
    assert_eq!(products[2].stock_status, StockStatus::Overstock);
}

#[tokio::test]
async fn test_health_score_two_normal_one_overstock() {
    logging::init_test();
    let env = TestEnv::new();
    load_healthy(&env).await;

    let kpis = env.analytics.kpis(ORG, january()).await.unwrap().completed().unwrap();
    assert_eq!(kpis.total_products, 3);
    assert_eq!(kpis.normal_stock, 2);
    assert_eq!(kpis.over_stock, 1);
    assert!((kpis.avg_gross_margin - 50.0).abs() < 1e-9);
    assert_eq!(kpis.rounded_health_score(), 67);
    assert_eq!(kpis.critical_alerts, 0);
    assert_eq!(kpis.total_revenue, 2400.0);
}

#[tokio::test]
async fn test_out_of_stock_raises_critical_alert_and_immediate_order() {
    logging::init_test();
    let env = TestEnv::new();
    let inventory = vec![
        inventory_row("A1", "Tornillo", "2024-01-31", 100.0, 0.0, 40.0, 60.0, 10.0),
        inventory_row("B2", "Perno", "2024-01-31", 100.0, 0.0, 100.0, 0.0, 10.0),
    ];
    let sales = vec![
        sales_row("A1", "2024-01-10", 40.0, 800.0),
        sales_row("B2", "2024-01-10", 40.0, 800.0),
    ];
    env.ingest.ingest_inventory(ORG, &inventory).await.unwrap();
    env.ingest.ingest_sales(ORG, &sales).await.unwrap();

    let alerts = env.analytics.alerts(ORG, january()).await.unwrap().completed().unwrap();
    let oos: Vec<_> = alerts.iter().filter(|a| a.product_code == "B2").collect();
    assert!(oos
        .iter()
        .any(|a| a.alert_type == AlertType::OutOfStock && a.severity == AlertSeverity::Critical));
    assert!(!oos.iter().any(|a| a.alert_type == AlertType::LeadTimeRisk));

    let kpis = env.analytics.kpis(ORG, january()).await.unwrap().completed().unwrap();
    assert_eq!(kpis.out_of_stock, 1);
    assert!(kpis.critical_alerts >= 1);

    let recs = env
        .analytics
        .procurement_recommendations(ORG, january())
        .await
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(recs[0].product_code, "B2");
    assert_eq!(recs[0].action, ProcurementAction::Immediate);
    assert_eq!(recs[0].quantity, 40.0);
    assert_eq!(recs[0].estimated_cost, 400.0);
}

#[tokio::test]
async fn test_ingest_invalidates_cached_kpis() {
    logging::init_test();
    let env = TestEnv::new();
    load_healthy(&env).await;

    let first = env.analytics.kpis(ORG, january()).await.unwrap().completed().unwrap();
    let again = env.analytics.kpis(ORG, january()).await.unwrap().completed().unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert!(env.analytics.cache_stats().hits >= 1);

    // D4 库存回落到正常区间
    let update = vec![inventory_row("D4", "Arandela", "2024-01-31", 540.0, 0.0, 480.0, 60.0, 10.0)];
    env.ingest.ingest_inventory(ORG, &update).await.unwrap();

    let fresh = env.analytics.kpis(ORG, january()).await.unwrap().completed().unwrap();
    assert_eq!(fresh.over_stock, 0);
    assert_eq!(fresh.normal_stock, 3);
}

#[tokio::test]
async fn test_ttl_expiry_recomputes() {
    logging::init_test();
    let env = TestEnv::new();
    load_healthy(&env).await;

    let first = env.analytics.stock_efficiency(ORG, january()).await.unwrap().completed().unwrap();
    env.clock.advance(Duration::seconds(299));
    let cached = env.analytics.stock_efficiency(ORG, january()).await.unwrap().completed().unwrap();
    assert!(Arc::ptr_eq(&first, &cached));

    env.clock.advance(Duration::seconds(1));
    let recomputed = env.analytics.stock_efficiency(ORG, january()).await.unwrap().completed().unwrap();
    assert!(!Arc::ptr_eq(&first, &recomputed));
    assert_eq!(*first, *recomputed);
    assert!(env.analytics.cache_stats().evictions >= 1);
}

#[tokio::test]
async fn test_performance_rollup_by_territory() {
    logging::init_test();
    let env = TestEnv::new();
    load_healthy(&env).await;

    let rollup = env.analytics.performance_rollup(ORG, january()).await.unwrap().completed().unwrap();
    assert_eq!(rollup.by_group.len(), 1);
    assert_eq!(rollup.by_group[0].group, "General");
    assert_eq!(rollup.by_group[0].product_count, 3);
    assert_eq!(rollup.by_territory.len(), 1);
    assert_eq!(rollup.by_territory[0].revenue, 2400.0);
    assert_eq!(rollup.by_territory[0].customer_count, 1);
}

#[tokio::test]
async fn test_other_org_is_isolated() {
    logging::init_test();
    let env = TestEnv::new();
    load_healthy(&env).await;

    let kpis = env.analytics.kpis("globex", january()).await.unwrap().completed().unwrap();
    assert_eq!(kpis.total_products, 0);
    assert_eq!(kpis.supply_chain_health_score, 0.0);
}

#[tokio::test]
async fn test_blank_org_is_rejected() {
    logging::init_test();
    let env = TestEnv::new();

    let err = env.analytics.kpis("  ", january()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(env.cache.is_empty());
}

// ==========================================
// 重算取消
// ==========================================

/// 读取销售时模拟同 org 的新导入到达
struct IngestDuringReadRepo {
    inner: RecordRepositoryImpl,
    registry: RecomputeRegistry,
}

#[async_trait]
impl RecordRepository for IngestDuringReadRepo {
    async fn upsert_inventory(&self, org_id: &str, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        self.inner.upsert_inventory(org_id, records).await
    }

    async fn insert_sales(&self, org_id: &str, records: &[SalesRecord]) -> RepositoryResult<usize> {
        self.inner.insert_sales(org_id, records).await
    }

    async fn query_inventory_by_period(
        &self,
        org_id: &str,
        period: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        self.inner.query_inventory_by_period(org_id, period).await
    }

    async fn query_inventory_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        self.inner.query_inventory_range(org_id, start, end).await
    }

    async fn query_sales_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SalesRecord>> {
        self.registry.cancel_org(org_id);
        self.inner.query_sales_range(org_id, start, end).await
    }
}

#[tokio::test]
async fn test_cancelled_recompute_is_not_cached() {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let inner = RecordRepositoryImpl::new(&db_path).unwrap();
    let env = TestEnv::with_repo(temp_file, db_path, |registry| {
        let repo: Arc<dyn RecordRepository> = Arc::new(IngestDuringReadRepo {
            inner,
            registry: registry.clone(),
        });
        repo
    });

    let (inventory, _) = healthy_portfolio();
    env.ingest.ingest_inventory(ORG, &inventory).await.unwrap();

    let outcome = env.analytics.processed_products(ORG, january()).await.unwrap();
    assert!(outcome.is_cancelled());
    assert!(env.cache.is_empty());
    assert_eq!(env.registry.inflight_count(), 0);

    let kpis = env.analytics.kpis(ORG, january()).await.unwrap();
    assert!(matches!(kpis, ComputeOutcome::Cancelled));
    assert!(env.cache.is_empty());
}

/// 读取库存时让出执行权，使同键的两个读取交错
struct YieldingRepo {
    inner: RecordRepositoryImpl,
}

#[async_trait]
impl RecordRepository for YieldingRepo {
    async fn upsert_inventory(&self, org_id: &str, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        self.inner.upsert_inventory(org_id, records).await
    }

    async fn insert_sales(&self, org_id: &str, records: &[SalesRecord]) -> RepositoryResult<usize> {
        self.inner.insert_sales(org_id, records).await
    }

    async fn query_inventory_by_period(
        &self,
        org_id: &str,
        period: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        self.inner.query_inventory_by_period(org_id, period).await
    }

    async fn query_inventory_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        tokio::task::yield_now().await;
        self.inner.query_inventory_range(org_id, start, end).await
    }

    async fn query_sales_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SalesRecord>> {
        self.inner.query_sales_range(org_id, start, end).await
    }
}

#[tokio::test]
async fn test_concurrent_same_key_reads_both_complete() {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let inner = RecordRepositoryImpl::new(&db_path).unwrap();
    let env = TestEnv::with_repo(temp_file, db_path, |_| {
        let repo: Arc<dyn RecordRepository> = Arc::new(YieldingRepo { inner });
        repo
    });
    load_healthy(&env).await;

    let (kpis, alerts) = tokio::join!(env.analytics.kpis(ORG, january()), env.analytics.alerts(ORG, january()));
    let kpis = kpis.unwrap();
    let alerts = alerts.unwrap();
    assert!(!kpis.is_cancelled());
    assert!(!alerts.is_cancelled());
    assert_eq!(kpis.completed().unwrap().total_products, 3);
    assert_eq!(env.registry.inflight_count(), 0);
}
