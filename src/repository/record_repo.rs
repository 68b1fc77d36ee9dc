// ==========================================
// 供应链洞察 - 源记录 Repository Trait
// ==========================================
// 职责: 库存/销售记录的持久化协作接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据读写
// 说明: org_id 仅作为不透明的作用域标识透传
// ==========================================

use crate::domain::records::{InventoryRecord, SalesRecord};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// RecordRepository Trait
// ==========================================
// 实现者: RecordRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 批量 upsert 库存快照（按 (org, product_code, period) 覆盖）
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err: 数据库错误（整个事务回滚）
    async fn upsert_inventory(&self, org_id: &str, records: &[InventoryRecord]) -> RepositoryResult<usize>;

    /// 批量插入销售明细
    ///
    /// # 说明
    /// - 带单据号的记录按 (org, 单据号, product_code) 覆盖，其余直接追加
    async fn insert_sales(&self, org_id: &str, records: &[SalesRecord]) -> RepositoryResult<usize>;

    /// 查询单个期间的库存快照
    async fn query_inventory_by_period(
        &self,
        org_id: &str,
        period: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>>;

    /// 查询期间落在 [start, end] 内的库存快照（按商品、期间升序）
    async fn query_inventory_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>>;

    /// 查询单据日期落在 [start, end] 内的销售明细
    async fn query_sales_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SalesRecord>>;
}
