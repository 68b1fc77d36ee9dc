// ==========================================
// 供应链洞察 - 源记录 Repository 实现
// ==========================================
// 职责: 实现 RecordRepository（使用 rusqlite）
// 红线: 每批一个事务，失败整批回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::records::{InventoryRecord, SalesRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_repo::RecordRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const INVENTORY_COLUMNS: &str = "product_code, period, name, product_group, subgroup, unit_type, \
     previous_balance, entries, exits, current_balance, average_cost, last_cost";

const SALES_COLUMNS: &str = "product_code, document_date, document_number, quantity, net_value, \
     gross_value, discount, customer, territory, salesperson";

// ==========================================
// RecordRepositoryImpl
// ==========================================
pub struct RecordRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl RecordRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_inventory(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
        Ok(InventoryRecord {
            product_code: row.get(0)?,
            period: row.get(1)?,
            name: row.get(2)?,
            group: row.get(3)?,
            subgroup: row.get(4)?,
            unit_type: row.get(5)?,
            previous_balance: row.get(6)?,
            entries: row.get(7)?,
            exits: row.get(8)?,
            current_balance: row.get(9)?,
            average_cost: row.get(10)?,
            last_cost: row.get(11)?,
        })
    }

    fn map_sales(row: &Row<'_>) -> rusqlite::Result<SalesRecord> {
        Ok(SalesRecord {
            product_code: row.get(0)?,
            document_date: row.get(1)?,
            document_number: row.get(2)?,
            quantity: row.get(3)?,
            net_value: row.get(4)?,
            gross_value: row.get(5)?,
            discount: row.get(6)?,
            customer: row.get(7)?,
            territory: row.get(8)?,
            salesperson: row.get(9)?,
        })
    }
}

#[async_trait]
impl RecordRepository for RecordRepositoryImpl {
    async fn upsert_inventory(&self, org_id: &str, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(&format!(
                r#"
                INSERT INTO inventory_record (org_id, {}, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, datetime('now'))
                ON CONFLICT(org_id, product_code, period) DO UPDATE SET
                    name = excluded.name,
                    product_group = excluded.product_group,
                    subgroup = excluded.subgroup,
                    unit_type = excluded.unit_type,
                    previous_balance = excluded.previous_balance,
                    entries = excluded.entries,
                    exits = excluded.exits,
                    current_balance = excluded.current_balance,
                    average_cost = excluded.average_cost,
                    last_cost = excluded.last_cost,
                    updated_at = excluded.updated_at
                "#,
                INVENTORY_COLUMNS
            ))?;

            for r in records {
                count += stmt.execute(params![
                    org_id,
                    r.product_code,
                    r.period,
                    r.name,
                    r.group,
                    r.subgroup,
                    r.unit_type,
                    r.previous_balance,
                    r.entries,
                    r.exits,
                    r.current_balance,
                    r.average_cost,
                    r.last_cost,
                ])?;
            }
        }
        tx.commit()?;

        debug!(org_id, count, "库存快照写入完成");
        Ok(count)
    }

    async fn insert_sales(&self, org_id: &str, records: &[SalesRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        {
            // 带单据号的行受部分唯一索引约束，REPLACE 即覆盖
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO sales_record (org_id, {}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                SALES_COLUMNS
            ))?;

            for r in records {
                count += stmt.execute(params![
                    org_id,
                    r.product_code,
                    r.document_date,
                    r.document_number,
                    r.quantity,
                    r.net_value,
                    r.gross_value,
                    r.discount,
                    r.customer,
                    r.territory,
                    r.salesperson,
                ])?;
            }
        }
        tx.commit()?;

        debug!(org_id, count, "销售明细写入完成");
        Ok(count)
    }

    async fn query_inventory_by_period(
        &self,
        org_id: &str,
        period: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM inventory_record WHERE org_id = ?1 AND period = ?2 ORDER BY product_code",
            INVENTORY_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![org_id, period], Self::map_inventory)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn query_inventory_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM inventory_record \
             WHERE org_id = ?1 AND period >= ?2 AND period <= ?3 \
             ORDER BY product_code, period",
            INVENTORY_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![org_id, start, end], Self::map_inventory)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn query_sales_range(
        &self,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<SalesRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sales_record \
             WHERE org_id = ?1 AND document_date >= ?2 AND document_date <= ?3 \
             ORDER BY document_date, id",
            SALES_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![org_id, start, end], Self::map_sales)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
