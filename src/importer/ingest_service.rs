// ==========================================
// 供应链洞察 - 导入服务
// ==========================================
// 流程: 校验 → 处理（单行失败整批中止）→ 去重 → 落库 → 取消在途重算 → 失效缓存
// 红线: 缓存失效必须在返回之前完成，调用方拿到报告后的读取不会命中旧结果
// ==========================================

use crate::cache::{ops, AnalyticsCache};
use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use crate::domain::validation::ValidationIssue;
use crate::engine::cancellation::RecomputeRegistry;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::inventory_processor::InventoryProcessor;
use crate::importer::inventory_validator::InventoryValidator;
use crate::importer::record_importer_trait::{RecordProcessor, RecordValidator};
use crate::importer::sales_processor::SalesProcessor;
use crate::importer::sales_validator::SalesValidator;
use crate::perf::PerfGuard;
use crate::repository::RecordRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// IngestReport - 导入批次报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub batch_id: String,
    pub record_type: RecordType,
    /// 原始行数
    pub row_count: usize,
    /// 实际写入条数
    pub stored: usize,
    /// 按自然键去重移除的条数
    pub duplicates_removed: usize,
    pub warnings: Vec<ValidationIssue>,
    pub elapsed_ms: u64,
}

/// 处理完成、待落库的批次
struct PreparedBatch<R> {
    records: Vec<R>,
    duplicates_removed: usize,
    warnings: Vec<ValidationIssue>,
}

// ==========================================
// IngestService
// ==========================================
pub struct IngestService {
    repo: Arc<dyn RecordRepository>,
    cache: Arc<AnalyticsCache>,
    registry: RecomputeRegistry,
}

impl IngestService {
    /// # 参数
    /// - repo: 源记录仓储
    /// - cache: 与分析门面共享的缓存（其时钟同时决定日期兜底的"今天"）
    /// - registry: 与分析门面共享的重算登记表
    pub fn new(repo: Arc<dyn RecordRepository>, cache: Arc<AnalyticsCache>, registry: RecomputeRegistry) -> Self {
        Self { repo, cache, registry }
    }

    /// 导入库存快照
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn ingest_inventory(&self, org_id: &str, rows: &[RawRow]) -> ImportResult<IngestReport> {
        let perf = PerfGuard::new("ingest_inventory");
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, org_id, "开始导入库存数据");

        let processor = InventoryProcessor::with_today(self.cache.clock().today());
        let batch = Self::prepare(&InventoryValidator, &processor, rows)?;

        let stored = self.repo.upsert_inventory(org_id, &batch.records).await?;
        perf.set_items(stored);

        Ok(self.finish(org_id, batch_id, RecordType::Inventory, rows.len(), stored, batch, &perf))
    }

    /// 导入销售明细
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn ingest_sales(&self, org_id: &str, rows: &[RawRow]) -> ImportResult<IngestReport> {
        let perf = PerfGuard::new("ingest_sales");
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, org_id, "开始导入销售数据");

        let processor = SalesProcessor::with_today(self.cache.clock().today());
        let batch = Self::prepare(&SalesValidator, &processor, rows)?;

        let stored = self.repo.insert_sales(org_id, &batch.records).await?;
        perf.set_items(stored);

        Ok(self.finish(org_id, batch_id, RecordType::Sales, rows.len(), stored, batch, &perf))
    }

    /// 校验 → 处理 → 去重（纯内存，不触碰存储）
    fn prepare<V, P>(validator: &V, processor: &P, rows: &[RawRow]) -> ImportResult<PreparedBatch<P::Record>>
    where
        V: RecordValidator,
        P: RecordProcessor,
    {
        // === 步骤 1: 校验 ===
        let validation = validator.validate(rows);
        if !validation.column_mapping.missing_required.is_empty() {
            warn!(
                record_type = %validation.record_type,
                missing = ?validation.column_mapping.missing_required,
                "缺少必填列，中止导入"
            );
            return Err(ImportError::MissingColumns(validation.column_mapping.missing_required));
        }
        if !validation.is_valid {
            let first_error = validation.errors.first().map(|e| e.to_string());
            warn!(
                record_type = %validation.record_type,
                errors = validation.errors.len(),
                first_error = first_error.as_deref().unwrap_or(""),
                "校验未通过，中止导入"
            );
            return Err(ImportError::Validation {
                record_type: validation.record_type,
                error_count: validation.errors.len(),
                first_error,
            });
        }
        debug!(warnings = validation.warnings.len(), "校验通过");

        // === 步骤 2: 处理 ===
        let processed = processor.process(rows, &validation.column_mapping)?;
        let processed_count = processed.len();

        // === 步骤 3: 去重 ===
        let records = processor.transform(processed);
        let duplicates_removed = processed_count - records.len();
        debug!(records = records.len(), duplicates_removed, "处理完成");

        Ok(PreparedBatch {
            records,
            duplicates_removed,
            warnings: validation.warnings,
        })
    }

    /// 落库之后: 取消在途重算并同步失效缓存
    #[allow(clippy::too_many_arguments)]
    fn finish<R>(
        &self,
        org_id: &str,
        batch_id: String,
        record_type: RecordType,
        row_count: usize,
        stored: usize,
        batch: PreparedBatch<R>,
        perf: &PerfGuard,
    ) -> IngestReport {
        let cancelled = self.registry.cancel_org(org_id);
        let invalidated: usize = ops::ALL
            .iter()
            .map(|op| self.cache.clear(Some(&format!("{}:", op))))
            .sum();

        let report = IngestReport {
            batch_id,
            record_type,
            row_count,
            stored,
            duplicates_removed: batch.duplicates_removed,
            warnings: batch.warnings,
            elapsed_ms: perf.elapsed_ms(),
        };

        info!(
            batch_id = %report.batch_id,
            record_type = %record_type,
            stored,
            duplicates_removed = report.duplicates_removed,
            warnings = report.warnings.len(),
            cancelled,
            invalidated,
            "导入完成"
        );
        report
    }
}
