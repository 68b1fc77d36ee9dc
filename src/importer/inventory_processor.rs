// ==========================================
// 供应链洞察 - 库存记录处理器
// ==========================================
// 职责: 原始行 → InventoryRecord（数值解析 + 期间归一 + 清洗）
// 红线: 任一行失败中止整批；余额/成本非负
// 去重: (product_code, period)，靠后的行覆盖靠前的行，位置保持首次出现处
// ==========================================

use crate::domain::records::{InventoryRecord, RawRow};
use crate::importer::column_mapping::{ColumnMapping, FieldKey};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::number_parser::to_number;
use crate::importer::period_normalizer::normalize_period;
use crate::importer::record_importer_trait::{DataCleaner as _, RecordProcessor};
use crate::importer::row_validator::is_blank_row;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

pub struct InventoryProcessor {
    cleaner: DataCleaner,
    /// 期间兜底使用的"今天"
    today: NaiveDate,
}

impl InventoryProcessor {
    pub fn new() -> Self {
        Self::with_today(chrono::Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            cleaner: DataCleaner,
            today,
        }
    }

    fn number(&self, row: &RawRow, mapping: &ColumnMapping, key: FieldKey) -> f64 {
        mapping.value(row, key).map(to_number).unwrap_or(0.0)
    }

    fn process_row(
        &self,
        row_number: usize,
        row: &RawRow,
        mapping: &ColumnMapping,
    ) -> ImportResult<InventoryRecord> {
        let product_code = mapping
            .text(row, FieldKey::ProductCode)
            .map(|c| self.cleaner.clean_product_code(&c))
            .unwrap_or_default();
        if product_code.is_empty() {
            return Err(ImportError::BatchProcessing {
                row: row_number,
                message: "商品编码为空".to_string(),
            });
        }

        let period = normalize_period(
            mapping.value(row, FieldKey::Period).unwrap_or(&Value::Null),
            self.today,
        );

        let name = self
            .cleaner
            .clean_dimension(mapping.text(row, FieldKey::Name))
            .unwrap_or_else(|| product_code.clone());

        Ok(InventoryRecord {
            period,
            name,
            group: self.cleaner.clean_dimension(mapping.text(row, FieldKey::Group)),
            subgroup: self.cleaner.clean_dimension(mapping.text(row, FieldKey::Subgroup)),
            unit_type: self.cleaner.clean_dimension(mapping.text(row, FieldKey::UnitType)),
            previous_balance: self
                .cleaner
                .non_negative(self.number(row, mapping, FieldKey::PreviousBalance)),
            entries: self.cleaner.non_negative(self.number(row, mapping, FieldKey::Entries)),
            exits: self.cleaner.non_negative(self.number(row, mapping, FieldKey::Exits)),
            current_balance: self
                .cleaner
                .non_negative(self.number(row, mapping, FieldKey::CurrentBalance)),
            average_cost: self
                .cleaner
                .non_negative(self.number(row, mapping, FieldKey::AverageCost)),
            last_cost: self.cleaner.non_negative(self.number(row, mapping, FieldKey::LastCost)),
            product_code,
        })
    }
}

impl Default for InventoryProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for InventoryProcessor {
    type Record = InventoryRecord;

    fn process(&self, rows: &[RawRow], mapping: &ColumnMapping) -> ImportResult<Vec<InventoryRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;

        for (idx, row) in rows.iter().enumerate() {
            if is_blank_row(row) {
                skipped += 1;
                continue;
            }
            records.push(self.process_row(idx + 1, row, mapping)?);
        }

        debug!(rows = rows.len(), records = records.len(), skipped, "库存行处理完成");
        Ok(records)
    }

    fn transform(&self, records: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
        let mut index: HashMap<(String, NaiveDate), usize> = HashMap::with_capacity(records.len());
        let mut deduped: Vec<InventoryRecord> = Vec::with_capacity(records.len());

        for record in records {
            match index.get(&record.natural_key()) {
                Some(&pos) => deduped[pos] = record,
                None => {
                    index.insert(record.natural_key(), deduped.len());
                    deduped.push(record);
                }
            }
        }
        deduped
    }
}
