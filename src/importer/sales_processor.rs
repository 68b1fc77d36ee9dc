// ==========================================
// 供应链洞察 - 销售记录处理器
// ==========================================
// 职责: 原始行 → SalesRecord
// 日期: 无法解析时使用当天（校验阶段已给出警告）
// 去重: 仅对带单据号的记录按 (单据号, 商品编码) 去重
// ==========================================

use crate::domain::records::{RawRow, SalesRecord};
use crate::importer::column_mapping::{ColumnMapping, FieldKey};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::number_parser::to_number;
use crate::importer::period_normalizer::parse_date;
use crate::importer::record_importer_trait::{DataCleaner as _, RecordProcessor};
use crate::importer::row_validator::is_blank_row;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

pub struct SalesProcessor {
    cleaner: DataCleaner,
    today: NaiveDate,
}

impl SalesProcessor {
    pub fn new() -> Self {
        Self::with_today(chrono::Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            cleaner: DataCleaner,
            today,
        }
    }

    fn process_row(
        &self,
        row_number: usize,
        row: &RawRow,
        mapping: &ColumnMapping,
    ) -> ImportResult<SalesRecord> {
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

        let number = |key: FieldKey| mapping.value(row, key).map(to_number).unwrap_or(0.0);
        let net_value = number(FieldKey::NetValue);
        // 缺少总额列时以净额 + 折扣代替
        let discount = number(FieldKey::Discount);
        let gross_value = match mapping.column(FieldKey::GrossValue) {
            Some(_) => number(FieldKey::GrossValue),
            None => net_value + discount,
        };

        Ok(SalesRecord {
            document_date: mapping
                .value(row, FieldKey::DocumentDate)
                .and_then(parse_date)
                .unwrap_or(self.today),
            document_number: self
                .cleaner
                .normalize_null(mapping.text(row, FieldKey::DocumentNumber)),
            quantity: number(FieldKey::Quantity),
            net_value,
            gross_value,
            discount,
            customer: self.cleaner.clean_dimension(mapping.text(row, FieldKey::Customer)),
            territory: self.cleaner.clean_dimension(mapping.text(row, FieldKey::Territory)),
            salesperson: self
                .cleaner
                .clean_dimension(mapping.text(row, FieldKey::Salesperson)),
            product_code,
        })
    }
}

impl Default for SalesProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProcessor for SalesProcessor {
    type Record = SalesRecord;

    fn process(&self, rows: &[RawRow], mapping: &ColumnMapping) -> ImportResult<Vec<SalesRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if is_blank_row(row) {
                continue;
            }
            records.push(self.process_row(idx + 1, row, mapping)?);
        }
        debug!(rows = rows.len(), records = records.len(), "销售行处理完成");
        Ok(records)
    }

    fn transform(&self, records: Vec<SalesRecord>) -> Vec<SalesRecord> {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut deduped: Vec<SalesRecord> = Vec::with_capacity(records.len());

        for record in records {
            let Some(doc) = record.document_number.clone() else {
                deduped.push(record);
                continue;
            };
            let key = (doc, record.product_code.clone());
            match index.get(&key) {
                Some(&pos) => deduped[pos] = record,
                None => {
                    index.insert(key, deduped.len());
                    deduped.push(record);
                }
            }
        }
        deduped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordType;
    use crate::importer::column_mapping::collect_headers;
    use serde_json::{json, Value};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn sale(code: &str, doc: Value, date: Value, qty: Value) -> RawRow {
        let mut r = RawRow::new();
        r.insert("CODIGO".to_string(), json!(code));
        r.insert("NUMERO_DOCUMENTO".to_string(), doc);
        r.insert("FECHA".to_string(), date);
        r.insert("CANTIDAD".to_string(), qty);
        r.insert("VALOR_NETO".to_string(), json!("1,234.56"));
        r.insert("TERRITORIO".to_string(), json!(" Norte "));
        r
    }

    fn process(rows: &[RawRow]) -> ImportResult<Vec<SalesRecord>> {
        let mapping = ColumnMapping::resolve(RecordType::Sales, &collect_headers(rows));
        SalesProcessor::with_today(today()).process(rows, &mapping)
    }

    #[test]
    fn test_process_sales_row() {
        let rows = vec![sale("x9", json!("F-1"), json!("03/15/2024"), json!("2"))];
        let records = process(&rows).unwrap();
        let r = &records[0];
        assert_eq!(r.product_code, "X9");
        assert_eq!(r.document_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(r.quantity, 2.0);
        assert!((r.net_value - 1234.56).abs() < 1e-9);
        assert!((r.gross_value - 1234.56).abs() < 1e-9);
        assert_eq!(r.territory.as_deref(), Some("Norte"));
    }

    #[test]
    fn test_unparseable_date_uses_today() {
        let rows = vec![sale("A", json!(null), json!("??"), json!(1))];
        let records = process(&rows).unwrap();
        assert_eq!(records[0].document_date, today());
        assert_eq!(records[0].document_number, None);
    }

    #[test]
    fn test_empty_code_fails_whole_batch() {
        let rows = vec![
            sale("A", json!("1"), json!("2024-01-01"), json!(1)),
            sale("", json!("2"), json!("2024-01-01"), json!(1)),
        ];
        let err = process(&rows).unwrap_err();
        assert!(matches!(err, ImportError::BatchProcessing { row: 2, .. }));
    }

    #[test]
    fn test_transform_dedupes_only_documented_lines() {
        let rows = vec![
            sale("A", json!("F-1"), json!("2024-01-01"), json!(1)),
            sale("A", json!(null), json!("2024-01-01"), json!(1)),
            sale("A", json!(null), json!("2024-01-01"), json!(1)),
            sale("A", json!("F-1"), json!("2024-01-01"), json!(5)),
        ];
        let processor = SalesProcessor::with_today(today());
        let deduped = processor.transform(process(&rows).unwrap());
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].quantity, 5.0);
    }
}
