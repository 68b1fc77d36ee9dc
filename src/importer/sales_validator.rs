// ==========================================
// 供应链洞察 - 销售数据校验器
// ==========================================
// 警告: 数量为 0（不计入月均销量）、净额大于总额
// ==========================================

use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use crate::domain::validation::{ValidationIssue, ValidationResult};
use crate::importer::column_mapping::FieldKey;
use crate::importer::number_parser::{parse_number, ParsedNumber};
use crate::importer::record_importer_trait::RecordValidator;
use crate::importer::row_validator::validate_rows;

pub struct SalesValidator;

impl RecordValidator for SalesValidator {
    fn record_type(&self) -> RecordType {
        RecordType::Sales
    }

    fn validate(&self, rows: &[RawRow]) -> ValidationResult {
        validate_rows(RecordType::Sales, rows, |row_number, row, mapping, collector| {
            let number = |key: FieldKey| match mapping.value(row, key).map(parse_number) {
                Some(ParsedNumber::Value(v)) => Some(v),
                _ => None,
            };

            if number(FieldKey::Quantity) == Some(0.0) {
                collector.warning(ValidationIssue::cell(
                    row_number,
                    "CANTIDAD",
                    "数量为 0，不计入月均销量",
                ));
            }

            if let (Some(net), Some(gross)) = (number(FieldKey::NetValue), number(FieldKey::GrossValue)) {
                if gross > 0.0 && net > gross {
                    collector.warning(ValidationIssue::cell(
                        row_number,
                        "VALOR_NETO",
                        format!("净额 {} 大于总额 {}", net, gross),
                    ));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale(code: &str, qty: serde_json::Value) -> RawRow {
        let mut row = RawRow::new();
        row.insert("c_producto".to_string(), json!(code));
        row.insert("d_fecha".to_string(), json!("2024-01-15"));
        row.insert("n_cantidad".to_string(), qty);
        row.insert("n_valor_neto".to_string(), json!("1.250,00"));
        row
    }

    #[test]
    fn test_aliased_columns_are_accepted() {
        let result = SalesValidator.validate(&[sale("A1", json!(3))]);
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert_eq!(result.column_mapping.column(FieldKey::Quantity), Some("n_cantidad"));
    }

    #[test]
    fn test_zero_quantity_is_warning() {
        let result = SalesValidator.validate(&[sale("A1", json!(0))]);
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.column.as_deref() == Some("CANTIDAD")));
    }

    #[test]
    fn test_missing_quantity_column() {
        let mut row = sale("A1", json!(1));
        row.remove("n_cantidad");
        let result = SalesValidator.validate(&[row]);
        assert!(!result.is_valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.column.as_deref() == Some("CANTIDAD")));
    }

    #[test]
    fn test_unparseable_date_is_warning() {
        let mut row = sale("A1", json!(2));
        row.insert("d_fecha".to_string(), json!("sometime"));
        let result = SalesValidator.validate(&[row]);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.column.as_deref() == Some("FECHA")));
    }

    #[test]
    fn test_empty_product_code_is_error() {
        let result = SalesValidator.validate(&[sale("  ", json!(2))]);
        assert!(!result.is_valid);
    }
}
