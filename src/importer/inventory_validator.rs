// ==========================================
// 供应链洞察 - 库存数据校验器
// ==========================================
// 职责: 必填列检查 + 抽样类型校验 + 库存特有的警告
// 警告: 负余额/负成本（处理阶段截断为 0）、期初+入库-出库 与期末不一致
// ==========================================

use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use crate::domain::validation::{ValidationIssue, ValidationResult};
use crate::importer::column_mapping::FieldKey;
use crate::importer::number_parser::{parse_number, ParsedNumber};
use crate::importer::record_importer_trait::RecordValidator;
use crate::importer::row_validator::validate_rows;

/// 余额勾稽容差
const BALANCE_TOLERANCE: f64 = 0.01;

pub struct InventoryValidator;

impl RecordValidator for InventoryValidator {
    fn record_type(&self) -> RecordType {
        RecordType::Inventory
    }

    fn validate(&self, rows: &[RawRow]) -> ValidationResult {
        validate_rows(RecordType::Inventory, rows, |row_number, row, mapping, collector| {
            let number = |key: FieldKey| match mapping.value(row, key).map(parse_number) {
                Some(ParsedNumber::Value(v)) => Some(v),
                _ => None,
            };

            // 负值检查
            for (key, label) in [
                (FieldKey::PreviousBalance, "SALDO_ANTERIOR"),
                (FieldKey::CurrentBalance, "SALDO_ACTUAL"),
                (FieldKey::AverageCost, "COSTO_PROMEDIO"),
                (FieldKey::LastCost, "ULTIMO_COSTO"),
            ] {
                if let Some(v) = number(key) {
                    if v < 0.0 {
                        collector.warning(ValidationIssue::cell(
                            row_number,
                            label,
                            format!("负值 {} 将按 0 处理", v),
                        ));
                    }
                }
            }

            // 余额勾稽
            if let (Some(prev), Some(entries), Some(exits), Some(current)) = (
                number(FieldKey::PreviousBalance),
                number(FieldKey::Entries),
                number(FieldKey::Exits),
                number(FieldKey::CurrentBalance),
            ) {
                let expected = prev + entries - exits;
                if (expected - current).abs() > BALANCE_TOLERANCE {
                    collector.warning(ValidationIssue::cell(
                        row_number,
                        "SALDO_ACTUAL",
                        format!(
                            "期末余额 {} 与 期初+入库-出库 = {} 不一致",
                            current, expected
                        ),
                    ));
                }
            }
        })
    }
}
