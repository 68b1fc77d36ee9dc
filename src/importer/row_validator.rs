// ==========================================
// 供应链洞察 - 行校验公共逻辑
// ==========================================
// 职责: 列完整性检查 + 抽样类型校验 + 问题数量上限
// 说明: 只抽样前 SAMPLE_ROWS 行，超出部分的问题可能不会被报告
// ==========================================

use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use crate::domain::validation::{ValidationIssue, ValidationResult};
use crate::importer::column_mapping::{
    collect_headers, field_specs, ColumnMapping, FieldKind, FieldSpec,
};
use crate::importer::number_parser::{parse_number, ParsedNumber};
use crate::importer::period_normalizer::parse_date;
use serde_json::Value;
use tracing::debug;

/// 类型校验抽样行数
pub const SAMPLE_ROWS: usize = 100;
/// 错误 / 警告各自的报告上限
pub const MAX_REPORTED_ISSUES: usize = 50;
/// 预览行数
pub const PREVIEW_ROWS: usize = 5;

// ==========================================
// IssueCollector - 带上限的问题收集器
// ==========================================
#[derive(Debug, Default)]
pub struct IssueCollector {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    total_errors: usize,
    total_warnings: usize,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, issue: ValidationIssue) {
        self.total_errors += 1;
        if self.errors.len() < MAX_REPORTED_ISSUES {
            self.errors.push(issue);
        }
    }

    pub fn warning(&mut self, issue: ValidationIssue) {
        self.total_warnings += 1;
        if self.warnings.len() < MAX_REPORTED_ISSUES {
            self.warnings.push(issue);
        }
    }

    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    /// 收尾: 超出上限时追加截断提示（提示放在 warnings 中）
    pub fn finish(mut self) -> (Vec<ValidationIssue>, Vec<ValidationIssue>, usize) {
        let hidden_errors = self.total_errors.saturating_sub(self.errors.len());
        let hidden_warnings = self.total_warnings.saturating_sub(self.warnings.len());
        if hidden_errors > 0 {
            self.warnings.push(ValidationIssue::general(format!(
                "另有 {} 个错误未列出（仅报告前 {} 个）",
                hidden_errors, MAX_REPORTED_ISSUES
            )));
        }
        if hidden_warnings > 0 {
            self.warnings.push(ValidationIssue::general(format!(
                "另有 {} 个警告未列出（仅报告前 {} 个）",
                hidden_warnings, MAX_REPORTED_ISSUES
            )));
        }
        (self.errors, self.warnings, self.total_errors)
    }
}

/// 整行是否为空（所有值为 null 或空白串）
pub fn is_blank_row(row: &RawRow) -> bool {
    row.values().all(|v| match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// 单元格的展示文本
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 公共校验流程
///
/// # 参数
/// - record_type: 记录类型（决定映射表）
/// - rows: 原始行
/// - row_check: 类型特有的逐行检查（行号从 1 开始）
pub fn validate_rows<F>(record_type: RecordType, rows: &[RawRow], mut row_check: F) -> ValidationResult
where
    F: FnMut(usize, &RawRow, &ColumnMapping, &mut IssueCollector),
{
    let headers = collect_headers(rows);
    let mapping = ColumnMapping::resolve(record_type, &headers);
    let mut collector = IssueCollector::new();

    if rows.is_empty() {
        collector.error(ValidationIssue::general("文件无数据行"));
    }

    // === 列完整性 ===
    for missing in &mapping.missing_required {
        collector.error(ValidationIssue::column(missing.clone(), "缺少必填列"));
    }
    for extra in &mapping.unmapped_columns {
        collector.warning(ValidationIssue::column(extra.clone(), "未识别的列，将被忽略"));
    }

    // === 抽样类型校验 ===
    if mapping.is_complete() {
        for (idx, row) in rows.iter().take(SAMPLE_ROWS).enumerate() {
            let row_number = idx + 1;
            if is_blank_row(row) {
                collector.warning(ValidationIssue {
                    row_number: Some(row_number),
                    column: None,
                    message: "空行，将被跳过".to_string(),
                });
                continue;
            }
            for spec in field_specs(record_type) {
                check_field(row_number, row, spec, &mapping, &mut collector);
            }
            row_check(row_number, row, &mapping, &mut collector);
        }
    }

    let (errors, warnings, total_errors) = collector.finish();
    let is_valid = total_errors == 0;

    debug!(
        record_type = %record_type,
        rows = rows.len(),
        columns = headers.len(),
        errors = total_errors,
        warnings = warnings.len(),
        is_valid,
        "校验完成"
    );

    ValidationResult {
        record_type,
        is_valid,
        errors,
        warnings,
        row_count: rows.len(),
        column_count: headers.len(),
        preview: rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        column_mapping: mapping,
    }
}

/// 单字段类型检查
fn check_field(
    row_number: usize,
    row: &RawRow,
    spec: &FieldSpec,
    mapping: &ColumnMapping,
    collector: &mut IssueCollector,
) {
    let Some(column) = mapping.column(spec.key) else {
        return;
    };
    let value = row.get(column).unwrap_or(&Value::Null);

    match spec.kind {
        FieldKind::Number => match parse_number(value) {
            ParsedNumber::Value(_) => {}
            ParsedNumber::Blank => {
                if spec.required {
                    collector.warning(ValidationIssue::cell(row_number, spec.label, "空值按 0 处理"));
                }
            }
            ParsedNumber::Invalid(raw) => {
                let issue =
                    ValidationIssue::cell(row_number, spec.label, format!("无法解析为数值: {}", raw));
                if spec.critical {
                    collector.error(issue);
                } else {
                    collector.warning(issue);
                }
            }
        },
        FieldKind::Date => {
            if parse_date(value).is_none() {
                collector.warning(ValidationIssue::cell(
                    row_number,
                    spec.label,
                    format!("无法解析日期 '{}'，将使用当前日期", display_value(value)),
                ));
            }
        }
        FieldKind::Text => {
            if mapping.text(row, spec.key).is_none() {
                let issue = ValidationIssue::cell(row_number, spec.label, "值为空");
                if spec.critical {
                    collector.error(issue);
                } else if spec.required {
                    collector.warning(issue);
                }
            }
        }
    }
}
