// ==========================================
// 供应链洞察 - 校验报告模型
// ==========================================
// validate 只收集问题，从不抛错
// ==========================================

use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use crate::importer::column_mapping::ColumnMapping;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单条校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row_number: Option<usize>, // 1 起始；列级问题为 None
    pub column: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn column(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row_number: None,
            column: Some(column.into()),
            message: message.into(),
        }
    }

    pub fn cell(row_number: usize, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row_number: Some(row_number),
            column: Some(column.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            row_number: None,
            column: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row_number, &self.column) {
            (Some(row), Some(col)) => write!(f, "行 {} 列 {}: {}", row, col, self.message),
            (None, Some(col)) => write!(f, "列 {}: {}", col, self.message),
            (Some(row), None) => write!(f, "行 {}: {}", row, self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

// ==========================================
// ValidationResult - 校验报告
// ==========================================
// is_valid=false 仅当必填列缺失或关键字段无法解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub record_type: RecordType,
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub row_count: usize,
    pub column_count: usize,
    pub preview: Vec<RawRow>,
    /// 解析好的列映射，处理阶段直接复用
    pub column_mapping: ColumnMapping,
}
