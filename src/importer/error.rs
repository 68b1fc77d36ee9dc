// ==========================================
// 供应链洞察 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 校验从不报错（只收集问题），处理阶段单行失败中止整批
// ==========================================

use crate::domain::types::RecordType;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 校验阻断 =====
    #[error("{record_type} 数据校验未通过: {error_count} 个错误")]
    Validation {
        record_type: RecordType,
        error_count: usize,
        first_error: Option<String>,
    },

    #[error("缺少必填列: {0:?}")]
    MissingColumns(Vec<String>),

    // ===== 处理阶段（整批中止）=====
    #[error("批处理失败 (行 {row}): {message}")]
    BatchProcessing { row: usize, message: String },

    // ===== 落库 =====
    #[error("数据写入失败: {0}")]
    Storage(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 失败行号（仅处理阶段错误携带）
    pub fn failing_row(&self) -> Option<usize> {
        match self {
            ImportError::BatchProcessing { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
