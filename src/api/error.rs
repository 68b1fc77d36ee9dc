// ==========================================
// 供应链洞察 - API 层错误类型
// ==========================================
// 职责: 把导入 / 仓储 / 配置的技术错误转换为调用方可读的错误
// 说明: 重算被取消不是错误，走 ComputeOutcome::Cancelled
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 处理阶段整批中止（携带行号）
    #[error("批处理失败 (行 {row}): {message}")]
    BatchProcessingError { row: usize, message: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::RecordKeyConflict(msg) => {
                ApiError::DatabaseError(format!("记录键冲突: {}", msg))
            }
            RepositoryError::StoredValueCorrupt { column, message } => {
                ApiError::InternalError(format!("存储值损坏 (column#{}): {}", column, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Validation {
                record_type,
                error_count,
                first_error,
            } => ApiError::ValidationError(match first_error {
                Some(first) => format!("{} 共 {} 个错误，首个: {}", record_type, error_count, first),
                None => format!("{} 共 {} 个错误", record_type, error_count),
            }),
            ImportError::MissingColumns(columns) => {
                ApiError::ValidationError(format!("缺少必填列: {}", columns.join(", ")))
            }
            ImportError::BatchProcessing { row, message } => ApiError::BatchProcessingError { row, message },
            ImportError::Storage(err) => ApiError::from(err),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ApiError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
