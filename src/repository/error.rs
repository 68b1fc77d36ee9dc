// ==========================================
// 供应链洞察 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 查询均返回列表，"未找到"不是错误
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    /// 自然键冲突（库存: org+编码+期间）
    #[error("记录键冲突: {0}")]
    RecordKeyConflict(String),

    /// 库中存量数据无法还原为记录（日期文本损坏、类型不符）
    #[error("存储值损坏 (column#{column}): {message}")]
    StoredValueCorrupt { column: usize, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg))
                if msg.contains("UNIQUE") || msg.contains("PRIMARY KEY") =>
            {
                RepositoryError::RecordKeyConflict(msg)
            }
            rusqlite::Error::FromSqlConversionFailure(column, _, inner) => {
                RepositoryError::StoredValueCorrupt {
                    column,
                    message: inner.to_string(),
                }
            }
            rusqlite::Error::InvalidColumnType(column, name, ty) => RepositoryError::StoredValueCorrupt {
                column,
                message: format!("{} 不是期望的类型 ({})", name, ty),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
