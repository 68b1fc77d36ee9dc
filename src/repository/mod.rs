// ==========================================
// 供应链洞察 - 仓储层
// ==========================================
// 职责: 源记录持久化协作接口 + SQLite 参考实现
// 红线: Repository 不含业务规则
// ==========================================

pub mod error;
pub mod record_repo;
pub mod record_repo_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use record_repo::RecordRepository;
pub use record_repo_impl::RecordRepositoryImpl;
