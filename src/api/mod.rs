// ==========================================
// 供应链洞察 - API 层
// ==========================================
// 职责: 面向调用方的门面（导入 + 分析），统一错误类型
// ==========================================

pub mod analytics_api;
pub mod error;

pub use analytics_api::{AnalyticsApi, Shared};
pub use error::{ApiError, ApiResult};
