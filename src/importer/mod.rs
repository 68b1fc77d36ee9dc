// ==========================================
// 供应链洞察 - 导入层
// ==========================================
// 职责: 原始行 → 校验报告 → 类型化记录 → 落库
// 输入: 上传层已解析好的行对象（列名未校验）
// ==========================================

// 模块声明
pub mod column_mapping;
pub mod data_cleaner;
pub mod error;
pub mod ingest_service;
pub mod inventory_processor;
pub mod inventory_validator;
pub mod number_parser;
pub mod period_normalizer;
pub mod record_importer_trait;
pub mod row_validator;
pub mod sales_processor;
pub mod sales_validator;

// 重导出核心类型
pub use column_mapping::{ColumnMapping, FieldKey};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use ingest_service::{IngestReport, IngestService};
pub use inventory_processor::InventoryProcessor;
pub use inventory_validator::InventoryValidator;
pub use number_parser::{parse_number, ParsedNumber};
pub use period_normalizer::{normalize_period, parse_date};
pub use sales_processor::SalesProcessor;
pub use sales_validator::SalesValidator;

// 重导出 Trait 接口
pub use record_importer_trait::{DataCleaner, RecordProcessor, RecordValidator};
