// ==========================================
// 供应链洞察 - 记录导入 Trait
// ==========================================
// 职责: 定义校验 / 处理 / 清洗接口（不包含实现）
// 约定: validate 从不失败；process 单行失败中止整批
// ==========================================

use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use crate::domain::validation::ValidationResult;
use crate::importer::column_mapping::ColumnMapping;
use crate::importer::error::ImportResult;

// ==========================================
// RecordValidator Trait
// ==========================================
// 实现者: InventoryValidator, SalesValidator
pub trait RecordValidator: Send + Sync {
    /// 校验的记录类型
    fn record_type(&self) -> RecordType;

    /// 校验原始行
    ///
    /// # 返回
    /// - ValidationResult: 错误/警告列表、行列数、预览与解析好的列映射
    ///
    /// # 说明
    /// - 只抽样前 100 行做类型校验，错误最多报告 50 条
    /// - 问题只收集不抛出，是否阻断由调用方决定
    fn validate(&self, rows: &[RawRow]) -> ValidationResult;
}

// ==========================================
// RecordProcessor Trait
// ==========================================
// 实现者: InventoryProcessor, SalesProcessor
pub trait RecordProcessor: Send + Sync {
    type Record;

    /// 原始行 → 类型化记录
    ///
    /// # 参数
    /// - rows: 原始行
    /// - mapping: 校验阶段解析好的列映射
    ///
    /// # 返回
    /// - Err(ImportError::BatchProcessing): 任一行转换失败，整批中止（携带行号）
    fn process(&self, rows: &[RawRow], mapping: &ColumnMapping) -> ImportResult<Vec<Self::Record>>;

    /// 按自然键去重（文件中靠后的行覆盖靠前的行）
    fn transform(&self, records: Vec<Self::Record>) -> Vec<Self::Record>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 去空白，可选转大写
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 空白串标准化为 None
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 负值截断为 0（余额/成本）
    fn non_negative(&self, value: f64) -> f64;
}
