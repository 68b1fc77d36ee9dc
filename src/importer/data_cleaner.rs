// ==========================================
// 供应链洞察 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 非负截断
// ==========================================

use crate::importer::record_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn non_negative(&self, value: f64) -> f64 {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

impl DataCleaner {
    /// 商品编码: TRIM + UPPER，内部连续空白压缩为一个
    pub fn clean_product_code(&self, value: &str) -> String {
        self.clean_text(value, true)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 可选维度字段（组、区域、客户）: TRIM + NULL 标准化
    pub fn clean_dimension(&self, value: Option<String>) -> Option<String> {
        self.normalize_null(value.map(|v| self.clean_text(&v, false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  hello  ", false), "hello");
        assert_eq!(cleaner.clean_text("  hello  ", true), "HELLO");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(cleaner.normalize_null(Some("".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_non_negative() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.non_negative(-3.5), 0.0);
        assert_eq!(cleaner.non_negative(12.0), 12.0);
        assert_eq!(cleaner.non_negative(f64::NAN), 0.0);
    }

    #[test]
    fn test_clean_product_code() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_product_code("  ab  12 "), "AB 12");
        assert_eq!(
            cleaner.clean_dimension(Some("  Norte ".to_string())),
            Some("Norte".to_string())
        );
        assert_eq!(cleaner.clean_dimension(Some("   ".to_string())), None);
    }
}
