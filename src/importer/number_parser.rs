// ==========================================
// 供应链洞察 - 数值解析器
// ==========================================
// 职责: 自由格式数值字符串 → f64，兼容美式 (1,234.56) 与欧式 (1.234,56)
// 规则:
// 1. 去掉货币符号与空白
// 2. 同时存在 ',' 与 '.' 时，最后出现的那个是小数点，另一个是千分位
// 3. 仅有一个 ',' 时视为小数点（"1,234" 会被读作 1.234，已知局限）
// 4. 多个同种分隔符且无另一种时视为千分位
// 结果带标签: 解析失败不抛错，由调用方决定替换为 0 还是上报警告
// ==========================================

use serde_json::Value;

/// 数值解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNumber {
    /// 解析成功（有限值）
    Value(f64),
    /// 空串 / null
    Blank,
    /// 无法解析，保留原始文本
    Invalid(String),
}

impl ParsedNumber {
    /// 下游计算使用的值：空与非法均替换为 0
    pub fn or_zero(&self) -> f64 {
        match self {
            ParsedNumber::Value(v) => *v,
            ParsedNumber::Blank | ParsedNumber::Invalid(_) => 0.0,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ParsedNumber::Invalid(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ParsedNumber::Blank)
    }
}

/// 解析松散类型的单元格值
pub fn parse_number(value: &Value) -> ParsedNumber {
    match value {
        Value::Null => ParsedNumber::Blank,
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => ParsedNumber::Value(v),
            _ => ParsedNumber::Invalid(n.to_string()),
        },
        Value::String(s) => parse_number_str(s),
        other => ParsedNumber::Invalid(other.to_string()),
    }
}

/// 解析并直接返回可参与计算的值（永不失败）
pub fn to_number(value: &Value) -> f64 {
    parse_number(value).or_zero()
}

/// 解析数值字符串
pub fn parse_number_str(raw: &str) -> ParsedNumber {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedNumber::Blank;
    }

    // 无逗号时先尝试直接解析（保留科学计数法如 1.5E3）
    if !trimmed.contains(',') {
        if let Ok(v) = trimmed.parse::<f64>() {
            if v.is_finite() {
                return ParsedNumber::Value(v);
            }
        }
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return ParsedNumber::Invalid(raw.to_string());
    }

    let normalized = normalize_separators(&cleaned);

    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => ParsedNumber::Value(v),
        _ => ParsedNumber::Invalid(raw.to_string()),
    }
}

/// 统一小数点为 '.' 并去掉千分位
fn normalize_separators(cleaned: &str) -> String {
    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');

    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                // 欧式: '.' 千分位, ',' 小数点
                cleaned.replace('.', "").replace(',', ".")
            } else {
                // 美式: ',' 千分位, '.' 小数点
                cleaned.replace(',', "")
            }
        }
        (Some(_), None) => {
            if cleaned.matches(',').count() == 1 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) => {
            if cleaned.matches('.').count() > 1 {
                cleaned.replace('.', "")
            } else {
                cleaned.to_string()
            }
        }
        (None, None) => cleaned.to_string(),
    }
}
