// ==========================================
// 供应链洞察 - 期间归一化
// ==========================================
// 职责: 自由格式日期 → 所在月份最后一天（库存快照期间）
// 支持: M/D/YYYY、ISO、YYYYMMDD、D.M.YYYY、月份名、Excel 序列号
// 兜底: 空值或无法解析时回落到当前月末，从不失败
// ==========================================

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

// 合理年份范围（排除 "1/2/24" 被读成公元 24 年）
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2200;

// Excel 1900 日期系统起点（含 1900-02-29 兼容偏移）
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y%m%d%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%m/%d/%y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

// 只有年月的格式（补日为 1 再解析）
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m/%Y", "%m-%Y", "%B %Y", "%b %Y"];

/// 期间解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodOutcome {
    pub period: NaiveDate,
    /// true 表示原值为空或无法解析，已回落到当前月末
    pub fell_back: bool,
}

/// 所在月份最后一天
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// 归一化为期间（月末），空值/非法值回落到 today 所在月末
pub fn normalize_period(value: &Value, today: NaiveDate) -> NaiveDate {
    normalize_period_checked(value, today).period
}

/// 归一化并标记是否发生回落（供校验层上报警告）
pub fn normalize_period_checked(value: &Value, today: NaiveDate) -> PeriodOutcome {
    match parse_date(value) {
        Some(date) => PeriodOutcome {
            period: month_end(date),
            fell_back: false,
        },
        None => PeriodOutcome {
            period: month_end(today),
            fell_back: true,
        },
    }
}

/// 使用本地系统日期作为兜底
pub fn normalize_period_now(value: &Value) -> NaiveDate {
    normalize_period(value, chrono::Local::now().date_naive())
}

/// 解析单元格日期（不做月末归一）
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n.as_f64().and_then(from_excel_serial),
        _ => None,
    }
}

/// 解析日期字符串
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return sane(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(date) = sane(dt.date()) {
                return Some(date);
            }
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(date) = sane(date) {
                return Some(date);
            }
        }
    }

    let padded = format!("{} 01", s);
    for fmt in MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&padded, &format!("{} %d", fmt)) {
            if let Some(date) = sane(date) {
                return Some(date);
            }
        }
    }

    None
}

fn sane(date: NaiveDate) -> Option<NaiveDate> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Some(date)
    } else {
        None
    }
}

/// Excel 序列号 → 日期（小数部分为时间，忽略）
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 2, 1)), d(2023, 2, 28));
        assert_eq!(month_end(d(2024, 12, 5)), d(2024, 12, 31));
        assert_eq!(month_end(d(2024, 4, 30)), d(2024, 4, 30));
    }

    #[test]
    fn test_us_slash_format() {
        let today = d(2030, 1, 1);
        assert_eq!(normalize_period(&json!("3/15/2024"), today), d(2024, 3, 31));
        assert_eq!(normalize_period(&json!("11/2/2023"), today), d(2023, 11, 30));
    }

    #[test]
    fn test_iso_and_datetime_formats() {
        let today = d(2030, 1, 1);
        assert_eq!(normalize_period(&json!("2024-06-01"), today), d(2024, 6, 30));
        assert_eq!(
            normalize_period(&json!("2024-06-01T10:30:00Z"), today),
            d(2024, 6, 30)
        );
        assert_eq!(
            normalize_period(&json!("2024-06-01 08:00:00"), today),
            d(2024, 6, 30)
        );
        assert_eq!(normalize_period(&json!("20240105"), today), d(2024, 1, 31));
    }

    #[test]
    fn test_free_form_formats() {
        let today = d(2030, 1, 1);
        assert_eq!(normalize_period(&json!("2024-09"), today), d(2024, 9, 30));
        assert_eq!(normalize_period(&json!("March 2024"), today), d(2024, 3, 31));
        assert_eq!(normalize_period(&json!("25.12.2023"), today), d(2023, 12, 31));
        assert_eq!(normalize_period(&json!("1/2/24"), today), d(2024, 1, 31));
    }

    #[test]
    fn test_excel_serial_number() {
        // 45292 = 2024-01-01
        assert_eq!(normalize_period(&json!(45292), d(2030, 1, 1)), d(2024, 1, 31));
    }

    #[test]
    fn test_garbage_falls_back_to_current_month_end() {
        let today = d(2024, 2, 14);
        let outcome = normalize_period_checked(&json!("not a date"), today);
        assert!(outcome.fell_back);
        assert_eq!(outcome.period, d(2024, 2, 29));

        assert_eq!(normalize_period(&json!(""), today), d(2024, 2, 29));
        assert_eq!(normalize_period(&json!(null), today), d(2024, 2, 29));
        assert_eq!(normalize_period(&json!(false), today), d(2024, 2, 29));
    }

    #[test]
    fn test_result_is_always_month_end() {
        let today = d(2024, 7, 3);
        for raw in ["1/1/2020", "2021-02-15", "garbage", "2022/10/09", "7/4/1999"] {
            let period = normalize_period(&json!(raw), today);
            assert_eq!(period, month_end(period), "input {}", raw);
        }
    }
}
