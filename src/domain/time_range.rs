// ==========================================
// 供应链洞察 - 销售聚合时间窗
// ==========================================
// 调用方传入 {start_date, end_date} 或 {days}
// ==========================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeRange {
    /// 显式起止日期（闭区间）
    Between {
        #[serde(alias = "startDate")]
        start_date: NaiveDate,
        #[serde(alias = "endDate")]
        end_date: NaiveDate,
    },
    /// 截至今天的最近 N 天
    LastDays { days: u32 },
}

impl TimeRange {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        TimeRange::Between {
            start_date,
            end_date,
        }
    }

    pub fn last_days(days: u32) -> Self {
        TimeRange::LastDays { days }
    }

    /// 解析为具体闭区间，起止颠倒时自动交换
    pub fn resolve(&self, today: NaiveDate) -> ResolvedRange {
        match *self {
            TimeRange::Between {
                start_date,
                end_date,
            } => {
                if start_date <= end_date {
                    ResolvedRange {
                        start: start_date,
                        end: end_date,
                    }
                } else {
                    ResolvedRange {
                        start: end_date,
                        end: start_date,
                    }
                }
            }
            TimeRange::LastDays { days } => ResolvedRange {
                // 超出日期范围时退到最早可表示日期
                start: today
                    .checked_sub_signed(Duration::days(days.saturating_sub(1) as i64))
                    .unwrap_or(NaiveDate::MIN),
                end: today,
            },
        }
    }
}

/// 已解析的闭区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_last_days_inclusive() {
        let range = TimeRange::last_days(30).resolve(d(2024, 3, 31));
        assert_eq!(range.start, d(2024, 3, 2));
        assert_eq!(range.end, d(2024, 3, 31));
        assert!(range.contains(d(2024, 3, 2)));
        assert!(!range.contains(d(2024, 3, 1)));
    }

    #[test]
    fn test_huge_day_count_saturates_at_min_date() {
        let range = TimeRange::last_days(u32::MAX).resolve(d(2024, 1, 31));
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.end, d(2024, 1, 31));
        assert!(range.contains(d(1900, 1, 1)));
    }

    #[test]
    fn test_between_swaps_reversed_bounds() {
        let range = TimeRange::between(d(2024, 5, 1), d(2024, 1, 1)).resolve(d(2024, 6, 1));
        assert_eq!(range.start, d(2024, 1, 1));
        assert_eq!(range.end, d(2024, 5, 1));
    }

    #[test]
    fn test_deserialize_both_shapes() {
        let explicit: TimeRange =
            serde_json::from_str(r#"{"startDate":"2024-01-01","endDate":"2024-03-31"}"#).unwrap();
        assert_eq!(explicit, TimeRange::between(d(2024, 1, 1), d(2024, 3, 31)));

        let days: TimeRange = serde_json::from_str(r#"{"days":90}"#).unwrap();
        assert_eq!(days, TimeRange::last_days(90));
    }
}
