//! 計劃期間（月）模型

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::PlanError;

/// 計劃月份
///
/// 以「年+月」表示，依時間先後排序。序列化格式為 `YYYY-MM`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// 建立月份，月必須介於 1..=12
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(PlanError::InvalidPeriod(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// 日期所在的月份
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 下一個月
    pub fn succ(self) -> Self {
        self.offset(1)
    }

    /// 上一個月
    pub fn pred(self) -> Self {
        self.offset(-1)
    }

    /// 往前/往後平移若干月
    pub fn offset(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// 與較早月份相差的月數
    pub fn months_since(self, earlier: Period) -> i32 {
        (self.year - earlier.year) * 12 + (self.month as i32 - earlier.month as i32)
    }

    /// 日期是否落在本月
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl TryFrom<String> for Period {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 解析月份標籤
///
/// 接受 `2025-07`、`2025/7`、`2025.7`、`2025年7月`，以及 `2025年7月预测` 這類帶後綴的欄位名。
impl FromStr for Period {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlanError::InvalidPeriod(s.to_string());
        let label = s.trim();

        let year_len = label.chars().take_while(|c| c.is_ascii_digit()).count();
        if year_len != 4 {
            return Err(invalid());
        }
        let (year, rest) = label.split_at(year_len);

        let mut chars = rest.chars();
        match chars.next() {
            Some('-' | '/' | '.' | '年') => {}
            _ => return Err(invalid()),
        }
        let rest = chars.as_str();

        let month_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if month_len == 0 || month_len > 2 {
            return Err(invalid());
        }
        let (month, suffix) = rest.split_at(month_len);
        if !(suffix.is_empty() || suffix.starts_with('月')) {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}

/// 晶圓廠出貨週別
///
/// 每月固定切四段：1–7、8–15、16–22、23–月底。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FabWeek {
    Wk1,
    Wk2,
    Wk3,
    Wk4,
}

impl FabWeek {
    /// 依日期的「日」決定週別
    pub fn from_day(day: u32) -> Self {
        match day {
            0..=7 => FabWeek::Wk1,
            8..=15 => FabWeek::Wk2,
            16..=22 => FabWeek::Wk3,
            _ => FabWeek::Wk4,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_day(date.day())
    }

    /// 報表欄位標籤
    pub fn label(&self) -> &'static str {
        match self {
            FabWeek::Wk1 => "WK1(1–7)",
            FabWeek::Wk2 => "WK2(8–15)",
            FabWeek::Wk3 => "WK3(16–22)",
            FabWeek::Wk4 => "WK4(23–end)",
        }
    }
}

impl fmt::Display for FabWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 計劃時界
///
/// 自錨定月起連續遞增的月份序列。最後一個月只作為前瞻月（look-ahead），
/// 不產生輸出欄位：每個報告月都需要下個月的預測/未交訂單。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    anchor: Period,
    periods: Vec<Period>,
}

impl Horizon {
    /// 空時界
    pub fn empty(anchor: Period) -> Self {
        Self {
            anchor,
            periods: Vec::new(),
        }
    }

    /// 錨定月至 `last`（含），`last` 早於錨定月時為空
    pub fn spanning(anchor: Period, last: Period) -> Self {
        if last < anchor {
            return Self::empty(anchor);
        }
        let len = last.months_since(anchor) as usize + 1;
        let periods = (0..len).map(|i| anchor.offset(i as i32)).collect();
        Self { anchor, periods }
    }

    pub fn anchor(&self) -> Period {
        self.anchor
    }

    /// 含前瞻月的全部月份
    pub fn all(&self) -> &[Period] {
        &self.periods
    }

    /// 產生輸出的報告月（不含前瞻月）
    pub fn reported(&self) -> &[Period] {
        match self.periods.len() {
            0 | 1 => &[],
            n => &self.periods[..n - 1],
        }
    }

    /// 前瞻月
    pub fn lookahead(&self) -> Option<Period> {
        if self.periods.len() > 1 {
            self.periods.last().copied()
        } else {
            None
        }
    }

    /// 沒有任何報告月
    pub fn is_empty(&self) -> bool {
        self.reported().is_empty()
    }

    /// 月份是否在時界內（含前瞻月）
    pub fn contains(&self, period: Period) -> bool {
        match (self.periods.first(), self.periods.last()) {
            (Some(first), Some(last)) => *first <= period && period <= *last,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn test_period_ordering_and_offset() {
        assert!(p(2024, 12) < p(2025, 1));
        assert_eq!(p(2024, 12).succ(), p(2025, 1));
        assert_eq!(p(2025, 1).pred(), p(2024, 12));
        assert_eq!(p(2025, 7).offset(-19), p(2023, 12));
        assert_eq!(p(2026, 2).months_since(p(2025, 7)), 7);
    }

    #[test]
    fn test_period_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        assert_eq!(Period::from_date(date), p(2025, 7));
        assert!(p(2025, 7).contains(date));
        assert!(!p(2025, 8).contains(date));
    }

    #[rstest]
    #[case("2025-07", 2025, 7)]
    #[case("2025/7", 2025, 7)]
    #[case("2025.11", 2025, 11)]
    #[case("2025年7月", 2025, 7)]
    #[case(" 2026年1月预测 ", 2026, 1)]
    fn test_parse_labels(#[case] label: &str, #[case] year: i32, #[case] month: u32) {
        assert_eq!(label.parse::<Period>().unwrap(), p(year, month));
    }

    #[rstest]
    #[case("7月预测")]
    #[case("2025-13")]
    #[case("2025-00")]
    #[case("25-07")]
    #[case("2025-07 WK2")]
    #[case("")]
    fn test_parse_rejects_invalid(#[case] label: &str) {
        assert!(label.parse::<Period>().is_err());
    }

    #[test]
    fn test_period_serde_as_label() {
        let json = serde_json::to_string(&p(2025, 7)).unwrap();
        assert_eq!(json, "\"2025-07\"");

        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p(2025, 7));
    }

    #[rstest]
    #[case(1, FabWeek::Wk1)]
    #[case(7, FabWeek::Wk1)]
    #[case(8, FabWeek::Wk2)]
    #[case(15, FabWeek::Wk2)]
    #[case(16, FabWeek::Wk3)]
    #[case(22, FabWeek::Wk3)]
    #[case(23, FabWeek::Wk4)]
    #[case(31, FabWeek::Wk4)]
    fn test_fab_week_buckets(#[case] day: u32, #[case] week: FabWeek) {
        assert_eq!(FabWeek::from_day(day), week);
    }

    #[test]
    fn test_horizon_reserves_lookahead() {
        let horizon = Horizon::spanning(p(2025, 11), p(2026, 2));

        assert_eq!(horizon.all().len(), 4);
        assert_eq!(horizon.reported(), &[p(2025, 11), p(2025, 12), p(2026, 1)]);
        assert_eq!(horizon.lookahead(), Some(p(2026, 2)));
        assert!(horizon.contains(p(2026, 2)));
        assert!(!horizon.contains(p(2026, 3)));
        assert!(!horizon.is_empty());
    }

    #[test]
    fn test_horizon_single_month_has_no_reported_periods() {
        let horizon = Horizon::spanning(p(2025, 7), p(2025, 7));

        assert!(horizon.is_empty());
        assert_eq!(horizon.lookahead(), None);
        assert!(horizon.contains(p(2025, 7)));
    }

    #[test]
    fn test_horizon_before_anchor_is_empty() {
        let horizon = Horizon::spanning(p(2025, 7), p(2025, 5));
        assert!(horizon.all().is_empty());
        assert!(!horizon.contains(p(2025, 7)));
    }
}
