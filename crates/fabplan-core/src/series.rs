//! 月度數列

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::units::Quantity;

/// 月度數列：月份 → 數量
///
/// 缺少的月份一律視為零，不會傳遞空值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries<Q> {
    values: BTreeMap<Period, Q>,
}

impl<Q> Default for MonthlySeries<Q> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<Q: Quantity> MonthlySeries<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依月份逐一計算建立數列
    pub fn from_fn(periods: &[Period], mut f: impl FnMut(usize, Period) -> Q) -> Self {
        let values = periods
            .iter()
            .enumerate()
            .map(|(i, &period)| (period, f(i, period)))
            .collect();
        Self { values }
    }

    /// 取值，缺月為零
    pub fn get(&self, period: Period) -> Q {
        self.values.get(&period).copied().unwrap_or(Q::ZERO)
    }

    /// 設定（覆寫）某月的值
    pub fn set(&mut self, period: Period, quantity: Q) {
        self.values.insert(period, quantity);
    }

    /// 累加到某月
    pub fn add(&mut self, period: Period, quantity: Q) {
        let entry = self.values.entry(period).or_insert(Q::ZERO);
        *entry = *entry + quantity;
    }

    /// 逐月加上另一個數列
    pub fn accumulate(&mut self, other: &MonthlySeries<Q>) {
        for (&period, &quantity) in &other.values {
            self.add(period, quantity);
        }
    }

    /// 已明確記錄的月份
    pub fn iter(&self) -> impl Iterator<Item = (Period, Q)> + '_ {
        self.values.iter().map(|(&p, &q)| (p, q))
    }

    /// 依指定月份順序取值（缺月補零）
    pub fn values_over<'a>(&'a self, periods: &'a [Period]) -> impl Iterator<Item = Q> + 'a {
        periods.iter().map(move |&p| self.get(p))
    }

    /// 只保留指定月份
    pub fn restricted_to(&self, periods: &[Period]) -> Self {
        Self::from_fn(periods, |_, p| self.get(p))
    }

    /// 累計數列（逐月前綴和）
    pub fn running_total(&self, periods: &[Period]) -> Self {
        let mut total = Q::ZERO;
        Self::from_fn(periods, |_, p| {
            total = total + self.get(p);
            total
        })
    }

    /// 所有記錄值的總和
    pub fn total(&self) -> Q {
        self.values.values().copied().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.values.keys().copied()
    }
}

impl<Q: Quantity> FromIterator<(Period, Q)> for MonthlySeries<Q> {
    fn from_iter<I: IntoIterator<Item = (Period, Q)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (period, quantity) in iter {
            series.add(period, quantity);
        }
        series
    }
}
