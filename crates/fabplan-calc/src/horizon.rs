//! 計劃時界建立

use fabplan_core::{ForecastEntry, Horizon, Period};

/// 時界建立器
pub struct HorizonBuilder;

impl HorizonBuilder {
    /// 由預測月份建立時界：錨定月至最晚的預測月（含）
    pub fn from_periods<I>(anchor: Period, forecast_periods: I) -> Horizon
    where
        I: IntoIterator<Item = Period>,
    {
        match forecast_periods.into_iter().max() {
            Some(last) => Horizon::spanning(anchor, last),
            None => Horizon::empty(anchor),
        }
    }

    /// 由預測欄位標籤建立時界，無法解析的標籤略過
    pub fn from_labels<'a, I>(anchor: Period, labels: I) -> Horizon
    where
        I: IntoIterator<Item = &'a str>,
    {
        let periods = labels.into_iter().filter_map(|label| match label.parse::<Period>() {
            Ok(period) => Some(period),
            Err(_) => {
                tracing::debug!("略過無法解析的預測欄位: {}", label);
                None
            }
        });
        Self::from_periods(anchor, periods)
    }

    /// 由預測明細建立時界
    pub fn from_forecasts(anchor: Period, forecasts: &[ForecastEntry]) -> Horizon {
        Self::from_periods(anchor, forecasts.iter().map(|f| f.period))
    }
}
