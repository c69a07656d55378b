//! 需求/實績彙總

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fabplan_core::{
    ArrivalRecord, DemandSignals, ForecastEntry, Horizon, OpenOrder, Period, Quantity,
    ReleaseRecord, SaleRecord, Stage,
};

/// 需求彙總器
///
/// 將各來源明細按（料號, 月）做分組加總。主檔中的每個料號都會得到完整的訊號組，
/// 沒有資料的月份為零；主檔以外的料號略過並記錄筆數。
pub struct DemandAggregator<'a> {
    horizon: &'a Horizon,
    signals: BTreeMap<String, DemandSignals>,
    dropped: usize,
}

impl<'a> DemandAggregator<'a> {
    /// 以主檔料號建立彙總器
    pub fn new<I, S>(horizon: &'a Horizon, part_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let signals = part_ids
            .into_iter()
            .map(|id| (id.into(), DemandSignals::default()))
            .collect();
        Self {
            horizon,
            signals,
            dropped: 0,
        }
    }

    /// 預測：直接按標示月份讀入
    pub fn add_forecasts(&mut self, forecasts: &[ForecastEntry]) -> &mut Self {
        for entry in forecasts {
            self.bucket(&entry.part_id, Some(entry.period), entry.quantity, |s| {
                &mut s.forecast
            });
        }
        self
    }

    /// 未交訂單：按預交月分桶，早於錨定月者全數併入錨定月
    pub fn add_open_orders(&mut self, orders: &[OpenOrder]) -> &mut Self {
        let anchor = self.horizon.anchor();
        for order in orders {
            let period = Period::from_date(order.due_date).max(anchor);
            self.bucket(&order.part_id, Some(period), order.quantity, |s| {
                &mut s.open_orders
            });
        }
        self
    }

    /// 實際投單：依階段分別累計
    pub fn add_releases(&mut self, releases: &[ReleaseRecord]) -> &mut Self {
        for release in releases {
            let period = self.historical_period(release.order_date);
            match release.stage {
                Stage::Finished => {
                    self.bucket(&release.part_id, period, release.quantity, |s| {
                        &mut s.finished_releases
                    })
                }
                Stage::SemiFinished => {
                    self.bucket(&release.part_id, period, release.quantity, |s| {
                        &mut s.semi_releases
                    })
                }
            }
        }
        self
    }

    /// 回貨實際
    pub fn add_arrivals(&mut self, arrivals: &[ArrivalRecord]) -> &mut Self {
        for arrival in arrivals {
            let period = self.historical_period(arrival.arrival_date);
            self.bucket(&arrival.part_id, period, arrival.quantity, |s| {
                &mut s.arrivals
            });
        }
        self
    }

    /// 銷貨：數量與金額
    pub fn add_sales(&mut self, sales: &[SaleRecord]) -> &mut Self {
        for sale in sales {
            let period = self.historical_period(sale.trade_date);
            self.bucket(&sale.part_id, period, sale.quantity, |s| {
                &mut s.sales_quantity
            });
            self.bucket(&sale.part_id, period, sale.amount, |s| &mut s.sales_amount);
        }
        self
    }

    /// 因料號不在主檔而略過的筆數
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn finish(self) -> BTreeMap<String, DemandSignals> {
        if self.dropped > 0 {
            tracing::debug!("彙總略過主檔以外的明細 {} 筆", self.dropped);
        }
        self.signals
    }

    /// 歷史實績只保留時界內的月份
    fn historical_period(&self, date: NaiveDate) -> Option<Period> {
        Some(Period::from_date(date)).filter(|p| self.horizon.contains(*p))
    }

    fn bucket<Q, F>(&mut self, part_id: &str, period: Option<Period>, quantity: Q, field: F)
    where
        Q: Quantity,
        F: FnOnce(&mut DemandSignals) -> &mut fabplan_core::MonthlySeries<Q>,
    {
        let Some(period) = period.filter(|p| self.horizon.contains(*p)) else {
            return;
        };
        match self.signals.get_mut(part_id.trim()) {
            Some(signals) => field(signals).add(period, quantity),
            None => self.dropped += 1,
        }
    }
}
