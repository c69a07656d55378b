//! 成品投單計劃

use fabplan_core::{DemandSignals, Horizon, MonthlySeries, Pieces, PlanConfig, SkuMaster};

/// 投單遞推式
///
/// 成品與半成品共用同一條遞推：
///
/// ```text
/// plan[i] = plan[i-1] - executed[i-1] + max(forecast[i+1], open_orders[i+1])
/// ```
///
/// 只在報告月上定義，`i + 1` 最遠到前瞻月。
pub struct ReleaseRecurrence;

impl ReleaseRecurrence {
    /// 由第 0 期投單量逐月推展
    pub fn roll_forward(
        horizon: &Horizon,
        opening: Pieces,
        executed: &MonthlySeries<Pieces>,
        signals: &DemandSignals,
    ) -> MonthlySeries<Pieces> {
        let all = horizon.all();
        let reported = horizon.reported();

        let mut previous = opening;
        MonthlySeries::from_fn(reported, |i, _| {
            if i > 0 {
                previous = previous - executed.get(all[i - 1]) + signals.expected_need(all[i + 1]);
            }
            previous
        })
    }
}

/// 成品投單計劃器
pub struct FinishedGoodsPlanner<'a> {
    horizon: &'a Horizon,
    config: &'a PlanConfig,
}

impl<'a> FinishedGoodsPlanner<'a> {
    pub fn new(horizon: &'a Horizon, config: &'a PlanConfig) -> Self {
        Self { horizon, config }
    }

    /// 第 0 期需求調整
    ///
    /// 當月已實現需求（未交 + 已銷）超過預測時改用實際值，否則取 max(預測, 未交)。
    pub fn demand_adjustment(&self, signals: &DemandSignals) -> Pieces {
        let anchor = self.horizon.anchor();
        let realized = signals.realized_demand(anchor);
        if realized > signals.forecast.get(anchor) {
            realized
        } else {
            signals.expected_need(anchor)
        }
    }

    /// 第 0 期成品投單
    ///
    /// `InvPart + adj(0) + need(1) - 成品庫存 - 成品在製`，`need(1)` 取錨定月的下個月
    pub fn opening(&self, master: &SkuMaster, signals: &DemandSignals) -> Pieces {
        let next = self.horizon.anchor().succ();
        master.safety_stock.pieces + self.demand_adjustment(signals) + signals.expected_need(next)
            - master.stock.sum_of(&self.config.finished_stock_classes)
            - master.wip.finished
    }

    /// 成品投單計劃，時界為空時回傳空數列
    pub fn plan(&self, master: &SkuMaster, signals: &DemandSignals) -> MonthlySeries<Pieces> {
        if self.horizon.is_empty() {
            return MonthlySeries::new();
        }
        let opening = self.opening(master, signals);
        ReleaseRecurrence::roll_forward(
            self.horizon,
            opening,
            &signals.finished_releases,
            signals,
        )
    }
}
