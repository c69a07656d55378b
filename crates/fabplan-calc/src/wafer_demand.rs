//! 投單計劃 → 晶圓需求換算

use fabplan_core::{Die, Horizon, MonthlySeries, Pieces, SkuPlan};

/// 晶圓需求換算器
///
/// 投單計劃是累計的目標量，這裡做一階差分還原成每月的增量需求。
/// 差分可能為負（目標下修），保留負值讓分配階段自行抵銷。
pub struct WaferDemandTranslator;

impl WaferDemandTranslator {
    /// 合計各料號的驅動投單計劃（有半成品計劃者用半成品）
    pub fn combined_release<'p, I>(horizon: &Horizon, consumers: I) -> MonthlySeries<Pieces>
    where
        I: IntoIterator<Item = &'p SkuPlan>,
    {
        let mut combined = MonthlySeries::from_fn(horizon.reported(), |_, _| Pieces::ZERO);
        for plan in consumers {
            combined.accumulate(&plan.driving_release().restricted_to(horizon.reported()));
        }
        combined
    }

    /// 每月晶圓需求（晶粒）
    ///
    /// `demand[0] = release[0] - ΣInvPart`，`demand[i] = release[i] - release[i-1]`。
    pub fn translate(
        horizon: &Horizon,
        combined_release: &MonthlySeries<Pieces>,
        safety_stock_pieces: Pieces,
    ) -> MonthlySeries<Die> {
        let reported = horizon.reported();
        MonthlySeries::from_fn(reported, |i, period| {
            let current = combined_release.get(period);
            let previous = if i == 0 {
                safety_stock_pieces
            } else {
                combined_release.get(reported[i - 1])
            };
            (current - previous).as_die()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabplan_core::{DemandSignals, PackagingInfo, Period, SafetyStock};

    fn p(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    fn sku_plan(part_id: &str, finished: &[i64], semi: Option<&[i64]>) -> SkuPlan {
        let series = |values: &[i64]| {
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (p(7 + i as u32), Pieces::from(v)))
                .collect::<MonthlySeries<Pieces>>()
        };
        SkuPlan {
            part_id: part_id.to_string(),
            wafer_id: Some("W1".to_string()),
            packaging: PackagingInfo::default(),
            safety_stock: SafetyStock::default(),
            signals: DemandSignals::default(),
            finished_release: series(finished),
            semi_release: semi.map(series),
        }
    }

    #[test]
    fn test_first_difference_keeps_negatives() {
        let horizon = Horizon::spanning(p(7), p(11));
        let plans = vec![
            sku_plan("A", &[400, 500, 450, 450], None),
            sku_plan("B", &[999, 999, 999, 999], Some(&[100, 100, 80, 120])),
        ];

        let combined = WaferDemandTranslator::combined_release(&horizon, &plans);
        assert_eq!(combined.get(p(7)), Pieces::from(500));

        let demand = WaferDemandTranslator::translate(&horizon, &combined, Pieces::from(150));

        assert_eq!(demand.get(p(7)), Die::from(350));
        assert_eq!(demand.get(p(8)), Die::from(100));
        assert_eq!(demand.get(p(9)), Die::from(-70));
        assert_eq!(demand.get(p(10)), Die::from(40));
        assert_eq!(demand.len(), 4);
    }

    #[test]
    fn test_no_consumers_gives_zero_demand() {
        let horizon = Horizon::spanning(p(7), p(9));
        let combined = WaferDemandTranslator::combined_release(&horizon, std::iter::empty());
        let demand = WaferDemandTranslator::translate(&horizon, &combined, Pieces::ZERO);

        assert_eq!(demand.len(), 2);
        assert_eq!(demand.total(), Die::ZERO);
    }
}
