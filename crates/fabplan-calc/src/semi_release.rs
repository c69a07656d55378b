//! 半成品投單計劃

use std::collections::{BTreeMap, BTreeSet};

use fabplan_core::{DemandSignals, Horizon, MonthlySeries, Pieces, PlanConfig, SkuMaster};

use crate::release::ReleaseRecurrence;

/// 半成品對應關係
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemiFinishedMapping {
    /// 需要半成品計劃的料號：半成品本身及其對應的新料號
    pub participants: BTreeSet<String>,
    /// 標記為半成品但對應料號空白或不在主檔中的料號 → 原始對應值
    pub unmapped: BTreeMap<String, String>,
}

impl SemiFinishedMapping {
    /// 依主檔建立對應關係
    pub fn from_masters(masters: &[SkuMaster]) -> Self {
        let known: BTreeSet<&str> = masters.iter().map(|m| m.part_id.as_str()).collect();
        let mut mapping = Self::default();

        for master in masters.iter().filter(|m| m.is_semi_finished()) {
            match master.semi_finished_target() {
                Some(target) if known.contains(target) => {
                    mapping.participants.insert(master.part_id.clone());
                    mapping.participants.insert(target.to_string());
                }
                _ => {
                    let raw = master.semi_finished_of.clone().unwrap_or_default();
                    mapping.unmapped.insert(master.part_id.clone(), raw);
                }
            }
        }

        mapping
    }

    pub fn participates(&self, part_id: &str) -> bool {
        self.participants.contains(part_id)
    }
}

/// 半成品投單計劃器
pub struct SemiFinishedPlanner<'a> {
    horizon: &'a Horizon,
    config: &'a PlanConfig,
}

impl<'a> SemiFinishedPlanner<'a> {
    pub fn new(horizon: &'a Horizon, config: &'a PlanConfig) -> Self {
        Self { horizon, config }
    }

    /// 半成品投單計劃
    ///
    /// `semi[0] = fg[0] - 半成品庫存 - 半成品在製`，之後與成品共用遞推式，
    /// 扣減的是半成品實際投單。
    pub fn plan(
        &self,
        master: &SkuMaster,
        signals: &DemandSignals,
        finished_release: &MonthlySeries<Pieces>,
    ) -> MonthlySeries<Pieces> {
        if self.horizon.is_empty() {
            return MonthlySeries::new();
        }
        let opening = finished_release.get(self.horizon.anchor())
            - master.stock.sum_of(&self.config.semi_stock_classes)
            - master.wip.semi_finished;

        ReleaseRecurrence::roll_forward(self.horizon, opening, &signals.semi_releases, signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::FinishedGoodsPlanner;
    use fabplan_core::{Period, Stage, WarehouseClass};

    fn p(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    #[test]
    fn test_mapping_collects_both_ends() {
        let masters = vec![
            SkuMaster::new("NEW-A"),
            SkuMaster::new("SEMI-A").with_semi_finished_of(" NEW-A "),
            SkuMaster::new("SEMI-X").with_semi_finished_of("MISSING"),
            SkuMaster::new("SEMI-Y").with_semi_finished_of("  "),
            SkuMaster::new("PLAIN"),
        ];

        let mapping = SemiFinishedMapping::from_masters(&masters);

        assert!(mapping.participates("NEW-A"));
        assert!(mapping.participates("SEMI-A"));
        assert!(!mapping.participates("PLAIN"));
        assert!(!mapping.participates("SEMI-X"));
        assert_eq!(mapping.unmapped.len(), 2);
        assert_eq!(mapping.unmapped["SEMI-X"], "MISSING");
        assert_eq!(mapping.unmapped["SEMI-Y"], "  ");
    }

    #[test]
    fn test_semi_plan_follows_finished_opening() {
        let horizon = Horizon::spanning(p(7), p(10));
        let config = PlanConfig::new(p(7));
        let master = SkuMaster::new("A")
            .with_stock(WarehouseClass::SemiFinished, Pieces::from(40))
            .with_wip(Stage::SemiFinished, Pieces::from(10));

        let mut signals = DemandSignals::default();
        for (month, qty) in [(7, 100), (8, 100), (9, 90), (10, 70)] {
            signals.forecast.set(p(month), Pieces::from(qty));
        }
        signals.semi_releases.set(p(7), Pieces::from(50));
        signals.finished_releases.set(p(7), Pieces::from(999));

        let finished = FinishedGoodsPlanner::new(&horizon, &config).plan(&master, &signals);
        let semi = SemiFinishedPlanner::new(&horizon, &config).plan(&master, &signals, &finished);

        assert_eq!(finished.get(p(7)), Pieces::from(200));
        // 200 - 40 - 10
        assert_eq!(semi.get(p(7)), Pieces::from(150));
        // 150 - 50 + 90
        assert_eq!(semi.get(p(8)), Pieces::from(190));
        // 190 - 0 + 70
        assert_eq!(semi.get(p(9)), Pieces::from(260));
    }
}
