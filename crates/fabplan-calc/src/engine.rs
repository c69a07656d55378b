//! 主計劃計算引擎

use std::collections::BTreeMap;

use fabplan_core::{
    DemandSignals, GrossDie, Horizon, Pieces, PlanConfig, PlanInput, SkuMaster, SkuPlan,
    WaferMaster, WaferPlan,
};
use rayon::prelude::*;

use crate::aggregation::DemandAggregator;
use crate::gap::GapReporter;
use crate::horizon::HorizonBuilder;
use crate::masters::MasterDataBuilder;
use crate::release::FinishedGoodsPlanner;
use crate::semi_release::{SemiFinishedMapping, SemiFinishedPlanner};
use crate::wafer_demand::WaferDemandTranslator;
use crate::waterfall::WaterfallAllocator;
use crate::{MasterPlan, PlanWarning, WarningKind, WarningSeverity};

/// 主計劃引擎
///
/// 每次計算都是輸入快照與配置的純函數，不保留任何狀態。
pub struct PlanEngine {
    config: PlanConfig,
}

impl PlanEngine {
    /// 創建新的計劃引擎
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// 主計劃計算入口
    ///
    /// 只有配置錯誤會回傳 `Err`；資料品質問題記錄為警告，
    /// 晶圓分配失敗只影響 [`MasterPlan::wafers`]。
    pub fn run(&self, input: &PlanInput) -> fabplan_core::Result<MasterPlan> {
        self.config.validate()?;

        tracing::info!(
            "開始主計劃計算：錨定月 {}，料號 {} 筆，晶圓 {} 筆，預測 {} 筆，未交訂單 {} 筆",
            self.config.anchor,
            input.skus.len(),
            input.wafers.len(),
            input.forecasts.len(),
            input.open_orders.len()
        );
        let start_time = std::time::Instant::now();
        let anchor = self.config.anchor;
        let mut plan = MasterPlan::empty(anchor);

        // Step 1: 主檔整備
        tracing::debug!("Step 1: 主檔整備");
        let prepared = MasterDataBuilder::prepare(input, anchor);
        for warning in prepared.warnings {
            Self::emit(&mut plan, warning);
        }
        plan.fab_weekly = prepared.fab_weekly;

        // Step 2: 計劃時界
        tracing::debug!("Step 2: 建立時界");
        let horizon = HorizonBuilder::from_forecasts(anchor, &input.forecasts);
        plan.horizon = horizon.clone();
        if horizon.is_empty() {
            Self::emit(
                &mut plan,
                PlanWarning::warning(
                    anchor.to_string(),
                    WarningKind::EmptyHorizon,
                    "預測沒有錨定月之後的月份，不產生計劃",
                ),
            );
            tracing::info!("主計劃計算完成（空時界），耗時 {:?}", start_time.elapsed());
            return Ok(plan);
        }
        tracing::debug!("報告月: {:?}，前瞻月: {:?}", horizon.reported(), horizon.lookahead());

        // Step 3: 需求彙總
        tracing::debug!("Step 3: 需求彙總");
        let mut aggregator =
            DemandAggregator::new(&horizon, prepared.skus.iter().map(|m| m.part_id.as_str()));
        aggregator
            .add_forecasts(&input.forecasts)
            .add_open_orders(&input.open_orders)
            .add_releases(&input.releases)
            .add_arrivals(&input.arrivals)
            .add_sales(&input.sales);
        let dropped = aggregator.dropped();
        if dropped > 0 {
            Self::emit(
                &mut plan,
                PlanWarning::info(
                    "*",
                    WarningKind::DroppedRecords,
                    format!("{} 筆明細的料號不在主檔，已略過", dropped),
                ),
            );
        }
        let mut signals = aggregator.finish();

        // Step 4: 半成品對應
        tracing::debug!("Step 4: 半成品對應");
        let mapping = SemiFinishedMapping::from_masters(&prepared.skus);
        for (part_id, target) in &mapping.unmapped {
            Self::emit(
                &mut plan,
                PlanWarning::warning(
                    part_id.as_str(),
                    WarningKind::UnmappedSemiFinished,
                    format!("半成品對應料號「{}」空白或不在主檔", target.trim()),
                ),
            );
        }

        // Step 5: 逐料號投單計劃
        tracing::debug!("Step 5: 逐料號投單計劃，共 {} 筆", prepared.skus.len());
        let jobs: Vec<(&SkuMaster, DemandSignals)> = prepared
            .skus
            .iter()
            .map(|master| {
                let sku_signals = signals.remove(&master.part_id).unwrap_or_default();
                (master, sku_signals)
            })
            .collect();
        let sku_plans = self.map_entities(jobs, |(master, sku_signals)| {
            self.plan_sku(&horizon, &mapping, master, sku_signals)
        });
        plan.skus = sku_plans
            .into_iter()
            .map(|sku| (sku.part_id.clone(), sku))
            .collect();

        // Step 6: 逐晶圓需求、分配與缺口
        tracing::debug!("Step 6: 逐晶圓分配");
        let wafer_jobs = self.wafer_jobs(&plan.skus, &prepared.wafers, &mut plan.warnings);
        let wafer_results = self.map_entities(wafer_jobs, |(master, gross_die, consumers)| {
            Self::plan_wafer(&horizon, master, gross_die, &consumers)
        });
        plan.wafers = wafer_results
            .into_iter()
            .map(|result| result.map(|wafer| (wafer.wafer_id.clone(), wafer)))
            .collect::<fabplan_core::Result<BTreeMap<_, _>>>();

        let aborted = plan.wafers.as_ref().err().map(|e| {
            let entity = match e {
                fabplan_core::PlanError::NegativeCarryForward { wafer_id, .. } => wafer_id.clone(),
                _ => "*".to_string(),
            };
            PlanWarning::error(
                entity,
                WarningKind::WaferTableAborted,
                format!("晶圓分配中止: {}", e),
            )
        });
        if let Some(warning) = aborted {
            Self::emit(&mut plan, warning);
        }

        tracing::info!("主計劃計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "料號計劃 {} 筆，晶圓計劃 {} 筆，警告 {} 筆",
            plan.skus.len(),
            plan.wafers.as_ref().map(|w| w.len()).unwrap_or(0),
            plan.warnings.len()
        );

        Ok(plan)
    }

    /// 單料號投單計劃
    fn plan_sku(
        &self,
        horizon: &Horizon,
        mapping: &SemiFinishedMapping,
        master: &SkuMaster,
        signals: DemandSignals,
    ) -> SkuPlan {
        let finished_release =
            FinishedGoodsPlanner::new(horizon, &self.config).plan(master, &signals);
        let semi_release = mapping.participates(&master.part_id).then(|| {
            SemiFinishedPlanner::new(horizon, &self.config).plan(
                master,
                &signals,
                &finished_release,
            )
        });

        SkuPlan {
            part_id: master.part_id.clone(),
            wafer_id: linked_wafer(master),
            packaging: master.packaging.clone(),
            safety_stock: master.safety_stock,
            signals,
            finished_release,
            semi_release,
        }
    }

    /// 整理可分配的晶圓：有毛晶粒數者才進入計算，其餘記錄警告
    fn wafer_jobs<'a>(
        &self,
        skus: &'a BTreeMap<String, SkuPlan>,
        wafers: &'a BTreeMap<String, WaferMaster>,
        warnings: &mut Vec<PlanWarning>,
    ) -> Vec<(&'a WaferMaster, GrossDie, Vec<&'a SkuPlan>)> {
        let mut consumers: BTreeMap<&str, Vec<&SkuPlan>> = BTreeMap::new();
        for sku in skus.values() {
            if let Some(wafer_id) = sku.wafer_id.as_deref() {
                consumers.entry(wafer_id).or_default().push(sku);
            }
        }

        for (wafer_id, linked) in &consumers {
            if !wafers.contains_key(*wafer_id) {
                let parts: Vec<&str> = linked.iter().map(|s| s.part_id.as_str()).collect();
                let warning = PlanWarning::warning(
                    *wafer_id,
                    WarningKind::UnknownWafer,
                    format!(
                        "晶圓品名不在晶圓主檔且查不到 GROSS DIE，使用料號: {}",
                        parts.join(", ")
                    ),
                );
                log_warning(&warning);
                warnings.push(warning);
            }
        }

        let mut jobs = Vec::with_capacity(wafers.len());
        for (wafer_id, master) in wafers {
            let linked = consumers.remove(wafer_id.as_str()).unwrap_or_default();
            match master.gross_die {
                Some(gross_die) => jobs.push((master, gross_die, linked)),
                None => {
                    let warning = PlanWarning::warning(
                        wafer_id.as_str(),
                        WarningKind::MissingYield,
                        "沒有可用的 GROSS DIE，不產生晶圓計劃",
                    );
                    log_warning(&warning);
                    warnings.push(warning);
                }
            }
        }
        jobs
    }

    /// 單晶圓：需求換算 → 瀑布分配 → 缺口
    fn plan_wafer(
        horizon: &Horizon,
        master: &WaferMaster,
        gross_die: GrossDie,
        consumers: &[&SkuPlan],
    ) -> fabplan_core::Result<WaferPlan> {
        let combined = WaferDemandTranslator::combined_release(horizon, consumers.iter().copied());
        let safety_stock_pieces: Pieces = consumers.iter().map(|s| s.safety_stock.pieces).sum();
        let demand = WaferDemandTranslator::translate(horizon, &combined, safety_stock_pieces);

        let allocator = WaterfallAllocator::new(&master.wafer_id, gross_die);
        let rows = allocator.allocate(horizon, &demand, &master.pools, &master.fab_output)?;

        let reporter = GapReporter::new(gross_die);
        let monthly_gap = reporter.monthly(&rows);
        let cumulative_gap = reporter.cumulative(
            horizon,
            &demand,
            allocator.opening_supply(&master.pools),
            safety_stock_pieces,
            &master.fab_output,
        );

        tracing::debug!(
            "晶圓 {}：使用料號 {} 筆，需求合計 {}",
            master.wafer_id,
            consumers.len(),
            demand.total()
        );

        Ok(WaferPlan {
            wafer_id: master.wafer_id.clone(),
            gross_die,
            consumers: consumers.iter().map(|s| s.part_id.clone()).collect(),
            available: rows.iter().map(|r| (r.period, r.available)).collect(),
            allocated: rows.iter().map(|r| (r.period, r.allocated)).collect(),
            rest: rows.iter().map(|r| (r.period, r.rest)).collect(),
            demand,
            monthly_gap,
            cumulative_gap,
        })
    }

    /// 逐實體計算，依配置決定是否並行；輸出順序與輸入相同
    fn map_entities<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        if self.config.parallel {
            items.into_par_iter().map(f).collect()
        } else {
            items.into_iter().map(f).collect()
        }
    }

    fn emit(plan: &mut MasterPlan, warning: PlanWarning) {
        log_warning(&warning);
        plan.add_warning(warning);
    }
}

fn log_warning(warning: &PlanWarning) {
    match warning.severity {
        WarningSeverity::Info => {
            tracing::info!("[{:?}] {}: {}", warning.kind, warning.entity_id, warning.message)
        }
        WarningSeverity::Warning | WarningSeverity::Error => {
            tracing::warn!("[{:?}] {}: {}", warning.kind, warning.entity_id, warning.message)
        }
    }
}

/// 料號連結的晶圓品名（空白視為未連結）
fn linked_wafer(master: &SkuMaster) -> Option<String> {
    master
        .wafer_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabplan_core::{ForecastEntry, Period, WarehouseClass, Wafers};
    use rust_decimal_macros::dec;

    fn p(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    fn forecasts(part_id: &str, values: &[i64]) -> Vec<ForecastEntry> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ForecastEntry::new(part_id, p(7 + i as u32), Pieces::from(v)))
            .collect()
    }

    fn basic_input() -> PlanInput {
        PlanInput::new()
            .with_skus(vec![SkuMaster::new("A")
                .with_safety_stock(Wafers::ZERO, Pieces::from(100))
                .with_stock(WarehouseClass::Finished, Pieces::from(50))
                .with_wafer("W1")])
            .with_wafers(vec![
                WaferMaster::new("W1").with_gross_die(GrossDie::new(dec!(100)))
            ])
            .with_forecasts(forecasts("A", &[200, 150, 150]))
    }

    #[test]
    fn test_run_basic_plan() {
        let engine = PlanEngine::new(PlanConfig::new(p(7)));
        let plan = engine.run(&basic_input()).unwrap();

        assert_eq!(plan.horizon.reported(), &[p(7), p(8)]);
        let a = &plan.skus["A"];
        assert_eq!(a.finished_release.get(p(7)), Pieces::from(400));
        assert_eq!(a.semi_release, None);

        let wafers = plan.wafers.as_ref().unwrap();
        let w1 = &wafers["W1"];
        assert_eq!(w1.consumers, vec!["A".to_string()]);
        // 400 - InvPart 100
        assert_eq!(w1.demand.get(p(7)).0, dec!(300));
        assert_eq!(w1.monthly_gap.get(p(7)), Wafers::from(3));
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PlanConfig::new(p(7)).with_finished_stock_classes(vec![]);
        let result = PlanEngine::new(config).run(&basic_input());

        assert!(matches!(result, Err(fabplan_core::PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_wafer_is_flagged() {
        let input = basic_input().with_wafers(vec![]);
        let plan = PlanEngine::new(PlanConfig::new(p(7))).run(&input).unwrap();

        assert_eq!(plan.warnings_of(WarningKind::UnknownWafer).count(), 1);
        assert!(plan.wafers.unwrap().is_empty());
        assert_eq!(plan.skus.len(), 1);
    }
}
