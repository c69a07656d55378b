//! 主檔整備：把明細表併入料號/晶圓主檔

use std::collections::{BTreeMap, HashSet};

use fabplan_core::{
    apply_safety_stock, resolve_packaging, PackagingInfo, Period, PlanInput, SkuMaster,
    SupplyPools, WaferMaster, YieldTable,
};

use crate::fab_output::{FabOutputAggregator, FabWeeklyRow};
use crate::inventory::InventoryPivot;
use crate::{PlanWarning, WarningKind};

/// 整備完成的主檔
#[derive(Debug, Clone, Default)]
pub struct PreparedMasters {
    /// 料號主檔（已去重，依輸入順序）
    pub skus: Vec<SkuMaster>,
    /// 晶圓主檔（依晶圓品名排序）
    pub wafers: BTreeMap<String, WaferMaster>,
    pub fab_weekly: Vec<FabWeeklyRow>,
    pub warnings: Vec<PlanWarning>,
}

/// 主檔整備器
pub struct MasterDataBuilder;

impl MasterDataBuilder {
    pub fn prepare(input: &PlanInput, anchor: Period) -> PreparedMasters {
        let mut warnings = Vec::new();
        let mut skus = Self::dedup_skus(&input.skus, &mut warnings);

        for part_id in apply_safety_stock(&mut skus, &input.safety_stock) {
            warnings.push(PlanWarning::info(
                part_id,
                WarningKind::UnmatchedSafetyStock,
                "安全庫存表中的料號不在主檔",
            ));
        }

        let stock = InventoryPivot::stock_by_part(&input.stock_records);
        let wip = InventoryPivot::wip_by_part(&input.wip_records);
        for part_id in InventoryPivot::apply_to_masters(&mut skus, &stock, &wip) {
            warnings.push(PlanWarning::info(
                part_id,
                WarningKind::UnmatchedStock,
                "庫存/在製明細的料號不在主檔",
            ));
        }

        Self::resolve_packaging(input, &mut skus);

        let wafers = Self::build_wafers(input, &skus, anchor, &mut warnings);

        PreparedMasters {
            skus,
            wafers,
            fab_weekly: FabOutputAggregator::weekly_rows(&input.fab_lots),
            warnings,
        }
    }

    /// 料號去重（去除前後空白後比對，以第一筆為準）
    fn dedup_skus(skus: &[SkuMaster], warnings: &mut Vec<PlanWarning>) -> Vec<SkuMaster> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(skus.len());

        for master in skus {
            let part_id = master.part_id.trim();
            if part_id.is_empty() {
                continue;
            }
            if !seen.insert(part_id.to_string()) {
                warnings.push(PlanWarning::warning(
                    part_id,
                    WarningKind::DuplicateMaster,
                    "料號主檔重複，忽略後出現的資料",
                ));
                continue;
            }
            let mut master = master.clone();
            master.part_id = part_id.to_string();
            unique.push(master);
        }

        unique
    }

    /// 封裝資訊：主檔自帶的值優先，其次依來源表順序
    fn resolve_packaging(input: &PlanInput, skus: &mut [SkuMaster]) {
        let mut sources: BTreeMap<&str, Vec<PackagingInfo>> = BTreeMap::new();
        for record in &input.packaging {
            sources
                .entry(record.part_id.trim())
                .or_default()
                .push(PackagingInfo::new(
                    record.vendor.as_deref(),
                    record.package.as_deref(),
                ));
        }

        for master in skus.iter_mut() {
            let mut candidates = vec![master.packaging.clone()];
            if let Some(extra) = sources.get(master.part_id.as_str()) {
                candidates.extend(extra.iter().cloned());
            }
            let existing_pc = master.packaging.pc.clone();
            master.packaging = resolve_packaging(&candidates, &input.pc_by_vendor);
            if master.packaging.pc.is_none() {
                master.packaging.pc = existing_pc;
            }
        }
    }

    fn build_wafers(
        input: &PlanInput,
        skus: &[SkuMaster],
        anchor: Period,
        warnings: &mut Vec<PlanWarning>,
    ) -> BTreeMap<String, WaferMaster> {
        let mut wafers: BTreeMap<String, WaferMaster> = BTreeMap::new();
        for master in &input.wafers {
            let wafer_id = master.wafer_id.trim();
            if wafer_id.is_empty() {
                continue;
            }
            if wafers.contains_key(wafer_id) {
                warnings.push(PlanWarning::warning(
                    wafer_id,
                    WarningKind::DuplicateMaster,
                    "晶圓主檔重複，忽略後出現的資料",
                ));
                continue;
            }
            let mut master = master.clone();
            master.wafer_id = wafer_id.to_string();
            wafers.insert(wafer_id.to_string(), master);
        }

        // 明細表中出現但主檔沒有的晶圓也建立主檔，供應量才不會遺失
        let pools =
            InventoryPivot::wafer_pools(&input.wafer_stock, &input.cp_wip, &input.fab_stock);
        let outlook = FabOutputAggregator::outlook(anchor, &input.fab_lots);
        for wafer_id in pools.keys().chain(outlook.keys()) {
            wafers
                .entry(wafer_id.clone())
                .or_insert_with(|| WaferMaster::new(wafer_id.clone()));
        }

        // 只由料號指向的晶圓：查得到 GROSS DIE 才建立，零供應照樣計算缺口
        let yields = Self::yield_table(input);
        let linked = skus
            .iter()
            .filter_map(|s| s.wafer_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty());
        for wafer_id in linked {
            if wafers.contains_key(wafer_id) {
                continue;
            }
            if let Some(gross_die) = yields.resolve(wafer_id) {
                wafers.insert(
                    wafer_id.to_string(),
                    WaferMaster::new(wafer_id).with_gross_die(Some(gross_die)),
                );
            }
        }

        for (wafer_id, master) in wafers.iter_mut() {
            if master.gross_die.is_none() {
                master.gross_die = yields.resolve(wafer_id);
            }
            if let Some(extra) = pools.get(wafer_id) {
                merge_pools(&mut master.pools, extra);
            }
            if let Some(fab) = outlook.get(wafer_id) {
                master.pools.fab_shipped_before_anchor += fab.shipped_before_anchor;
                master.fab_output.accumulate(&fab.monthly);
            }
        }

        wafers
    }

    fn yield_table(input: &PlanInput) -> YieldTable {
        let mut table = YieldTable::new();
        for record in &input.wafer_specs {
            table.add_spec(&record.wafer_id, &record.spec);
        }
        for record in &input.spec_gross_die {
            table.add_gross_die(&record.spec, record.gross_die);
        }
        table
    }
}

fn merge_pools(target: &mut SupplyPools, extra: &SupplyPools) {
    for (warehouse, &quantity) in &extra.warehouses {
        target.add_warehouse(warehouse.as_str(), quantity);
    }
    target.cp_wip += extra.cp_wip;
    target.fab_warehouse += extra.fab_warehouse;
    target.fab_shipped_before_anchor += extra.fab_shipped_before_anchor;
}
