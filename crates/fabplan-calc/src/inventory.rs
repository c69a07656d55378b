//! 庫存/在製明細透視

use std::collections::BTreeMap;

use fabplan_core::{
    CpWipRecord, FabStockRecord, SkuMaster, Stage, StockByClass, StockRecord, SupplyPools,
    WarehouseClass, WaferStockRecord, WipByStage, WipRecord,
};

/// 庫存透視計算器
pub struct InventoryPivot;

impl InventoryPivot {
    /// 依（料號, 倉別）加總庫存
    pub fn stock_by_part(records: &[StockRecord]) -> BTreeMap<String, StockByClass> {
        let mut pivot: BTreeMap<String, StockByClass> = BTreeMap::new();
        for record in records {
            pivot
                .entry(record.part_id.trim().to_string())
                .or_default()
                .add(record.class, record.quantity);
        }
        pivot
    }

    /// 依（料號, 階段）加總在製
    pub fn wip_by_part(records: &[WipRecord]) -> BTreeMap<String, WipByStage> {
        let mut pivot: BTreeMap<String, WipByStage> = BTreeMap::new();
        for record in records {
            pivot
                .entry(record.part_id.trim().to_string())
                .or_default()
                .add(record.stage, record.quantity);
        }
        pivot
    }

    /// 將透視結果累加到主檔的庫存與在製
    ///
    /// 回傳有庫存/在製資料但不在主檔中的料號。
    pub fn apply_to_masters(
        masters: &mut [SkuMaster],
        stock: &BTreeMap<String, StockByClass>,
        wip: &BTreeMap<String, WipByStage>,
    ) -> Vec<String> {
        for master in masters.iter_mut() {
            if let Some(by_class) = stock.get(&master.part_id) {
                master.stock.add(WarehouseClass::Finished, by_class.finished);
                master.stock.add(WarehouseClass::SemiFinished, by_class.semi_finished);
                master.stock.add(WarehouseClass::Hold, by_class.hold);
            }
            if let Some(by_stage) = wip.get(&master.part_id) {
                master.wip.add(Stage::Finished, by_stage.finished);
                master.wip.add(Stage::SemiFinished, by_stage.semi_finished);
            }
        }

        let known: std::collections::HashSet<&str> =
            masters.iter().map(|m| m.part_id.as_str()).collect();
        let mut orphans: Vec<String> = stock
            .keys()
            .chain(wip.keys())
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect();
        orphans.sort();
        orphans.dedup();
        orphans
    }

    /// 依晶圓品名彙總供應池（晶圓倉子倉、CP 在製、代工廠成品倉）
    pub fn wafer_pools(
        wafer_stock: &[WaferStockRecord],
        cp_wip: &[CpWipRecord],
        fab_stock: &[FabStockRecord],
    ) -> BTreeMap<String, SupplyPools> {
        let mut pools: BTreeMap<String, SupplyPools> = BTreeMap::new();

        for record in wafer_stock {
            pools
                .entry(record.wafer_id.trim().to_string())
                .or_default()
                .add_warehouse(record.warehouse.trim(), record.quantity);
        }
        for record in cp_wip {
            pools
                .entry(record.wafer_id.trim().to_string())
                .or_default()
                .cp_wip += record.quantity;
        }
        for record in fab_stock {
            pools
                .entry(record.wafer_id.trim().to_string())
                .or_default()
                .fab_warehouse += record.quantity;
        }

        pools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabplan_core::{Die, Pieces, Wafers};

    #[test]
    fn test_stock_pivot_by_class() {
        let records = vec![
            StockRecord {
                part_id: "A".to_string(),
                class: WarehouseClass::Finished,
                quantity: Pieces::from(30),
            },
            StockRecord {
                part_id: "A ".to_string(),
                class: WarehouseClass::Finished,
                quantity: Pieces::from(20),
            },
            StockRecord {
                part_id: "A".to_string(),
                class: WarehouseClass::Hold,
                quantity: Pieces::from(3),
            },
        ];

        let pivot = InventoryPivot::stock_by_part(&records);

        assert_eq!(pivot.len(), 1);
        assert_eq!(pivot["A"].finished, Pieces::from(50));
        assert_eq!(pivot["A"].hold, Pieces::from(3));
    }

    #[test]
    fn test_apply_to_masters_reports_orphans() {
        let mut masters = vec![
            SkuMaster::new("A").with_stock(WarehouseClass::Finished, Pieces::from(5)),
            SkuMaster::new("B"),
        ];
        let stock = InventoryPivot::stock_by_part(&[StockRecord {
            part_id: "A".to_string(),
            class: WarehouseClass::Finished,
            quantity: Pieces::from(50),
        }]);
        let wip = InventoryPivot::wip_by_part(&[
            WipRecord {
                part_id: "B".to_string(),
                stage: Stage::SemiFinished,
                quantity: Pieces::from(8),
            },
            WipRecord {
                part_id: "X".to_string(),
                stage: Stage::Finished,
                quantity: Pieces::from(1),
            },
        ]);

        let orphans = InventoryPivot::apply_to_masters(&mut masters, &stock, &wip);

        assert_eq!(orphans, vec!["X".to_string()]);
        assert_eq!(masters[0].stock.finished, Pieces::from(55));
        assert_eq!(masters[1].wip.semi_finished, Pieces::from(8));
        assert_eq!(masters[1].stock, StockByClass::default());
    }

    #[test]
    fn test_wafer_pools() {
        let pools = InventoryPivot::wafer_pools(
            &[
                WaferStockRecord {
                    wafer_id: "W1".to_string(),
                    warehouse: "原片倉".to_string(),
                    quantity: Die::from(1_000),
                },
                WaferStockRecord {
                    wafer_id: "W1".to_string(),
                    warehouse: "中測倉".to_string(),
                    quantity: Die::from(400),
                },
            ],
            &[CpWipRecord {
                wafer_id: "W1".to_string(),
                quantity: Die::from(250),
            }],
            &[FabStockRecord {
                wafer_id: "W2".to_string(),
                fab: "HHG".to_string(),
                quantity: Wafers::from(6),
            }],
        );

        assert_eq!(pools["W1"].warehouse_total(), Die::from(1_400));
        assert_eq!(pools["W1"].warehouses.len(), 2);
        assert_eq!(pools["W1"].cp_wip, Die::from(250));
        assert_eq!(pools["W2"].fab_warehouse, Wafers::from(6));
    }
}
