//! 晶圓主檔與供應池

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::series::MonthlySeries;
use crate::units::{Die, GrossDie, Wafers};

/// 晶圓供應池
///
/// 分配時依序消耗：晶圓倉 → CP 在製 → 代工廠成品倉 → 錨定月前已出貨 → 代工廠預計產出。
/// 晶圓倉與 CP 在製以晶粒計；代工廠相關數量以片計，需乘上毛晶粒數。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyPools {
    /// 晶圓倉（依子倉別）
    #[serde(default)]
    pub warehouses: BTreeMap<String, Die>,

    /// CP 在製
    #[serde(default)]
    pub cp_wip: Die,

    /// 代工廠成品倉
    #[serde(default)]
    pub fab_warehouse: Wafers,

    /// 錨定月之前已由代工廠出貨
    #[serde(default)]
    pub fab_shipped_before_anchor: Wafers,
}

impl SupplyPools {
    /// 晶圓倉合計
    pub fn warehouse_total(&self) -> Die {
        self.warehouses.values().sum()
    }

    /// 第 0 期可用量
    pub fn opening_supply(&self, gross_die: GrossDie) -> Die {
        self.warehouse_total()
            + self.cp_wip
            + gross_die.die_from_wafers(self.fab_warehouse)
            + gross_die.die_from_wafers(self.fab_shipped_before_anchor)
    }

    /// 累加子倉庫存
    pub fn add_warehouse(&mut self, warehouse: impl Into<String>, quantity: Die) {
        *self.warehouses.entry(warehouse.into()).or_insert(Die::ZERO) += quantity;
    }
}

/// 晶圓主檔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaferMaster {
    /// 晶圓品名
    pub wafer_id: String,

    /// 單片毛晶粒數，未知時為 None
    #[serde(default)]
    pub gross_die: Option<GrossDie>,

    /// 供應池
    #[serde(default)]
    pub pools: SupplyPools,

    /// 代工廠預計產出（WO），按月
    #[serde(default)]
    pub fab_output: MonthlySeries<Wafers>,
}

impl WaferMaster {
    /// 創建新的晶圓主檔
    pub fn new(wafer_id: impl Into<String>) -> Self {
        Self {
            wafer_id: wafer_id.into(),
            gross_die: None,
            pools: SupplyPools::default(),
            fab_output: MonthlySeries::new(),
        }
    }

    /// 建構器模式：設置毛晶粒數
    pub fn with_gross_die(mut self, gross_die: Option<GrossDie>) -> Self {
        self.gross_die = gross_die;
        self
    }

    /// 建構器模式：設置供應池
    pub fn with_pools(mut self, pools: SupplyPools) -> Self {
        self.pools = pools;
        self
    }

    /// 建構器模式：設置預計產出
    pub fn with_fab_output(mut self, fab_output: MonthlySeries<Wafers>) -> Self {
        self.fab_output = fab_output;
        self
    }
}

/// 毛晶粒數對照表
///
/// 晶圓品名 → 規格 → GROSS DIE。一個晶圓品名可能對到多個規格，
/// 依登錄順序取第一個能解析出有效毛晶粒數的規格。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YieldTable {
    specs_by_wafer: BTreeMap<String, Vec<String>>,
    gross_die_by_spec: BTreeMap<String, Decimal>,
}

impl YieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登錄晶圓品名對應的規格
    pub fn add_spec(&mut self, wafer_id: &str, spec: &str) {
        let (wafer_id, spec) = (wafer_id.trim(), spec.trim());
        if wafer_id.is_empty() || spec.is_empty() {
            return;
        }
        let specs = self.specs_by_wafer.entry(wafer_id.to_string()).or_default();
        if !specs.iter().any(|s| s == spec) {
            specs.push(spec.to_string());
        }
    }

    /// 登錄規格的毛晶粒數（同規格以第一筆為準）
    pub fn add_gross_die(&mut self, spec: &str, gross_die: Decimal) {
        let spec = spec.trim();
        if spec.is_empty() {
            return;
        }
        self.gross_die_by_spec
            .entry(spec.to_string())
            .or_insert(gross_die);
    }

    /// 解析晶圓品名的毛晶粒數
    pub fn resolve(&self, wafer_id: &str) -> Option<GrossDie> {
        self.specs_by_wafer
            .get(wafer_id.trim())?
            .iter()
            .filter_map(|spec| self.gross_die_by_spec.get(spec))
            .find_map(|&value| GrossDie::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_opening_supply() {
        let mut pools = SupplyPools {
            cp_wip: Die::from(2_000),
            fab_warehouse: Wafers::from(3),
            fab_shipped_before_anchor: Wafers::from(1),
            ..SupplyPools::default()
        };
        pools.add_warehouse("晶圓倉A", Die::from(1_000));
        pools.add_warehouse("晶圓倉B", Die::from(500));
        pools.add_warehouse("晶圓倉A", Die::from(500));

        let gross_die = GrossDie::new(dec!(500)).unwrap();

        assert_eq!(pools.warehouse_total(), Die::from(2_000));
        // 2000 + 2000 + (3 + 1) * 500
        assert_eq!(pools.opening_supply(gross_die), Die::from(6_000));
    }

    #[test]
    fn test_yield_table_first_usable_spec() {
        let mut table = YieldTable::new();
        table.add_spec("W-0180", "SPEC-OLD");
        table.add_spec("W-0180", "SPEC-NEW");
        table.add_spec("W-0180", "SPEC-OLD");
        table.add_gross_die("SPEC-OLD", Decimal::ZERO);
        table.add_gross_die("SPEC-NEW", dec!(812));
        table.add_gross_die("SPEC-NEW", dec!(1));

        assert_eq!(table.resolve(" W-0180 ").map(|g| g.value()), Some(dec!(812)));
    }

    #[test]
    fn test_yield_table_unknown_wafer() {
        let mut table = YieldTable::new();
        table.add_spec("W-1", "S-1");

        assert!(table.resolve("W-1").is_none());
        assert!(table.resolve("W-2").is_none());
    }

    #[test]
    fn test_wafer_master_deserialize_defaults() {
        let wafer: WaferMaster =
            serde_json::from_str(r#"{"wafer_id": "W-0180", "gross_die": "500"}"#).unwrap();

        assert_eq!(wafer.gross_die.map(|g| g.value()), Some(dec!(500)));
        assert!(wafer.fab_output.is_empty());
        assert_eq!(wafer.pools, SupplyPools::default());
    }
}
