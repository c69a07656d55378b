//! 計劃輸入快照

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records::{
    ArrivalRecord, CpWipRecord, FabLot, FabStockRecord, ForecastEntry, OpenOrder,
    PackagingRecord, ReleaseRecord, SaleRecord, SpecGrossDieRecord, StockRecord,
    WaferSpecRecord, WaferStockRecord, WipRecord,
};
use crate::sku::{SafetyStockEntry, SkuMaster};
use crate::wafer::WaferMaster;

/// 一次計劃運算的全部輸入
///
/// 主檔可以直接帶入彙總好的庫存/在製/供應池，也可以附上明細表由計算端透視；
/// 兩者會相加。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    #[serde(default)]
    pub skus: Vec<SkuMaster>,
    #[serde(default)]
    pub wafers: Vec<WaferMaster>,
    #[serde(default)]
    pub forecasts: Vec<ForecastEntry>,
    #[serde(default)]
    pub open_orders: Vec<OpenOrder>,
    #[serde(default)]
    pub releases: Vec<ReleaseRecord>,
    #[serde(default)]
    pub arrivals: Vec<ArrivalRecord>,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,

    // 主檔補充明細
    #[serde(default)]
    pub safety_stock: Vec<SafetyStockEntry>,
    #[serde(default)]
    pub stock_records: Vec<StockRecord>,
    #[serde(default)]
    pub wip_records: Vec<WipRecord>,
    #[serde(default)]
    pub wafer_stock: Vec<WaferStockRecord>,
    #[serde(default)]
    pub cp_wip: Vec<CpWipRecord>,
    #[serde(default)]
    pub fab_stock: Vec<FabStockRecord>,
    #[serde(default)]
    pub fab_lots: Vec<FabLot>,
    #[serde(default)]
    pub wafer_specs: Vec<WaferSpecRecord>,
    #[serde(default)]
    pub spec_gross_die: Vec<SpecGrossDieRecord>,
    #[serde(default)]
    pub packaging: Vec<PackagingRecord>,
    /// 封裝廠 → 負責 PC
    #[serde(default)]
    pub pc_by_vendor: BTreeMap<String, String>,
}

impl PlanInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 快照載入
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::PlanError::InvalidInput(e.to_string()))
    }

    pub fn with_skus(mut self, skus: Vec<SkuMaster>) -> Self {
        self.skus = skus;
        self
    }

    pub fn with_wafers(mut self, wafers: Vec<WaferMaster>) -> Self {
        self.wafers = wafers;
        self
    }

    pub fn with_forecasts(mut self, forecasts: Vec<ForecastEntry>) -> Self {
        self.forecasts = forecasts;
        self
    }

    pub fn with_open_orders(mut self, open_orders: Vec<OpenOrder>) -> Self {
        self.open_orders = open_orders;
        self
    }

    pub fn with_releases(mut self, releases: Vec<ReleaseRecord>) -> Self {
        self.releases = releases;
        self
    }

    pub fn with_arrivals(mut self, arrivals: Vec<ArrivalRecord>) -> Self {
        self.arrivals = arrivals;
        self
    }

    pub fn with_sales(mut self, sales: Vec<SaleRecord>) -> Self {
        self.sales = sales;
        self
    }

    pub fn with_safety_stock(mut self, entries: Vec<SafetyStockEntry>) -> Self {
        self.safety_stock = entries;
        self
    }

    pub fn with_stock_records(mut self, records: Vec<StockRecord>) -> Self {
        self.stock_records = records;
        self
    }

    pub fn with_wip_records(mut self, records: Vec<WipRecord>) -> Self {
        self.wip_records = records;
        self
    }

    pub fn with_wafer_stock(mut self, records: Vec<WaferStockRecord>) -> Self {
        self.wafer_stock = records;
        self
    }

    pub fn with_cp_wip(mut self, records: Vec<CpWipRecord>) -> Self {
        self.cp_wip = records;
        self
    }

    pub fn with_fab_stock(mut self, records: Vec<FabStockRecord>) -> Self {
        self.fab_stock = records;
        self
    }

    pub fn with_fab_lots(mut self, lots: Vec<FabLot>) -> Self {
        self.fab_lots = lots;
        self
    }

    /// 建構器模式：設置晶圓規格與毛晶粒數對照
    pub fn with_yield_sources(
        mut self,
        wafer_specs: Vec<WaferSpecRecord>,
        spec_gross_die: Vec<SpecGrossDieRecord>,
    ) -> Self {
        self.wafer_specs = wafer_specs;
        self.spec_gross_die = spec_gross_die;
        self
    }

    /// 建構器模式：設置封裝資訊來源與 PC 對照
    pub fn with_packaging(
        mut self,
        packaging: Vec<PackagingRecord>,
        pc_by_vendor: BTreeMap<String, String>,
    ) -> Self {
        self.packaging = packaging;
        self.pc_by_vendor = pc_by_vendor;
        self
    }
}
