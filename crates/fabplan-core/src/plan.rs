//! 主計劃輸出模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::attributes::PackagingInfo;
use crate::period::Period;
use crate::series::MonthlySeries;
use crate::sku::SafetyStock;
use crate::units::{Die, GrossDie, Pieces, Quantity, Wafers};

/// 單一料號彙總後的需求/實績訊號
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandSignals {
    /// 預測
    pub forecast: MonthlySeries<Pieces>,
    /// 未交訂單（依預交月，錨定月前併入錨定月）
    pub open_orders: MonthlySeries<Pieces>,
    /// 成品實際投單
    pub finished_releases: MonthlySeries<Pieces>,
    /// 半成品實際投單
    pub semi_releases: MonthlySeries<Pieces>,
    /// 回貨實際
    pub arrivals: MonthlySeries<Pieces>,
    /// 銷售數量
    pub sales_quantity: MonthlySeries<Pieces>,
    /// 銷售金額
    pub sales_amount: MonthlySeries<Decimal>,
}

impl DemandSignals {
    /// 某月的需求量：max(預測, 未交訂單)
    pub fn expected_need(&self, period: Period) -> Pieces {
        self.forecast.get(period).max_of(self.open_orders.get(period))
    }

    /// 某月已實現需求：未交訂單 + 已銷售
    pub fn realized_demand(&self, period: Period) -> Pieces {
        self.open_orders.get(period) + self.sales_quantity.get(period)
    }
}

/// 料號主計劃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuPlan {
    pub part_id: String,
    pub wafer_id: Option<String>,
    pub packaging: PackagingInfo,

    /// 安全庫存（晶圓當量用於報表，顆數 InvPart 參與計算）
    pub safety_stock: SafetyStock,

    /// 彙總訊號
    pub signals: DemandSignals,

    /// 成品投單計劃
    pub finished_release: MonthlySeries<Pieces>,

    /// 半成品投單計劃（僅限半成品對應的料號，其餘為 None）
    pub semi_release: Option<MonthlySeries<Pieces>>,
}

impl SkuPlan {
    /// 驅動晶圓需求的投單計劃：有半成品計劃者用半成品，否則用成品
    pub fn driving_release(&self) -> &MonthlySeries<Pieces> {
        self.semi_release.as_ref().unwrap_or(&self.finished_release)
    }
}

/// 晶圓主計劃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaferPlan {
    pub wafer_id: String,
    pub gross_die: GrossDie,

    /// 使用此晶圓的料號
    pub consumers: Vec<String>,

    /// 每月晶圓需求（晶粒）
    pub demand: MonthlySeries<Die>,

    /// 每月可用量（晶粒）
    pub available: MonthlySeries<Die>,

    /// 每月分配量（晶粒）
    pub allocated: MonthlySeries<Die>,

    /// 結轉至下月的剩餘量（晶粒）
    pub rest: MonthlySeries<Die>,

    /// 當月缺口（片）
    pub monthly_gap: MonthlySeries<Wafers>,

    /// 累計缺口（片）
    pub cumulative_gap: MonthlySeries<Wafers>,
}
