//! 交易明細模型（上游已完成欄位正規化與料號替換）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::sku::{Stage, WarehouseClass};
use crate::units::{Die, Pieces, Wafers};

/// 銷售預測
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub part_id: String,
    pub period: Period,
    pub quantity: Pieces,
}

impl ForecastEntry {
    pub fn new(part_id: impl Into<String>, period: Period, quantity: Pieces) -> Self {
        Self {
            part_id: part_id.into(),
            period,
            quantity,
        }
    }
}

/// 未交訂單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub part_id: String,
    pub quantity: Pieces,
    /// 預交日期
    pub due_date: NaiveDate,
}

impl OpenOrder {
    pub fn new(part_id: impl Into<String>, quantity: Pieces, due_date: NaiveDate) -> Self {
        Self {
            part_id: part_id.into(),
            quantity,
            due_date,
        }
    }
}

/// 實際投單（下單明細）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub part_id: String,
    pub stage: Stage,
    pub quantity: Pieces,
    /// 下單日期
    pub order_date: NaiveDate,
}

impl ReleaseRecord {
    pub fn new(
        part_id: impl Into<String>,
        stage: Stage,
        quantity: Pieces,
        order_date: NaiveDate,
    ) -> Self {
        Self {
            part_id: part_id.into(),
            stage,
            quantity,
            order_date,
        }
    }
}

/// 到貨明細（回貨實際）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub part_id: String,
    /// 允收數量
    pub quantity: Pieces,
    pub arrival_date: NaiveDate,
}

impl ArrivalRecord {
    pub fn new(part_id: impl Into<String>, quantity: Pieces, arrival_date: NaiveDate) -> Self {
        Self {
            part_id: part_id.into(),
            quantity,
            arrival_date,
        }
    }
}

/// 銷貨明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub part_id: String,
    pub quantity: Pieces,
    /// 原幣金額
    pub amount: Decimal,
    pub trade_date: NaiveDate,
}

impl SaleRecord {
    pub fn new(
        part_id: impl Into<String>,
        quantity: Pieces,
        amount: Decimal,
        trade_date: NaiveDate,
    ) -> Self {
        Self {
            part_id: part_id.into(),
            quantity,
            amount,
            trade_date,
        }
    }
}

/// 成品/半成品庫存明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub part_id: String,
    pub class: WarehouseClass,
    pub quantity: Pieces,
}

/// 成品/半成品在製明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WipRecord {
    pub part_id: String,
    pub stage: Stage,
    pub quantity: Pieces,
}

/// 晶圓庫存明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaferStockRecord {
    pub wafer_id: String,
    /// 子倉名稱
    pub warehouse: String,
    pub quantity: Die,
}

/// CP 在製明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpWipRecord {
    pub wafer_id: String,
    pub quantity: Die,
}

/// 代工廠成品倉明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabStockRecord {
    pub wafer_id: String,
    pub fab: String,
    pub quantity: Wafers,
}

/// 代工廠在製批次（FAB WIP）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabLot {
    pub wafer_id: String,
    /// 代工廠代號（如 CSMC-1、HHG）
    pub fab: String,
    pub quantity: Wafers,
    /// 預計出廠日期
    pub expected_out: NaiveDate,
}

impl FabLot {
    pub fn new(
        wafer_id: impl Into<String>,
        fab: impl Into<String>,
        quantity: Wafers,
        expected_out: NaiveDate,
    ) -> Self {
        Self {
            wafer_id: wafer_id.into(),
            fab: fab.into(),
            quantity,
            expected_out,
        }
    }
}

/// 晶圓品名對應的規格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaferSpecRecord {
    pub wafer_id: String,
    pub spec: String,
}

/// 規格的單片毛晶粒數（原始值，可能為零或負數）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecGrossDieRecord {
    pub spec: String,
    pub gross_die: Decimal,
}

/// 封裝資訊來源（依登錄順序決定優先序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingRecord {
    pub part_id: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
}
