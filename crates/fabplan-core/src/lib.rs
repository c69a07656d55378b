//! # Fabplan Core
//!
//! 主計劃的核心資料模型與類型定義

pub mod attributes;
pub mod config;
pub mod input;
pub mod period;
pub mod plan;
pub mod records;
pub mod series;
pub mod sku;
pub mod units;
pub mod wafer;

// Re-export 主要類型
pub use attributes::{first_non_empty, resolve_packaging, PackagingInfo};
pub use config::PlanConfig;
pub use input::PlanInput;
pub use period::{FabWeek, Horizon, Period};
pub use plan::{DemandSignals, SkuPlan, WaferPlan};
pub use records::{
    ArrivalRecord, CpWipRecord, FabLot, FabStockRecord, ForecastEntry, OpenOrder,
    PackagingRecord, ReleaseRecord, SaleRecord, SpecGrossDieRecord, StockRecord, WaferSpecRecord,
    WaferStockRecord, WipRecord,
};
pub use series::MonthlySeries;
pub use sku::{
    apply_safety_stock, SafetyStock, SafetyStockEntry, SkuMaster, Stage, StockByClass,
    WarehouseClass, WipByStage,
};
pub use units::{Die, GrossDie, Pieces, Quantity, Wafers};
pub use wafer::{SupplyPools, WaferMaster, YieldTable};

/// 主計劃錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum PlanError {
    #[error("無效的月份: {0}")]
    InvalidPeriod(String),

    #[error("無效的毛晶粒數: {0}")]
    InvalidYield(String),

    #[error("配置錯誤: {0}")]
    InvalidConfig(String),

    #[error("輸入資料錯誤: {0}")]
    InvalidInput(String),

    #[error("晶圓 {wafer_id} 於 {period} 出現負結轉量 {rest}")]
    NegativeCarryForward {
        wafer_id: String,
        period: Period,
        rest: Die,
    },
}

pub type Result<T> = std::result::Result<T, PlanError>;
