//! # Fabplan Calculation Engine
//!
//! 晶圓主計劃計算引擎：需求彙總 → 成品/半成品投單 → 晶圓需求 → 瀑布分配 → 缺口報表

pub mod aggregation;
pub mod engine;
pub mod fab_output;
pub mod gap;
pub mod horizon;
pub mod inventory;
pub mod masters;
pub mod release;
pub mod semi_release;
pub mod wafer_demand;
pub mod waterfall;

use std::collections::BTreeMap;

use fabplan_core::{Horizon, Period, PlanError, SkuPlan, WaferPlan};
use serde::Serialize;

// Re-export 主要類型
pub use aggregation::DemandAggregator;
pub use engine::PlanEngine;
pub use fab_output::{FabOutlook, FabOutputAggregator, FabWeeklyRow};
pub use gap::GapReporter;
pub use horizon::HorizonBuilder;
pub use inventory::InventoryPivot;
pub use masters::{MasterDataBuilder, PreparedMasters};
pub use release::{FinishedGoodsPlanner, ReleaseRecurrence};
pub use semi_release::{SemiFinishedMapping, SemiFinishedPlanner};
pub use wafer_demand::WaferDemandTranslator;
pub use waterfall::{Allocation, WaterfallAllocator};

/// 主計劃計算結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterPlan {
    /// 計劃時界
    pub horizon: Horizon,

    /// 料號主計劃（依料號排序）
    pub skus: BTreeMap<String, SkuPlan>,

    /// 晶圓主計劃
    ///
    /// 分配出現結構性錯誤時整張表為 `Err`，料號表不受影響。
    pub wafers: Result<BTreeMap<String, WaferPlan>, PlanError>,

    /// 代工廠週別出貨彙總
    pub fab_weekly: Vec<FabWeeklyRow>,

    /// 警告信息
    pub warnings: Vec<PlanWarning>,
}

impl MasterPlan {
    /// 創建空的計算結果
    pub fn empty(anchor: Period) -> Self {
        Self {
            horizon: Horizon::empty(anchor),
            skus: BTreeMap::new(),
            wafers: Ok(BTreeMap::new()),
            fab_weekly: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.push(warning);
    }

    /// 指定類型的警告
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &PlanWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// 資料品質警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanWarning {
    /// 料號或晶圓品名
    pub entity_id: String,
    pub kind: WarningKind,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(
        entity_id: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            kind,
            message: message.into(),
            severity,
        }
    }

    pub fn info(
        entity_id: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self::new(entity_id, kind, message, WarningSeverity::Info)
    }

    pub fn warning(
        entity_id: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self::new(entity_id, kind, message, WarningSeverity::Warning)
    }

    pub fn error(
        entity_id: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self::new(entity_id, kind, message, WarningSeverity::Error)
    }
}

/// 警告類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningKind {
    /// 預測沒有任何可用月份
    EmptyHorizon,
    /// 晶圓沒有可用的毛晶粒數，不產生晶圓列
    MissingYield,
    /// 料號連結的晶圓品名不在晶圓主檔，也查不到 GROSS DIE
    UnknownWafer,
    /// 半成品的對應料號空白或不存在
    UnmappedSemiFinished,
    /// 主檔中重複的料號或晶圓品名（以第一筆為準）
    DuplicateMaster,
    /// 安全庫存表中的料號不在主檔
    UnmatchedSafetyStock,
    /// 庫存/在製明細的料號不在主檔
    UnmatchedStock,
    /// 需求/實績明細的料號不在主檔
    DroppedRecords,
    /// 晶圓分配中止
    WaferTableAborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
