//! 成品/半成品料號主檔

use serde::{Deserialize, Serialize};

use crate::attributes::PackagingInfo;
use crate::units::{Pieces, Wafers};

/// 倉別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarehouseClass {
    /// 成品倉
    Finished,
    /// 半成品倉
    SemiFinished,
    /// 呆滯/保留倉
    Hold,
}

/// 生產階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// 成品
    Finished,
    /// 半成品
    SemiFinished,
}

/// 各倉別庫存
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StockByClass {
    pub finished: Pieces,
    pub semi_finished: Pieces,
    pub hold: Pieces,
}

impl StockByClass {
    pub fn get(&self, class: WarehouseClass) -> Pieces {
        match class {
            WarehouseClass::Finished => self.finished,
            WarehouseClass::SemiFinished => self.semi_finished,
            WarehouseClass::Hold => self.hold,
        }
    }

    pub fn add(&mut self, class: WarehouseClass, quantity: Pieces) {
        match class {
            WarehouseClass::Finished => self.finished += quantity,
            WarehouseClass::SemiFinished => self.semi_finished += quantity,
            WarehouseClass::Hold => self.hold += quantity,
        }
    }

    /// 指定倉別合計（重複的倉別只計一次）
    pub fn sum_of(&self, classes: &[WarehouseClass]) -> Pieces {
        let mut seen = Vec::with_capacity(classes.len());
        classes
            .iter()
            .filter(|c| {
                if seen.contains(*c) {
                    false
                } else {
                    seen.push(**c);
                    true
                }
            })
            .map(|&c| self.get(c))
            .sum()
    }
}

/// 各階段在製
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WipByStage {
    pub finished: Pieces,
    pub semi_finished: Pieces,
}

impl WipByStage {
    pub fn get(&self, stage: Stage) -> Pieces {
        match stage {
            Stage::Finished => self.finished,
            Stage::SemiFinished => self.semi_finished,
        }
    }

    pub fn add(&mut self, stage: Stage, quantity: Pieces) {
        match stage {
            Stage::Finished => self.finished += quantity,
            Stage::SemiFinished => self.semi_finished += quantity,
        }
    }
}

/// 安全庫存（InvWaf / InvPart）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyStock {
    /// 晶圓當量
    pub wafers: Wafers,
    /// 成品當量
    pub pieces: Pieces,
}

/// 料號主檔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuMaster {
    /// 品名（已正規化的料號）
    pub part_id: String,

    /// 安全庫存
    #[serde(default)]
    pub safety_stock: SafetyStock,

    /// 各倉別庫存
    #[serde(default)]
    pub stock: StockByClass,

    /// 在製
    #[serde(default)]
    pub wip: WipByStage,

    /// 對應晶圓品名
    #[serde(default)]
    pub wafer_id: Option<String>,

    /// 半成品對應的新料號（本料號為半成品時填寫）
    #[serde(default)]
    pub semi_finished_of: Option<String>,

    /// 封裝資訊（報表用）
    #[serde(default)]
    pub packaging: PackagingInfo,
}

impl SkuMaster {
    /// 創建新的料號主檔
    pub fn new(part_id: impl Into<String>) -> Self {
        Self {
            part_id: part_id.into(),
            safety_stock: SafetyStock::default(),
            stock: StockByClass::default(),
            wip: WipByStage::default(),
            wafer_id: None,
            semi_finished_of: None,
            packaging: PackagingInfo::default(),
        }
    }

    /// 建構器模式：設置安全庫存
    pub fn with_safety_stock(mut self, wafers: Wafers, pieces: Pieces) -> Self {
        self.safety_stock = SafetyStock { wafers, pieces };
        self
    }

    /// 建構器模式：累加某倉別庫存
    pub fn with_stock(mut self, class: WarehouseClass, quantity: Pieces) -> Self {
        self.stock.add(class, quantity);
        self
    }

    /// 建構器模式：累加某階段在製
    pub fn with_wip(mut self, stage: Stage, quantity: Pieces) -> Self {
        self.wip.add(stage, quantity);
        self
    }

    /// 建構器模式：設置晶圓品名
    pub fn with_wafer(mut self, wafer_id: impl Into<String>) -> Self {
        self.wafer_id = Some(wafer_id.into());
        self
    }

    /// 建構器模式：標記為某料號的半成品
    pub fn with_semi_finished_of(mut self, part_id: impl Into<String>) -> Self {
        self.semi_finished_of = Some(part_id.into());
        self
    }

    /// 建構器模式：設置封裝資訊
    pub fn with_packaging(mut self, packaging: PackagingInfo) -> Self {
        self.packaging = packaging;
        self
    }

    /// 是否標記為半成品
    pub fn is_semi_finished(&self) -> bool {
        self.semi_finished_of.is_some()
    }

    /// 半成品的目標料號（空白視為未填）
    pub fn semi_finished_target(&self) -> Option<&str> {
        self.semi_finished_of
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 安全庫存表的一筆資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyStockEntry {
    pub part_id: String,
    pub wafers: Wafers,
    pub pieces: Pieces,
}

/// 將安全庫存表套用到主檔
///
/// 同一料號有多筆時以第一筆為準。回傳主檔中找不到的料號（已排序、去重）。
pub fn apply_safety_stock(masters: &mut [SkuMaster], entries: &[SafetyStockEntry]) -> Vec<String> {
    let mut applied = std::collections::HashSet::new();
    let mut unmatched = std::collections::BTreeSet::new();

    for entry in entries {
        let part_id = entry.part_id.trim();
        if !applied.insert(part_id.to_string()) {
            continue;
        }

        match masters.iter_mut().find(|m| m.part_id == part_id) {
            Some(master) => {
                master.safety_stock = SafetyStock {
                    wafers: entry.wafers,
                    pieces: entry.pieces,
                };
            }
            None => {
                unmatched.insert(part_id.to_string());
            }
        }
    }

    unmatched.into_iter().collect()
}
