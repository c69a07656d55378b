//! 代工廠產出彙總（FAB WIP）

use std::collections::BTreeMap;

use fabplan_core::{FabLot, FabWeek, MonthlySeries, Period, Wafers};
use serde::Serialize;

/// 單一晶圓品名的代工廠產出展望
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FabOutlook {
    /// 預計出廠日早於錨定月（視為已出貨，第 0 期可用）
    pub shipped_before_anchor: Wafers,
    /// 錨定月起每月預計產出（WO）
    pub monthly: MonthlySeries<Wafers>,
}

/// 週別彙總的鍵：（晶圓品名, 代工廠）
pub type FabKey = (String, String);

/// 週別彙總報表的一列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FabWeeklyRow {
    pub wafer_id: String,
    pub fab: String,
    pub period: Period,
    pub week: FabWeek,
    pub quantity: Wafers,
}

/// 代工廠產出彙總器
pub struct FabOutputAggregator;

impl FabOutputAggregator {
    /// 依晶圓品名彙總出廠展望
    pub fn outlook(anchor: Period, lots: &[FabLot]) -> BTreeMap<String, FabOutlook> {
        let mut outlook: BTreeMap<String, FabOutlook> = BTreeMap::new();

        for lot in lots {
            let wafer_id = lot.wafer_id.trim();
            if wafer_id.is_empty() {
                continue;
            }
            let entry = outlook.entry(wafer_id.to_string()).or_default();
            let period = Period::from_date(lot.expected_out);
            if period < anchor {
                entry.shipped_before_anchor += lot.quantity;
            } else {
                entry.monthly.add(period, lot.quantity);
            }
        }

        outlook
    }

    /// 週別彙總：（晶圓品名, 代工廠）× （月, 週別）
    ///
    /// 依年、月、週排序。
    pub fn weekly_summary(
        lots: &[FabLot],
    ) -> BTreeMap<FabKey, BTreeMap<(Period, FabWeek), Wafers>> {
        let mut summary: BTreeMap<FabKey, BTreeMap<(Period, FabWeek), Wafers>> = BTreeMap::new();

        for lot in lots {
            let wafer_id = lot.wafer_id.trim();
            if wafer_id.is_empty() {
                continue;
            }
            let bucket = (
                Period::from_date(lot.expected_out),
                FabWeek::from_date(lot.expected_out),
            );
            *summary
                .entry((wafer_id.to_string(), lot.fab.trim().to_string()))
                .or_default()
                .entry(bucket)
                .or_insert(Wafers::ZERO) += lot.quantity;
        }

        summary
    }

    /// 週別彙總攤平成報表列
    pub fn weekly_rows(lots: &[FabLot]) -> Vec<FabWeeklyRow> {
        Self::weekly_summary(lots)
            .into_iter()
            .flat_map(|((wafer_id, fab), buckets)| {
                buckets
                    .into_iter()
                    .map(move |((period, week), quantity)| FabWeeklyRow {
                        wafer_id: wafer_id.clone(),
                        fab: fab.clone(),
                        period,
                        week,
                        quantity,
                    })
            })
            .collect()
    }
}
