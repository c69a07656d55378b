//! 晶圓缺口報表

use fabplan_core::{Die, GrossDie, Horizon, MonthlySeries, Pieces, Wafers};

use crate::waterfall::Allocation;

/// 缺口計算器
///
/// 正值表示短缺、負值表示過剩，單位為片。
pub struct GapReporter {
    gross_die: GrossDie,
}

impl GapReporter {
    pub fn new(gross_die: GrossDie) -> Self {
        Self { gross_die }
    }

    /// 當月缺口：(需求 - 分配) / GROSS DIE
    pub fn monthly(&self, rows: &[Allocation]) -> MonthlySeries<Wafers> {
        rows.iter()
            .map(|row| {
                (
                    row.period,
                    self.gross_die.wafers_from_die(row.demand - row.allocated),
                )
            })
            .collect()
    }

    /// 累計缺口：(累計需求 - 累計供應) / GROSS DIE
    ///
    /// 累計供應由第 0 期可用量加上安全庫存（InvPart）起算，
    /// 之後每期加上前一個月的代工廠產出，不扣除分配量。
    pub fn cumulative(
        &self,
        horizon: &Horizon,
        demand: &MonthlySeries<Die>,
        opening_supply: Die,
        safety_stock_pieces: Pieces,
        fab_output: &MonthlySeries<Wafers>,
    ) -> MonthlySeries<Wafers> {
        let cumulative_demand = demand.running_total(horizon.reported());
        let mut cumulative_supply = opening_supply + safety_stock_pieces.as_die();

        MonthlySeries::from_fn(horizon.reported(), |i, period| {
            if i > 0 {
                cumulative_supply += self
                    .gross_die
                    .die_from_wafers(fab_output.get(period.pred()));
            }
            self.gross_die
                .wafers_from_die(cumulative_demand.get(period) - cumulative_supply)
        })
    }
}
