//! 晶圓供應分配（瀑布式逐月結轉）

use fabplan_core::{
    Die, GrossDie, Horizon, MonthlySeries, Period, PlanError, Quantity, Result, SupplyPools,
    Wafers,
};

/// 單月分配結果
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// 月份
    pub period: Period,
    /// 當月需求
    pub demand: Die,
    /// 當月可用量
    pub available: Die,
    /// 分配量
    pub allocated: Die,
    /// 結轉至下月
    pub rest: Die,
}

/// 瀑布式分配器
///
/// 第 0 期可用量為晶圓倉、CP 在製、代工廠成品倉與錨定月前已出貨的合計；
/// 之後每期為上期結轉加上「前一個月」的代工廠預計產出。
pub struct WaterfallAllocator<'a> {
    wafer_id: &'a str,
    gross_die: GrossDie,
}

impl<'a> WaterfallAllocator<'a> {
    pub fn new(wafer_id: &'a str, gross_die: GrossDie) -> Self {
        Self {
            wafer_id,
            gross_die,
        }
    }

    /// 第 0 期可用量（晶粒）
    pub fn opening_supply(&self, pools: &SupplyPools) -> Die {
        pools.opening_supply(self.gross_die)
    }

    /// 第 i 期新增供應：`wo[P(i-1)] × GROSS DIE`
    pub fn inflow(&self, fab_output: &MonthlySeries<Wafers>, period: Period) -> Die {
        self.gross_die.die_from_wafers(fab_output.get(period.pred()))
    }

    /// 逐月分配
    ///
    /// 結轉量出現負值代表計算不變式被破壞，整張晶圓表以錯誤結束。
    pub fn allocate(
        &self,
        horizon: &Horizon,
        demand: &MonthlySeries<Die>,
        pools: &SupplyPools,
        fab_output: &MonthlySeries<Wafers>,
    ) -> Result<Vec<Allocation>> {
        let mut rows = Vec::with_capacity(horizon.reported().len());
        let mut rest = Die::ZERO;

        for (i, &period) in horizon.reported().iter().enumerate() {
            let available = if i == 0 {
                self.opening_supply(pools)
            } else {
                rest + self.inflow(fab_output, period)
            };
            let need = demand.get(period);

            let allocated = if available - need <= Die::ZERO {
                need.min_of(available)
            } else {
                need
            };
            rest = available - allocated;

            if rest.is_negative() {
                return Err(PlanError::NegativeCarryForward {
                    wafer_id: self.wafer_id.to_string(),
                    period,
                    rest,
                });
            }

            rows.push(Allocation {
                period,
                demand: need,
                available,
                allocated,
                rest,
            });
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn p(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    fn series<Q: Quantity + From<i64>>(start: u32, values: &[i64]) -> MonthlySeries<Q> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (p(start + i as u32), Q::from(v)))
            .collect()
    }

    fn gross_die(value: i64) -> GrossDie {
        GrossDie::new(rust_decimal::Decimal::from(value)).unwrap()
    }

    fn pools(warehouse: i64) -> SupplyPools {
        let mut pools = SupplyPools::default();
        pools.add_warehouse("原片倉", Die::from(warehouse));
        pools
    }

    #[test]
    fn test_rest_is_clamped_at_zero() {
        let horizon = Horizon::spanning(p(7), p(8));
        let demand = series(7, &[500]);

        let rows = WaterfallAllocator::new("W1", gross_die(100))
            .allocate(&horizon, &demand, &pools(300), &MonthlySeries::new())
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].available, Die::from(300));
        assert_eq!(rows[0].allocated, Die::from(300));
        assert_eq!(rows[0].rest, Die::ZERO);
    }

    #[test]
    fn test_fab_output_arrives_one_month_later() {
        let horizon = Horizon::spanning(p(7), p(10));
        let demand = series(7, &[100, 400, 50]);
        let fab_output = series(6, &[9, 2, 3]);
        let mut opening = pools(200);
        opening.cp_wip = Die::from(50);
        opening.fab_warehouse = Wafers::from(1);

        let rows = WaterfallAllocator::new("W1", gross_die(100))
            .allocate(&horizon, &demand, &opening, &fab_output)
            .unwrap();

        // 200 + 50 + 1×100，六月的產出不計入
        assert_eq!(rows[0].available, Die::from(350));
        assert_eq!(rows[0].rest, Die::from(250));
        // 250 + 七月 2 片
        assert_eq!(rows[1].available, Die::from(450));
        assert_eq!(rows[1].allocated, Die::from(400));
        // 50 + 八月 3 片
        assert_eq!(rows[2].available, Die::from(350));
        assert_eq!(rows[2].rest, Die::from(300));
    }

    #[rstest]
    #[case(300, -120, -120, 420)]
    #[case(0, 80, 0, 0)]
    #[case(100, 100, 100, 0)]
    fn test_single_period_cases(
        #[case] supply: i64,
        #[case] need: i64,
        #[case] allocated: i64,
        #[case] rest: i64,
    ) {
        let horizon = Horizon::spanning(p(7), p(8));
        let demand = series(7, &[need]);

        let rows = WaterfallAllocator::new("W1", gross_die(100))
            .allocate(&horizon, &demand, &pools(supply), &MonthlySeries::new())
            .unwrap();

        assert_eq!(rows[0].allocated, Die::from(allocated));
        assert_eq!(rows[0].rest, Die::from(rest));
    }

    #[test]
    fn test_fractional_gross_die() {
        let horizon = Horizon::spanning(p(7), p(8));
        let mut opening = SupplyPools::default();
        opening.fab_shipped_before_anchor = Wafers::new(dec!(0.5));

        let rows = WaterfallAllocator::new("W1", GrossDie::new(dec!(812.5)).unwrap())
            .allocate(&horizon, &MonthlySeries::new(), &opening, &MonthlySeries::new())
            .unwrap();

        assert_eq!(rows[0].available, Die::new(dec!(406.25)));
        assert_eq!(rows[0].allocated, Die::ZERO);
    }

    #[test]
    fn test_negative_supply_keeps_invariant() {
        let horizon = Horizon::spanning(p(7), p(9));
        let demand = series(7, &[10, 10]);
        let fab_output = series(7, &[-5]);

        let rows = WaterfallAllocator::new("W1", gross_die(10))
            .allocate(&horizon, &demand, &pools(10), &fab_output)
            .unwrap();

        assert_eq!(rows[1].available, Die::from(-50));
        assert_eq!(rows[1].allocated, Die::from(-50));
        assert_eq!(rows[1].rest, Die::ZERO);
    }
}
