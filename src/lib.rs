//! # Fabplan
//!
//! 晶圓主計劃：由預測、未交訂單與庫存推算成品/半成品投單計劃，
//! 再換算為晶圓需求並對晶圓供應做逐月瀑布分配。
//!
//! ```no_run
//! use fabplan::{PlanConfig, PlanEngine, PlanInput, Period};
//!
//! let input = PlanInput::from_json_str("{}")?;
//! let engine = PlanEngine::new(PlanConfig::new(Period::new(2025, 7)?));
//! let plan = engine.run(&input)?;
//! println!("{} 筆料號計劃", plan.skus.len());
//! # Ok::<(), fabplan::PlanError>(())
//! ```

pub use fabplan_calc::*;
pub use fabplan_core::*;
