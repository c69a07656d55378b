//! 主計劃示範
//!
//! 讀取 JSON 快照並印出料號/晶圓主計劃。
//!
//! ```text
//! cargo run --example master_plan -- demos/snapshot.json demos/config.json
//! RUST_LOG=debug cargo run --example master_plan
//! ```

use anyhow::{Context, Result};
use fabplan::{MasterPlan, Period, PlanConfig, PlanEngine, PlanInput, Quantity};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let mut args = std::env::args().skip(1);
    let snapshot_path = args.next().unwrap_or_else(|| "demos/snapshot.json".to_string());
    let config_path = args.next().unwrap_or_else(|| "demos/config.json".to_string());

    let snapshot = std::fs::read_to_string(&snapshot_path)
        .with_context(|| format!("無法讀取快照 {}", snapshot_path))?;
    let input = PlanInput::from_json_str(&snapshot).context("快照格式錯誤")?;

    let config = std::fs::read_to_string(&config_path)
        .with_context(|| format!("無法讀取配置 {}", config_path))?;
    let config = PlanConfig::from_json_str(&config).context("配置格式錯誤")?;

    let plan = PlanEngine::new(config).run(&input)?;
    print_plan(&plan);

    Ok(())
}

fn print_plan(plan: &MasterPlan) {
    let periods = plan.horizon.reported();
    let header: Vec<String> = periods.iter().map(Period::to_string).collect();

    println!("== 料號投單計劃 ==");
    println!("{:<14} {:<8} {}", "料號", "晶圓", header.join("\t"));
    for sku in plan.skus.values() {
        let row: Vec<String> = sku
            .finished_release
            .values_over(periods)
            .map(|q| q.to_string())
            .collect();
        println!(
            "{:<14} {:<8} {}",
            sku.part_id,
            sku.wafer_id.as_deref().unwrap_or("-"),
            row.join("\t")
        );
        if let Some(semi) = &sku.semi_release {
            let row: Vec<String> = semi.values_over(periods).map(|q| q.to_string()).collect();
            println!("{:<14} {:<8} {}", "  └ 半成品", "", row.join("\t"));
        }
    }

    println!();
    println!("== 晶圓主計劃 ==");
    match &plan.wafers {
        Ok(wafers) => {
            for wafer in wafers.values() {
                println!(
                    "{} (GROSS DIE {})  使用料號: {}",
                    wafer.wafer_id,
                    wafer.gross_die,
                    wafer.consumers.join(", ")
                );
                for &period in periods {
                    println!(
                        "  {}  需求 {:>10}  可用 {:>10}  分配 {:>10}  結轉 {:>10}  缺口 {:>8}  累計缺口 {:>8}",
                        period,
                        wafer.demand.get(period),
                        wafer.available.get(period),
                        wafer.allocated.get(period),
                        wafer.rest.get(period),
                        wafer.monthly_gap.get(period).value().round_dp(2),
                        wafer.cumulative_gap.get(period).value().round_dp(2),
                    );
                }
            }
        }
        Err(e) => println!("晶圓表計算失敗: {}", e),
    }

    if !plan.fab_weekly.is_empty() {
        println!();
        println!("== 代工廠週別出貨 ==");
        for row in &plan.fab_weekly {
            println!(
                "{:<10} {:<8} {} {:<12} {}",
                row.wafer_id,
                row.fab,
                row.period,
                row.week.label(),
                row.quantity
            );
        }
    }

    if !plan.warnings.is_empty() {
        println!();
        println!("== 警告 ==");
        for warning in &plan.warnings {
            println!(
                "[{:?}/{:?}] {}: {}",
                warning.severity, warning.kind, warning.entity_id, warning.message
            );
        }
    }
}
