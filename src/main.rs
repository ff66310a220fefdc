//! `er-sim`: run the admission simulation and print the status table.
//!
//! Configuration comes from `ER_SIM_CONFIG` (a JSON file) plus the
//! `ER_SIM_WORKERS`, `ER_SIM_RUN_MS` and `ER_SIM_SEED` overrides. Logs go to
//! stderr, filtered by `RUST_LOG`.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use er_admission::builders::build_simulation;
use er_admission::config::SimulationConfig;
use er_admission::core::AppResult;
use er_admission::infra::observer::{ChannelObserver, TableObserver};
use er_admission::util::init_tracing;

fn main() -> AppResult<()> {
    init_tracing();

    let cfg = SimulationConfig::from_env().context("loading simulation config")?;
    info!(?cfg, "configuration loaded");

    let table = TableObserver::stdout();
    table.write_header().context("writing table header")?;
    let (observer, pump) = ChannelObserver::forwarding_to(Arc::new(table))?;

    let report = build_simulation(&cfg, Arc::new(observer))?
        .run()
        .context("running simulation")?;
    let rendered = pump.join()?;

    println!();
    println!("run {}", report.run_id);
    println!(
        "arrivals {}, treated {}, without ventilator {}, events {rendered}",
        report.arrivals,
        report.treated(),
        report.degraded()
    );
    for worker in &report.workers {
        println!(
            "  worker {} treated {} ({} without ventilator)",
            worker.worker_id, worker.treated, worker.degraded
        );
    }
    println!(
        "capacity added {}, breaks taken {}, breaks skipped {}",
        report.capacity_added, report.fatigue.breaks_taken, report.fatigue.breaks_skipped
    );
    println!("final {}", report.final_resources);
    Ok(())
}
