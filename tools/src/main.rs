//! sim-runner: headless simulation runner.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 100 --out outputs
//!   sim-runner --config sim.json --db run.db

use anyhow::{Context, Result};
use attendsim_core::{
    config::SimConfig,
    engine::{RunReport, RunStatus, SimEngine},
    report::{self, ChartReporter, CsvReporter, ReportOutcome, ResultReporter, StoreReporter},
    store::SimStore,
};
use env_logger::Env;
use std::env;

fn main() -> Result<()> {
    logger_builder(Env::default()).init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let config_path = string_arg(&args, "--config");
    let out_dir = string_arg(&args, "--out").unwrap_or(report::DEFAULT_OUTPUT_DIR);
    let db = string_arg(&args, "--db").unwrap_or(":memory:");

    let mut config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    config.timestep_count = parse_arg(&args, "--ticks", config.timestep_count);

    println!("Attendant pool simulator - sim-runner");
    println!("  seed:      {seed}");
    println!("  servers:   {:?}", config.server_capacities);
    println!("  ticks:     {}", config.timestep_count);
    println!("  buffer:    {}", config.buffer_capacity);
    println!("  db:        {db}");
    println!("  out:       {out_dir}");
    println!();

    let store = SimStore::open(db).with_context(|| format!("opening {db}"))?;
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4().simple());
    let started_at = chrono::Utc::now().to_rfc3339();
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), &started_at)?;

    log::info!("Starting {run_id}");
    let mut engine = SimEngine::new(run_id.clone(), seed, config)?;
    engine.attach_store(store)?;
    let run = engine.run()?;

    print_summary(&engine, &run);

    let csv = CsvReporter::new(out_dir);
    let chart = ChartReporter::new(out_dir);
    let mut reporters: Vec<&dyn ResultReporter> = vec![&csv, &chart];
    let sqlite = engine.store().map(|store| StoreReporter::new(store, &run_id));
    if let Some(sqlite) = &sqlite {
        reporters.push(sqlite);
    }

    match report::report_run(&run.log, &reporters)? {
        ReportOutcome::Skipped => println!("Run produced no data; nothing was written."),
        ReportOutcome::Written(names) => {
            println!("Results saved to '{out_dir}' ({}).", names.join(", "))
        }
    }

    Ok(())
}

fn print_summary(engine: &SimEngine, run: &RunReport) {
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", run.run_id);
    println!("  timesteps:      {}", run.log.len());
    println!("  served:         {}", run.served_total);
    println!("  dropped:        {}", run.dropped_total);
    println!("  failures:       {}", run.failures.len());
    println!(
        "  attendants:     {} active of {}",
        engine.active_attendants(),
        engine.total_attendants()
    );
    match run.status {
        RunStatus::Completed => println!("Simulation completed normally."),
        RunStatus::TerminatedOverflow { timestep } => {
            println!("Global buffer overflowed at timestep {timestep}; simulation terminated early.")
        }
        RunStatus::Running => println!("Simulation stopped while still running."),
    }
}

/// Timestep starts and attendant failures are logged at info/warn, so the
/// filter defaults to info unless RUST_LOG says otherwise.
fn logger_builder(env: Env) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or("info"))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn logger_defaults_to_info_without_env_override() {
        let env = Env::new().filter("SIM_RUNNER_TEST_LOG_UNSET");
        let logger = logger_builder(env).build();
        assert_eq!(logger.filter(), LevelFilter::Info);
    }
}
