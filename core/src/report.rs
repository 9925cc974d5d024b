//! Result reporting: everything that consumes a finished run's log.
//!
//! The engine never calls into this module. Callers hand the ordered
//! `LogEntry` sequence to `report_run` together with the reporters they want.

mod chart;
mod csv;
mod store;

pub use chart::{ChartConfig, ChartReporter};
pub use csv::{read_log_csv, write_log_csv, CsvReporter};
pub use store::StoreReporter;

use crate::{error::SimResult, event::LogEntry};

/// Default directory for every file a reporter writes.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const LOG_CSV_FILE: &str = "logs.csv";
pub const CHART_FILE: &str = "served_per_timestep.png";

/// A consumer of the per-timestep log.
pub trait ResultReporter {
    /// Short name used in status lines.
    fn name(&self) -> &'static str;

    /// Persist or render `log`. Only called with a non-empty log.
    fn report(&self, log: &[LogEntry]) -> SimResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The run produced no log entries; no reporter was called.
    Skipped,
    /// Names of the reporters that ran, in order.
    Written(Vec<&'static str>),
}

/// Feed `log` to every reporter in order, stopping at the first error.
pub fn report_run(log: &[LogEntry], reporters: &[&dyn ResultReporter]) -> SimResult<ReportOutcome> {
    if log.is_empty() {
        log::info!("Run produced no data, skipping {} reporters", reporters.len());
        return Ok(ReportOutcome::Skipped);
    }

    let mut written = Vec::with_capacity(reporters.len());
    for reporter in reporters {
        reporter.report(log)?;
        log::debug!("{} wrote {} entries", reporter.name(), log.len());
        written.push(reporter.name());
    }
    Ok(ReportOutcome::Written(written))
}
