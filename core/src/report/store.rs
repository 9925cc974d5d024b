use super::ResultReporter;
use crate::{error::SimResult, event::LogEntry, store::SimStore};

/// Writes the log into the run's `timestep_log` rows.
pub struct StoreReporter<'a> {
    store: &'a SimStore,
    run_id: &'a str,
}

impl<'a> StoreReporter<'a> {
    pub fn new(store: &'a SimStore, run_id: &'a str) -> Self {
        Self { store, run_id }
    }
}

impl ResultReporter for StoreReporter<'_> {
    fn name(&self) -> &'static str { "sqlite" }

    fn report(&self, log: &[LogEntry]) -> SimResult<()> {
        self.store.save_log_entries(self.run_id, log)
    }
}
