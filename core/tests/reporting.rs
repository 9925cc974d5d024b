//! Reporters: CSV and SQLite round trips, and the empty-log rule.

use attendsim_core::{
    error::{SimError, SimResult},
    event::LogEntry,
    report::{
        read_log_csv, report_run, ChartReporter, CsvReporter, ReportOutcome, ResultReporter,
        StoreReporter, LOG_CSV_FILE,
    },
    config::SimConfig,
    engine::SimEngine,
    store::SimStore,
};
use std::cell::Cell;

fn sample_log() -> Vec<LogEntry> {
    vec![
        LogEntry { timestep: 0, served_count: 12, buffer_remaining: 0 },
        LogEntry { timestep: 1, served_count: 9, buffer_remaining: 0 },
        LogEntry { timestep: 2, served_count: 0, buffer_remaining: 3 },
    ]
}

struct CountingReporter {
    calls: Cell<usize>,
}

impl ResultReporter for CountingReporter {
    fn name(&self) -> &'static str { "counting" }

    fn report(&self, _log: &[LogEntry]) -> SimResult<()> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

#[test]
fn csv_round_trip_preserves_rows_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("outputs");
    let reporter = CsvReporter::new(&out);

    reporter.report(&sample_log()).unwrap();

    assert_eq!(reporter.path(), out.join(LOG_CSV_FILE));
    let text = std::fs::read_to_string(reporter.path()).unwrap();
    assert!(text.starts_with("timestep,served_count,buffer_remaining\n"));
    assert_eq!(read_log_csv(reporter.path()).unwrap(), sample_log());
}

#[test]
fn csv_of_a_real_run_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let run = SimEngine::new("csv-run".into(), 77, SimConfig::default())
        .unwrap()
        .run()
        .unwrap();
    let reporter = CsvReporter::new(dir.path());

    report_run(&run.log, &[&reporter]).unwrap();

    assert_eq!(read_log_csv(reporter.path()).unwrap(), run.log);
}

#[test]
fn malformed_csv_is_reported_with_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "timestep,served_count,buffer_remaining\n0,1,0\n1,x,0\n").unwrap();

    let err = read_log_csv(&path).unwrap_err();
    assert!(matches!(err, SimError::MalformedCsv { line: 3, .. }), "got {err:?}");

    std::fs::write(&path, "t,s,b\n0,1,0\n").unwrap();
    assert!(matches!(read_log_csv(&path), Err(SimError::MalformedCsv { line: 1, .. })));
}

#[test]
fn store_round_trip_preserves_rows_and_order() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.insert_run("store-rt", 1, "0.1.0-test", "1970-01-01T00:00:00Z").unwrap();

    let reporter = StoreReporter::new(&store, "store-rt");
    reporter.report(&sample_log()).unwrap();
    // Reporting twice replaces rather than duplicates.
    reporter.report(&sample_log()).unwrap();

    assert_eq!(store.log_entries("store-rt").unwrap(), sample_log());
}

#[test]
fn engine_records_final_status_in_store() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.insert_run("status-run", 9, "0.1.0-test", "1970-01-01T00:00:00Z").unwrap();

    let mut engine = SimEngine::new("status-run".into(), 9, SimConfig::default_test()).unwrap();
    engine.attach_store(store).unwrap();
    engine.run().unwrap();

    let (status, steps) = engine.store().unwrap().run_status("status-run").unwrap().unwrap();
    assert_eq!(status, "completed");
    assert_eq!(steps, 20);
}

#[test]
fn empty_log_skips_every_reporter() {
    let counting = CountingReporter { calls: Cell::new(0) };

    let outcome = report_run(&[], &[&counting]).unwrap();

    assert_eq!(outcome, ReportOutcome::Skipped);
    assert_eq!(counting.calls.get(), 0);
}

#[test]
fn non_empty_log_runs_reporters_in_order() {
    let first = CountingReporter { calls: Cell::new(0) };
    let second = CountingReporter { calls: Cell::new(0) };

    let outcome = report_run(&sample_log(), &[&first, &second]).unwrap();

    assert_eq!(outcome, ReportOutcome::Written(vec!["counting", "counting"]));
    assert_eq!((first.calls.get(), second.calls.get()), (1, 1));
}

#[test]
fn chart_reporter_refuses_an_empty_log() {
    let dir = tempfile::tempdir().unwrap();
    let chart = ChartReporter::new(dir.path());

    assert!(matches!(chart.report(&[]), Err(SimError::Chart(_))));
}

#[test]
fn chart_reporter_writes_png_for_a_real_run() {
    let dir = tempfile::tempdir().unwrap();
    let run = SimEngine::new("chart-run".into(), 31, SimConfig::default())
        .unwrap()
        .run()
        .unwrap();
    let chart = ChartReporter::new(dir.path());

    chart.report(&run.log).unwrap();

    assert!(chart.path().exists(), "expected {}", chart.path().display());
    assert!(std::fs::metadata(chart.path()).unwrap().len() > 0);
}
