//! Failure monitor behaviour and the invariants it must keep.

use attendsim_core::{
    config::SimConfig,
    engine::{SimEngine, TickOutcome},
    event::SimEvent,
    store::SimStore,
};
use proptest::prelude::*;

fn attendant_states(engine: &SimEngine) -> Vec<bool> {
    engine
        .servers()
        .iter()
        .flat_map(|s| s.attendants())
        .map(|a| a.is_active())
        .collect()
}

#[test]
fn certain_failure_takes_everyone_down_in_first_step() {
    let config = SimConfig { failure_probability: 1.0, ..SimConfig::default() };
    let mut engine = SimEngine::new("fail-all".into(), 11, config).unwrap();
    let total = engine.total_attendants();

    let run = engine.run().unwrap();

    assert_eq!(run.failures.len(), total, "one notice per attendant, exactly once");
    assert!(run.failures.iter().all(|f| f.tick == 0));
    assert_eq!(engine.active_attendants(), 0);
    assert!(run.log.iter().skip(1).all(|e| e.served_count == 0));
}

#[test]
fn zero_failure_probability_never_fails_anyone() {
    let config = SimConfig { failure_probability: 0.0, ..SimConfig::default() };
    let mut engine = SimEngine::new("fail-none".into(), 11, config).unwrap();

    let run = engine.run().unwrap();

    assert!(run.failures.is_empty());
    assert_eq!(engine.active_attendants(), engine.total_attendants());
}

#[test]
fn failure_notices_name_attendant_server_and_step() {
    let run_id = "fail-notices";
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.insert_run(run_id, 3, "0.1.0-test", "1970-01-01T00:00:00Z").unwrap();

    let config = SimConfig { failure_probability: 0.3, ..SimConfig::default_test() };
    let mut engine = SimEngine::new(run_id.into(), 3, config).unwrap();
    engine.attach_store(store).unwrap();
    let run = engine.run().unwrap();
    assert!(!run.failures.is_empty(), "p=0.3 over 20 steps should fail someone");

    let stored = engine.store().unwrap().events_of_type(run_id, "attendant_failed").unwrap();
    assert_eq!(stored.len(), run.failures.len());

    for (entry, notice) in stored.iter().zip(&run.failures) {
        assert_eq!(entry.tick, notice.tick);
        assert_eq!(entry.phase, "failure");
        assert!(notice.attendant_id.starts_with(&notice.server));
        let event: SimEvent = serde_json::from_str(&entry.payload).unwrap();
        assert!(matches!(
            event,
            SimEvent::AttendantFailed { ref attendant_id, .. } if *attendant_id == notice.attendant_id
        ));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Once failed, an attendant never comes back, and no step serves more
    /// requests than there were active attendants going into it.
    #[test]
    fn failures_are_monotonic_and_bound_throughput(seed in any::<u64>()) {
        let config = SimConfig { failure_probability: 0.15, ..SimConfig::default_test() };
        let mut engine = SimEngine::new("prop".into(), seed, config).unwrap();
        let total = engine.total_attendants() as u64;
        let mut previous = attendant_states(&engine);

        while !engine.status().is_terminal() {
            let active_before = engine.active_attendants() as u64;
            if let TickOutcome::Logged(entry) = engine.tick().unwrap() {
                prop_assert!(entry.served_count <= active_before);
                prop_assert!(entry.served_count <= total);
            }

            let current = attendant_states(&engine);
            for (was, now) in previous.iter().zip(&current) {
                prop_assert!(*was || !*now, "an attendant was revived");
            }
            previous = current;
        }
    }
}
