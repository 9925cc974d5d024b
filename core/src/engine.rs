//! The simulation engine.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Generation   (RequestGenerator)  fill the global buffer
//!   2. Dispatch     (Dispatcher)        buffer -> per-server queues
//!   3. Processing   (QueueProcessor)    queues -> served requests
//!   4. Failure      (Supervisor)        random attendant failures
//!   then the engine appends one LogEntry for the timestep.
//!
//! RULES:
//!   - Phases execute in registration order, every timestep.
//!   - All randomness flows through the RngBank.
//!   - A buffer overflow during generation ends the run on the spot:
//!     the remaining phases are skipped and no LogEntry is written.
//!   - When a store is attached, every event is recorded in its event log.

use crate::{
    config::SimConfig,
    dispatch_phase::Dispatcher,
    error::{SimError, SimResult},
    event::{EventLogEntry, FailureNotice, LogEntry, SimEvent},
    failure_phase::Supervisor,
    generation_phase::RequestGenerator,
    phase::{SimPhase, SimState, TickContext},
    processing_phase::QueueProcessor,
    rng::RngBank,
    server::Server,
    setup::build_servers,
    store::SimStore,
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Run state machine. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    TerminatedOverflow { timestep: Tick },
    Completed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::TerminatedOverflow { .. } => "terminated_overflow",
            Self::Completed => "completed",
        }
    }
}

/// What a single call to `tick()` did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Logged(LogEntry),
    Overflowed { timestep: Tick },
}

/// Everything a caller needs once the run is over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run_id: RunId,
    pub seed: u64,
    pub status: RunStatus,
    pub log: Vec<LogEntry>,
    pub failures: Vec<FailureNotice>,
    pub served_total: u64,
    pub dropped_total: u64,
}

pub struct SimEngine {
    pub run_id: RunId,
    pub rng_bank: RngBank,
    config: SimConfig,
    state: SimState,
    phases: Vec<Box<dyn SimPhase>>,
    status: RunStatus,
    next_tick: Tick,
    log: Vec<LogEntry>,
    failures: Vec<FailureNotice>,
    dropped_total: u64,
    store: Option<SimStore>,
}

impl SimEngine {
    /// Validate the config, build servers from the setup RNG stream and
    /// register the four phases in their documented order.
    pub fn new(run_id: RunId, seed: u64, config: SimConfig) -> SimResult<Self> {
        let rng_bank = RngBank::new(seed);
        let servers = build_servers(&config, &mut rng_bank.for_setup())?;
        Self::assemble(run_id, rng_bank, config, servers)
    }

    /// Same as `new` but with caller-built servers, e.g. to pin attendant
    /// categories. The config's server fields must still describe them.
    pub fn with_servers(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        servers: Vec<Server>,
    ) -> SimResult<Self> {
        config.validate()?;
        if servers.len() != config.server_count {
            return Err(SimError::invalid_config(format!(
                "{} servers supplied but server_count is {}",
                servers.len(),
                config.server_count
            )));
        }
        Self::assemble(run_id, RngBank::new(seed), config, servers)
    }

    fn assemble(
        run_id: RunId,
        rng_bank: RngBank,
        config: SimConfig,
        servers: Vec<Server>,
    ) -> SimResult<Self> {
        let state = SimState::new(servers, config.buffer_capacity);
        let mut engine = Self {
            run_id,
            rng_bank,
            config,
            state,
            phases: Vec::new(),
            status: RunStatus::Running,
            next_tick: 0,
            log: Vec::new(),
            failures: Vec::new(),
            dropped_total: 0,
            store: None,
        };

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(Box::new(RequestGenerator));
        engine.register(Box::new(Dispatcher));
        engine.register(Box::new(QueueProcessor));
        engine.register(Box::new(Supervisor));
        Ok(engine)
    }

    /// Record every event of the run into `store`'s event log.
    /// The caller inserts the run row first (`SimStore::insert_run`).
    pub fn attach_store(&mut self, store: SimStore) -> SimResult<()> {
        let init = SimEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed: self.rng_bank.master_seed(),
            servers: self.state.servers.len(),
            attendants: self.state.attendant_count(),
        };
        record(Some(&store), &self.run_id, 0, "engine", std::slice::from_ref(&init))?;
        self.store = Some(store);
        Ok(())
    }

    fn register(&mut self, phase: Box<dyn SimPhase>) {
        self.phases.push(phase);
    }

    /// Advance one timestep. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<TickOutcome> {
        if self.status.is_terminal() {
            return Err(SimError::RunFinished { status: self.status.label().to_string() });
        }

        let tick = self.next_tick;
        log::info!("Timestep {tick} started");
        let started = SimEvent::TimestepStarted { tick };
        record(self.store.as_ref(), &self.run_id, tick, "engine", std::slice::from_ref(&started))?;

        let mut ctx = TickContext::new(tick, &self.config, &mut self.state);
        for phase in &mut self.phases {
            let mut rng = self.rng_bank.for_phase_at_tick(phase.slot(), tick);
            let events = phase.update(&mut ctx, &mut rng)?;

            record(self.store.as_ref(), &self.run_id, tick, phase.name(), &events)?;
            self.failures.extend(events.iter().filter_map(FailureNotice::from_event));

            if ctx.overflow.is_some() {
                break;
            }
        }

        let (served, dropped, overflow) = (ctx.served, ctx.dropped, ctx.overflow);
        self.dropped_total += dropped;

        if overflow.is_some() {
            self.finish(tick, RunStatus::TerminatedOverflow { timestep: tick })?;
            return Ok(TickOutcome::Overflowed { timestep: tick });
        }

        let buffer_remaining = self.state.buffer.len();
        let entry = LogEntry {
            timestep: tick,
            served_count: served,
            buffer_remaining: buffer_remaining as u64,
        };
        self.log.push(entry);
        let completed = SimEvent::TimestepCompleted { tick, served, buffer_remaining };
        record(self.store.as_ref(), &self.run_id, tick, "engine", std::slice::from_ref(&completed))?;

        self.next_tick += 1;
        if self.next_tick >= self.config.timestep_count {
            self.finish(tick, RunStatus::Completed)?;
        }
        Ok(TickOutcome::Logged(entry))
    }

    /// Run until COMPLETED or TERMINATED_OVERFLOW.
    pub fn run(&mut self) -> SimResult<RunReport> {
        while !self.status.is_terminal() {
            self.tick()?;
        }
        Ok(self.report())
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            run_id: self.run_id.clone(),
            seed: self.rng_bank.master_seed(),
            status: self.status,
            log: self.log.clone(),
            failures: self.failures.clone(),
            served_total: self.log.iter().map(|e| e.served_count).sum(),
            dropped_total: self.dropped_total,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn servers(&self) -> &[Server] {
        &self.state.servers
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn failures(&self) -> &[FailureNotice] {
        &self.failures
    }

    pub fn store(&self) -> Option<&SimStore> {
        self.store.as_ref()
    }

    pub fn total_attendants(&self) -> usize {
        self.state.attendant_count()
    }

    pub fn active_attendants(&self) -> usize {
        self.state.active_attendant_count()
    }

    fn finish(&mut self, tick: Tick, status: RunStatus) -> SimResult<()> {
        self.status = status;
        match status {
            RunStatus::TerminatedOverflow { timestep } => {
                log::warn!("Run {} terminated by buffer overflow at timestep {timestep}", self.run_id)
            }
            _ => log::info!("Run {} completed after {} timesteps", self.run_id, self.log.len()),
        }

        let event = SimEvent::RunFinished { tick, status: status.label().to_string() };
        record(self.store.as_ref(), &self.run_id, tick, "engine", std::slice::from_ref(&event))?;
        if let Some(store) = &self.store {
            store.finish_run(&self.run_id, status.label(), self.log.len() as u64)?;
        }
        Ok(())
    }
}

/// Append `events` to the store's event log, if there is a store.
fn record(
    store: Option<&SimStore>,
    run_id: &str,
    tick: Tick,
    phase: &str,
    events: &[SimEvent],
) -> SimResult<()> {
    let Some(store) = store else { return Ok(()) };
    for event in events {
        let entry = EventLogEntry {
            id: None,
            run_id: run_id.to_string(),
            tick,
            phase: phase.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        };
        store.append_event(&entry)?;
    }
    Ok(())
}
