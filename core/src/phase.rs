//! Phase trait and the per-timestep context phases operate on.
//!
//! RULE: Every step of a timestep implements SimPhase.
//! The engine calls update() on each registered phase
//! in registration order, every timestep.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    buffer::{BufferOverflow, GlobalBuffer},
    config::SimConfig,
    error::SimResult,
    event::SimEvent,
    rng::{PhaseRng, PhaseSlot},
    server::Server,
    types::Tick,
};

/// Mutable simulation state that survives between timesteps.
#[derive(Debug, Clone)]
pub struct SimState {
    pub servers: Vec<Server>,
    pub buffer: GlobalBuffer,
    next_request_id: u64,
}

impl SimState {
    pub fn new(servers: Vec<Server>, buffer_capacity: usize) -> Self {
        Self {
            servers,
            buffer: GlobalBuffer::new(buffer_capacity),
            next_request_id: 0,
        }
    }

    /// Request ids are unique and increasing within a run.
    pub fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn attendant_count(&self) -> usize {
        self.servers.iter().map(|s| s.attendants().len()).sum()
    }

    pub fn active_attendant_count(&self) -> usize {
        self.servers
            .iter()
            .flat_map(|s| s.attendants())
            .filter(|a| a.is_active())
            .count()
    }
}

/// Scratch space for one timestep. Built by the engine, threaded
/// through every phase, then folded into the run's log.
pub struct TickContext<'a> {
    pub tick: Tick,
    pub config: &'a SimConfig,
    pub state: &'a mut SimState,
    pub served: u64,
    pub dropped: u64,
    /// Set by generation; the engine stops the run when it sees it.
    pub overflow: Option<BufferOverflow>,
}

impl<'a> TickContext<'a> {
    pub fn new(tick: Tick, config: &'a SimConfig, state: &'a mut SimState) -> Self {
        Self {
            tick,
            config,
            state,
            served: 0,
            dropped: 0,
            overflow: None,
        }
    }
}

/// The contract every phase must fulfill.
pub trait SimPhase {
    /// Unique stable name for this phase.
    fn name(&self) -> &'static str;

    /// Which RNG stream this phase draws from.
    fn slot(&self) -> PhaseSlot;

    /// Called once per timestep by the engine.
    ///
    /// - `ctx`: shared state plus this timestep's counters
    /// - `rng`: this phase's deterministic RNG for this timestep
    ///
    /// Returns the events to add to the timestep's event log.
    fn update(&mut self, ctx: &mut TickContext<'_>, rng: &mut PhaseRng) -> SimResult<Vec<SimEvent>>;
}
