//! Everything the engine reports about a run.
//!
//! RULE: Phases communicate results to the engine ONLY through events
//! and the per-tick context. Events are what the console narrates and
//! what the store's event log records.

use crate::{
    attendant::Category,
    types::{EntityId, RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants may be appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
        servers: usize,
        attendants: usize,
    },
    TimestepStarted {
        tick: Tick,
    },
    TimestepCompleted {
        tick: Tick,
        served: u64,
        buffer_remaining: usize,
    },
    RunFinished {
        tick: Tick,
        status: String,
    },

    // ── Generation ─────────────────────────────────
    RequestsGenerated {
        tick: Tick,
        sales: u64,
        support: u64,
    },
    BufferOverflowed {
        tick: Tick,
        capacity: usize,
        generated_before_overflow: u64,
    },

    // ── Dispatch ───────────────────────────────────
    RequestDropped {
        tick: Tick,
        request_id: u64,
        category: Category,
    },

    // ── Failure monitor ────────────────────────────
    AttendantFailed {
        tick: Tick,
        attendant_id: EntityId,
        category: Category,
        server: String,
    },
}

impl SimEvent {
    /// Stable name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }    => "run_initialized",
            Self::TimestepStarted { .. }   => "timestep_started",
            Self::TimestepCompleted { .. } => "timestep_completed",
            Self::RunFinished { .. }       => "run_finished",
            Self::RequestsGenerated { .. } => "requests_generated",
            Self::BufferOverflowed { .. }  => "buffer_overflowed",
            Self::RequestDropped { .. }    => "request_dropped",
            Self::AttendantFailed { .. }   => "attendant_failed",
        }
    }
}

/// One row of the run's output log; one per completed timestep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub timestep: Tick,
    pub served_count: u64,
    pub buffer_remaining: u64,
}

/// A single attendant failure, as narrated on the console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureNotice {
    pub tick: Tick,
    pub attendant_id: EntityId,
    pub category: Category,
    pub server: String,
}

impl FailureNotice {
    pub fn from_event(event: &SimEvent) -> Option<Self> {
        match event {
            SimEvent::AttendantFailed { tick, attendant_id, category, server } => Some(Self {
                tick: *tick,
                attendant_id: attendant_id.clone(),
                category: *category,
                server: server.clone(),
            }),
            _ => None,
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub phase: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
