//! Discrete-time simulation of a pool of servers whose attendants work
//! per-category request queues, fail at random, and share one bounded
//! intake buffer.
//!
//! Start with [`engine::SimEngine`]; hand its log to [`report::report_run`].

pub mod attendant;
pub mod buffer;
pub mod config;
pub mod dispatch_phase;
pub mod engine;
pub mod error;
pub mod event;
pub mod failure_phase;
pub mod generation_phase;
pub mod phase;
pub mod processing_phase;
pub mod report;
pub mod rng;
pub mod server;
pub mod setup;
pub mod store;
pub mod types;
