//! Shared primitive types used across the entire simulation.

/// A simulation timestep. Timesteps are numbered from 0.
pub type Tick = u64;

/// A stable, unique identifier for any entity in the simulation.
pub type EntityId = String;

/// The canonical run identifier.
pub type RunId = String;
