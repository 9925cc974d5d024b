//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through PhaseRng instances derived
//! from the single master seed the engine was built with.
//!
//! Each phase gets its own RNG stream per timestep, seeded from
//! (master_seed, phase_index, tick). This means:
//!   - Drawing more numbers in one phase never shifts another phase's stream.
//!   - Each (phase, tick) stream is fully reproducible in isolation.

use crate::{attendant::Category, types::Tick};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const PHASE_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
const TICK_MIX: u64 = 0xbf58_476d_1ce4_e5b9;

/// A named, deterministic RNG for a single phase.
pub struct PhaseRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl PhaseRng {
    /// Create a phase RNG from the master seed and a stable phase index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, phase_index: u64) -> Self {
        let derived_seed = master_seed ^ phase_index.wrapping_mul(PHASE_MIX);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a u64 in [lo, hi]. Callers guarantee lo <= hi.
    pub fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = hi - lo;
        if span == u64::MAX {
            return self.inner.next_u64();
        }
        lo + self.next_u64_below(span + 1)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick Sales with probability `sales_probability`, Support otherwise.
    pub fn category(&mut self, sales_probability: f64) -> Category {
        if self.chance(sales_probability) {
            Category::Sales
        } else {
            Category::Support
        }
    }

    /// Uniform choice of an index into a slice of length `len`.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }
}

/// Source of every phase RNG for a single run.
#[derive(Debug, Clone)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// The stream used once, before the first timestep.
    pub fn for_setup(&self) -> PhaseRng {
        PhaseRng::new(self.master_seed, PhaseSlot::Setup as u64).with_name(PhaseSlot::Setup.name())
    }

    /// The stream a phase draws from during `tick`.
    pub fn for_phase_at_tick(&self, slot: PhaseSlot, tick: Tick) -> PhaseRng {
        let mixed = self.master_seed ^ (tick.wrapping_add(1)).wrapping_mul(TICK_MIX);
        PhaseRng::new(mixed, slot as u64).with_name(slot.name())
    }
}

/// Stable phase slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every phase's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum PhaseSlot {
    Setup = 0,
    Generation = 1,
    Dispatch = 2,
    Processing = 3,
    Failure = 4,
}

impl PhaseSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Generation => "generation",
            Self::Dispatch => "dispatch",
            Self::Processing => "processing",
            Self::Failure => "failure",
        }
    }
}
