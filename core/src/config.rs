use crate::{
    error::{SimError, SimResult},
    types::Tick,
};
use serde::{Deserialize, Serialize};

/// Inclusive range of requests generated per timestep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub server_count: usize,
    /// One entry per server, in declaration order.
    pub server_capacities: Vec<usize>,
    pub timestep_count: Tick,
    pub requests_per_timestep: RequestRange,
    /// Per active attendant, per timestep.
    pub failure_probability: f64,
    pub buffer_capacity: usize,
    /// Probability a generated request or a new attendant is Sales.
    pub sales_probability: f64,
    /// Bound on every per-server, per-category queue. None = unbounded.
    pub queue_capacity: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            server_count: 3,
            server_capacities: vec![5, 7, 10],
            timestep_count: 100,
            requests_per_timestep: RequestRange { min: 10, max: 20 },
            failure_probability: 0.1,
            buffer_capacity: 50,
            sales_probability: 0.5,
            queue_capacity: None,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing fields fall back to `Default`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Small, fast, deterministic config for tests.
    pub fn default_test() -> Self {
        Self {
            server_count: 2,
            server_capacities: vec![3, 4],
            timestep_count: 20,
            requests_per_timestep: RequestRange { min: 2, max: 6 },
            failure_probability: 0.05,
            buffer_capacity: 10,
            sales_probability: 0.5,
            queue_capacity: None,
        }
    }

    /// Checked once, before any timestep runs. Nothing is defaulted silently.
    pub fn validate(&self) -> SimResult<()> {
        if self.server_count == 0 {
            return Err(SimError::invalid_config("server_count must be at least 1"));
        }
        if self.server_capacities.len() != self.server_count {
            return Err(SimError::invalid_config(format!(
                "server_capacities has {} entries but server_count is {}",
                self.server_capacities.len(),
                self.server_count
            )));
        }
        if self.timestep_count == 0 {
            return Err(SimError::invalid_config("timestep_count must be at least 1"));
        }
        let range = self.requests_per_timestep;
        if range.min > range.max {
            return Err(SimError::invalid_config(format!(
                "requests_per_timestep min {} exceeds max {}",
                range.min, range.max
            )));
        }
        check_probability("failure_probability", self.failure_probability)?;
        check_probability("sales_probability", self.sales_probability)?;
        Ok(())
    }
}

fn check_probability(name: &str, p: f64) -> SimResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SimError::invalid_config(format!(
            "{name} must be within [0, 1], got {p}"
        )));
    }
    Ok(())
}
