//! Run setup: servers populated with randomly specialised attendants.

use crate::{
    attendant::{Attendant, Category},
    config::SimConfig,
    error::SimResult,
    rng::PhaseRng,
    server::Server,
};

/// Build `config.server_count` servers, filling every capacity slot with an
/// attendant whose category is an independent coin flip.
///
/// Validates the config first so a capacity list mismatch is reported
/// before any timestep runs.
pub fn build_servers(config: &SimConfig, rng: &mut PhaseRng) -> SimResult<Vec<Server>> {
    config.validate()?;

    let mut servers = Vec::with_capacity(config.server_count);
    for (i, &capacity) in config.server_capacities.iter().enumerate() {
        let mut server = Server::new(format!("Server-{}", i + 1), capacity, config.queue_capacity);
        for slot in 0..capacity {
            let category = rng.category(config.sales_probability);
            let id = format!("{}-{slot}", server.name);
            server.add_attendant(Attendant::new(id, category))?;
        }
        log::debug!(
            "{} ready with {} attendants ({} sales)",
            server.name,
            capacity,
            server.attendants().iter().filter(|a| a.category == Category::Sales).count()
        );
        servers.push(server);
    }
    Ok(servers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SimError, rng::RngBank};

    #[test]
    fn servers_are_filled_to_capacity() {
        let config = SimConfig::default();
        let servers = build_servers(&config, &mut RngBank::new(7).for_setup()).unwrap();

        let names: Vec<&str> = servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Server-1", "Server-2", "Server-3"]);
        for (server, cap) in servers.iter().zip([5, 7, 10]) {
            assert_eq!(server.attendants().len(), cap);
            assert!(server.attendants().iter().all(|a| a.is_active()));
            assert_eq!(server.attendants()[0].id, format!("{}-0", server.name));
        }
    }

    #[test]
    fn capacity_length_mismatch_is_rejected() {
        let config = SimConfig {
            server_count: 3,
            server_capacities: vec![5, 7],
            ..SimConfig::default()
        };
        let err = build_servers(&config, &mut RngBank::new(7).for_setup()).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { .. }), "got {err:?}");
    }
}
