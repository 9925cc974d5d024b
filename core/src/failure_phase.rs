use crate::{
    error::SimResult,
    event::SimEvent,
    phase::{SimPhase, TickContext},
    rng::{PhaseRng, PhaseSlot},
};

/// Step 4: the failure monitor.
///
/// One independent Bernoulli trial per attendant that is active when the
/// step begins. A failed attendant stays failed for the rest of the run.
#[derive(Debug, Default)]
pub struct Supervisor;

impl SimPhase for Supervisor {
    fn name(&self) -> &'static str { "failure" }

    fn slot(&self) -> PhaseSlot { PhaseSlot::Failure }

    fn update(&mut self, ctx: &mut TickContext<'_>, rng: &mut PhaseRng) -> SimResult<Vec<SimEvent>> {
        let tick = ctx.tick;
        let p = ctx.config.failure_probability;
        let mut events = Vec::new();

        for server in ctx.state.servers.iter_mut() {
            let server_name = server.name.clone();
            for attendant in server.attendants_mut().iter_mut().filter(|a| a.is_active()) {
                if !rng.chance(p) {
                    continue;
                }
                attendant.fail();
                log::warn!(
                    "Attendant {} ({}) failed on {server_name} at timestep {tick}",
                    attendant.id,
                    attendant.category
                );
                events.push(SimEvent::AttendantFailed {
                    tick,
                    attendant_id: attendant.id.clone(),
                    category: attendant.category,
                    server: server_name.clone(),
                });
            }
        }

        Ok(events)
    }
}
