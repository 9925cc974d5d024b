use crate::{
    error::SimResult,
    event::SimEvent,
    phase::{SimPhase, TickContext},
    rng::{PhaseRng, PhaseSlot},
};

/// Step 3: every server works its queues, in declaration order.
#[derive(Debug, Default)]
pub struct QueueProcessor;

impl SimPhase for QueueProcessor {
    fn name(&self) -> &'static str { "processing" }

    fn slot(&self) -> PhaseSlot { PhaseSlot::Processing }

    fn update(&mut self, ctx: &mut TickContext<'_>, _rng: &mut PhaseRng) -> SimResult<Vec<SimEvent>> {
        let tick = ctx.tick;
        for server in ctx.state.servers.iter_mut() {
            let served = server.process();
            ctx.served += served.total();
            log::debug!(
                "tick={tick} {} served sales={} support={}",
                server.name,
                served.sales,
                served.support
            );
        }
        Ok(vec![])
    }
}
