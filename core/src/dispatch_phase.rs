use crate::{
    error::SimResult,
    event::SimEvent,
    phase::{SimPhase, TickContext},
    rng::{PhaseRng, PhaseSlot},
};

/// Step 2: drain the global buffer into per-server queues.
///
/// Each request goes to a uniformly chosen server whose queue for the
/// request's category still has room. With no such server the request
/// is dropped; it is never retried.
#[derive(Debug, Default)]
pub struct Dispatcher;

impl SimPhase for Dispatcher {
    fn name(&self) -> &'static str { "dispatch" }

    fn slot(&self) -> PhaseSlot { PhaseSlot::Dispatch }

    fn update(&mut self, ctx: &mut TickContext<'_>, rng: &mut PhaseRng) -> SimResult<Vec<SimEvent>> {
        let tick = ctx.tick;
        let mut events = Vec::new();
        let mut routed = 0u64;

        while let Some(token) = ctx.state.buffer.pop() {
            let candidates: Vec<usize> = ctx
                .state
                .servers
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.queues.get(token.category).is_full())
                .map(|(i, _)| i)
                .collect();

            let accepted = if candidates.is_empty() {
                false
            } else {
                let idx = candidates[rng.pick_index(candidates.len())];
                ctx.state.servers[idx]
                    .queues
                    .get_mut(token.category)
                    .enqueue(token)
                    .is_ok()
            };

            if accepted {
                routed += 1;
            } else {
                ctx.dropped += 1;
                events.push(SimEvent::RequestDropped {
                    tick,
                    request_id: token.id,
                    category: token.category,
                });
            }
        }

        log::debug!("tick={tick} dispatched {routed} requests, dropped {}", ctx.dropped);
        Ok(events)
    }
}
