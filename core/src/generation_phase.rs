use crate::{
    attendant::Category,
    buffer::RequestToken,
    error::SimResult,
    event::SimEvent,
    phase::{SimPhase, TickContext},
    rng::{PhaseRng, PhaseSlot},
};

/// Step 1: fill the global buffer with this timestep's new requests.
#[derive(Debug, Default)]
pub struct RequestGenerator;

impl SimPhase for RequestGenerator {
    fn name(&self) -> &'static str { "generation" }

    fn slot(&self) -> PhaseSlot { PhaseSlot::Generation }

    fn update(&mut self, ctx: &mut TickContext<'_>, rng: &mut PhaseRng) -> SimResult<Vec<SimEvent>> {
        let tick = ctx.tick;
        let range = ctx.config.requests_per_timestep;
        ctx.state.buffer.clear();

        let count = rng.range_inclusive(range.min, range.max);
        let (mut sales, mut support) = (0u64, 0u64);

        for generated in 0..count {
            let category = rng.category(ctx.config.sales_probability);
            let token = RequestToken {
                id: ctx.state.next_request_id(),
                category,
                created_at: tick,
            };

            if let Err(overflow) = ctx.state.buffer.push(token) {
                log::warn!(
                    "tick={tick} global buffer overflow at capacity {}, stopping run",
                    overflow.capacity
                );
                ctx.overflow = Some(overflow);
                return Ok(vec![SimEvent::BufferOverflowed {
                    tick,
                    capacity: overflow.capacity,
                    generated_before_overflow: generated,
                }]);
            }

            match category {
                Category::Sales => sales += 1,
                Category::Support => support += 1,
            }
        }

        log::debug!("tick={tick} generated {count} requests (sales={sales} support={support})");
        Ok(vec![SimEvent::RequestsGenerated { tick, sales, support }])
    }
}
