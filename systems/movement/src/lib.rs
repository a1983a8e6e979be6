#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that advances mobs along their routes.

use std::time::Duration;

use tower_defence_core::{Command, Event, MobSnapshot, MobView, Route};

/// Pure system that reacts to elapsed time and emits mob advancement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Mobs are processed in id order. The slow active at the start of the
    /// tick governs its speed; the decayed slow is written back with the move.
    pub fn handle(&self, events: &[Event], mobs: &MobView, routes: &[Route], out: &mut Vec<Command>) {
        let dt = elapsed(events);
        if dt.is_zero() {
            return;
        }

        for mob in mobs.iter().filter(|mob| mob.is_alive()) {
            let Some(route) = routes.iter().find(|route| route.id() == mob.route) else {
                tracing::warn!(
                    mob = mob.id.get(),
                    route = mob.route.get(),
                    "mob references a missing route"
                );
                continue;
            };
            out.push(advance(mob, route, dt));
        }
    }
}

fn elapsed(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt, .. } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}

fn advance(mob: &MobSnapshot, route: &Route, dt: Duration) -> Command {
    let multiplier = mob.slow.map_or(1.0, |slow| slow.multiplier);
    let speed = mob.base_speed * multiplier;
    let progress = (mob.progress + speed * dt.as_secs_f32()).min(route.final_progress());

    Command::AdvanceMob {
        mob: mob.id,
        progress,
        position: route.position_at(progress),
        slow: mob.slow.and_then(|slow| slow.decay(dt)),
    }
}
