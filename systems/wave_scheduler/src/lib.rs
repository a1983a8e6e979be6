#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system that releases mobs according to the running wave.
//!
//! The scheduler is stateless with respect to time: every tick it compares
//! how many mobs each entry should have released by now against how many the
//! world reports as spawned, and emits the difference. Route choice is
//! delegated to a [`RouteSelector`] so tests can pin it.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{ActiveWave, Command, RouteId, WaveEntry};

/// Chooses which route a freshly spawned mob follows.
pub trait RouteSelector {
    /// Returns an index in `0..route_count`. Only called with `route_count > 0`.
    fn select(&mut self, route_count: usize) -> usize;
}

/// Picks routes uniformly at random.
#[derive(Clone, Debug)]
pub struct UniformRoutes<R> {
    rng: R,
}

impl<R: Rng> UniformRoutes<R> {
    /// Wraps the provided random source.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UniformRoutes<ChaCha8Rng> {
    /// Creates a reproducible selector from a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> RouteSelector for UniformRoutes<R> {
    fn select(&mut self, route_count: usize) -> usize {
        self.rng.gen_range(0..route_count)
    }
}

/// Always picks the same route, clamped to the last one available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedRoute(pub usize);

impl RouteSelector for FixedRoute {
    fn select(&mut self, route_count: usize) -> usize {
        self.0.min(route_count.saturating_sub(1))
    }
}

/// Pure system that emits spawn and completion commands for the running wave.
#[derive(Debug)]
pub struct WaveScheduler<S> {
    selector: S,
}

impl<S: RouteSelector> WaveScheduler<S> {
    /// Creates a scheduler that assigns routes with the provided selector.
    #[must_use]
    pub fn new(selector: S) -> Self {
        Self { selector }
    }

    /// Emits `SpawnMob` for every mob that is due and `CompleteWave` once the
    /// wave has released everything and no mob of it remains.
    pub fn handle(&mut self, active: Option<&ActiveWave>, routes: &[RouteId], out: &mut Vec<Command>) {
        let Some(active) = active else {
            return;
        };

        let wave = active.definition.id;
        let mut spawned_now = 0usize;
        let mut fully_released = true;

        for (entry, definition) in active.definition.entries.iter().enumerate() {
            let already = active.spawned.get(entry).copied().unwrap_or(0);
            let due = due_count(definition, active.elapsed);
            if due < definition.count {
                fully_released = false;
            }
            if routes.is_empty() {
                if already < definition.count {
                    fully_released = false;
                }
                continue;
            }

            for _ in already..due {
                let route = routes[self.selector.select(routes.len())];
                out.push(Command::SpawnMob {
                    wave,
                    entry,
                    category: definition.category,
                    route,
                });
                spawned_now += 1;
            }
        }

        if fully_released && spawned_now == 0 && active.alive == 0 {
            out.push(Command::CompleteWave { wave });
        }
    }
}

/// Number of mobs an entry should have released after `elapsed`.
#[must_use]
pub fn due_count(entry: &WaveEntry, elapsed: Duration) -> u32 {
    if elapsed < entry.start_delay || entry.count == 0 {
        return 0;
    }
    if entry.spacing.is_zero() {
        return entry.count;
    }

    let since_first = elapsed - entry.start_delay;
    let intervals = since_first.as_nanos() / entry.spacing.as_nanos();
    let due = u32::try_from(intervals.saturating_add(1)).unwrap_or(u32::MAX);
    due.min(entry.count)
}
