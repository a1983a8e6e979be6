use std::time::Duration;

use tower_defence_core::GameConfig;

/// Fixed-timestep driver that converts variable frame time into whole ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    step: Duration,
    max_frame: Duration,
    accumulator: Duration,
}

impl FrameClock {
    /// Creates a clock that emits ticks of `step`, accepting at most
    /// `max_frame` of wall time per frame.
    #[must_use]
    pub const fn new(step: Duration, max_frame: Duration) -> Self {
        Self {
            step,
            max_frame,
            accumulator: Duration::ZERO,
        }
    }

    /// Creates a clock from the configured tick rate and frame cap.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.tick_duration(), config.max_frame_delta())
    }

    /// Duration of one simulation tick.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Accumulates a frame's delta and returns how many ticks are due.
    pub fn advance(&mut self, frame_delta: Duration) -> u32 {
        if self.step.is_zero() {
            return 0;
        }

        self.accumulator = self
            .accumulator
            .saturating_add(frame_delta.min(self.max_frame));
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }
}
