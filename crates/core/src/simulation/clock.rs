//! Fixed-interval tick driver
//!
//! Converts variable frame times into a whole number of fixed ticks. When the
//! caller falls far behind, at most `max_catch_up` ticks are released per
//! update and the rest of the backlog is dropped.

use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepDriver {
    interval: f32,
    max_catch_up: u32,
    accumulator: f32,
}

impl FixedStepDriver {
    pub fn new(interval: f32, max_catch_up: u32) -> Self {
        Self {
            interval,
            max_catch_up: max_catch_up.max(1),
            accumulator: 0.0,
        }
    }

    /// Seconds between ticks
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Time carried over toward the next tick
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Add elapsed seconds and return how many ticks are due now
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 || self.interval <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed;

        let mut due = 0;
        while self.accumulator >= self.interval && due < self.max_catch_up {
            self.accumulator -= self.interval;
            due += 1;
        }
        if self.accumulator >= self.interval {
            debug!(
                "Dropping {:.3}s of atmospherics backlog",
                self.accumulator - self.accumulator % self.interval
            );
            self.accumulator %= self.interval;
        }
        due
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
