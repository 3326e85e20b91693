//! Wall-clock sources
//!
//! The simulation counts ticks, not time. The one exception is the player's
//! fire-rate limit, which compares wall-clock timestamps, so the clock is
//! injected and tests can step it by hand.

use std::cell::Cell;

/// Source of wall-clock milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Real time from the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock for tests and headless runs
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    /// Duration of one display frame at 60 Hz
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1000.0);
        clock.advance(ManualClock::FRAME_MS * 6.0);
        assert!((clock.now_ms() - 1100.0).abs() < 1e-9);
    }
}
