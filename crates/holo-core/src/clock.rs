//! Millisecond clocks injected into the pipeline.
//!
//! The core never reads wall time itself; the frame loop passes `now_ms` from
//! one of these so tests can drive every timed behavior without sleeping.

use instant::Instant;
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> f64;
}

/// Monotonic clock backed by `instant` (performance.now() on the web).
#[derive(Clone, Debug)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Virtual clock advanced by hand. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Converts a variable-rate clock into whole fixed-interval steps.
///
/// Used for the 20 Hz ecosystem loop when it is driven from a faster timer.
#[derive(Clone, Debug)]
pub struct FixedStep {
    interval_ms: f64,
    accum_ms: f64,
    last_ms: Option<f64>,
}

impl FixedStep {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(1.0),
            accum_ms: 0.0,
            last_ms: None,
        }
    }

    /// Number of whole steps elapsed since the previous call, at most `max`.
    /// Time beyond `max` steps is dropped, not replayed on later calls.
    pub fn steps(&mut self, now_ms: f64, max: u32) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        self.accum_ms += (now_ms - last).max(0.0);
        let whole = (self.accum_ms / self.interval_ms).floor();
        self.accum_ms -= whole * self.interval_ms;
        whole.min(max as f64) as u32
    }
}
