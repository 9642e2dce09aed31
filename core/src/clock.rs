//! Time source used for retry backoff and success-message expiry.
//!
//! `SystemClock` reads the OS clock and blocks the thread on `sleep`.
//! `ManualClock` keeps virtual time: `sleep` advances it instantly, which
//! lets tests assert on backoff totals without waiting for them.

use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Virtual clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    now: Cell<Instant>,
    slept: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Instant::now();
        Self {
            start,
            now: Cell::new(start),
            slept: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.start
    }

    /// Total time spent in `sleep`, excluding manual `advance` calls.
    pub fn slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        self.advance(duration);
    }
}
