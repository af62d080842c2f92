// crates/daemon/src/backoff.rs
use std::time::Duration;

/// First delay applied after a transient fork failure, in microseconds.
pub const INITIAL_DELAY_US: u64 = 100;
/// Amount added to the delay after every transient failure.
pub const DELAY_STEP_US: u64 = 100;
/// Upper bound for the delay.
pub const MAX_DELAY_US: u64 = 10_000;

/// Delay that follows `delay` after one more transient failure.
pub const fn next_delay(delay: u64) -> u64 {
    let next = delay.saturating_add(DELAY_STEP_US);
    if next > MAX_DELAY_US {
        MAX_DELAY_US
    } else {
        next
    }
}

/// Linear backoff used while the system is out of process slots or memory.
///
/// The delay only grows within one pass of the daemonizer loop and is reset
/// whenever a new descendant re-enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    delay_us: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub const fn new() -> Self {
        Self {
            delay_us: INITIAL_DELAY_US,
        }
    }

    pub fn delay_us(&self) -> u64 {
        self.delay_us
    }

    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us)
    }

    pub fn advance(&mut self) {
        self.delay_us = next_delay(self.delay_us);
    }

    pub fn reset(&mut self) {
        self.delay_us = INITIAL_DELAY_US;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_delay() {
        let b = Backoff::new();
        assert_eq!(b.delay_us(), 100);
        assert_eq!(b.delay(), Duration::from_micros(100));
    }

    #[test]
    fn grows_by_fixed_step() {
        let mut b = Backoff::new();
        let mut prev = b.delay_us();
        for _ in 0..50 {
            b.advance();
            assert_eq!(b.delay_us(), prev + DELAY_STEP_US);
            prev = b.delay_us();
        }
        assert_eq!(prev, 5_100);
    }

    #[test]
    fn never_exceeds_cap() {
        let mut b = Backoff::new();
        let mut prev = b.delay_us();
        for _ in 0..500 {
            b.advance();
            assert!(b.delay_us() >= prev);
            assert!(b.delay_us() <= MAX_DELAY_US);
            prev = b.delay_us();
        }
        assert_eq!(b.delay_us(), MAX_DELAY_US);
    }

    #[test]
    fn next_delay_clamps() {
        assert_eq!(next_delay(100), 200);
        assert_eq!(next_delay(9_950), MAX_DELAY_US);
        assert_eq!(next_delay(MAX_DELAY_US), MAX_DELAY_US);
        assert_eq!(next_delay(u64::MAX), MAX_DELAY_US);
    }

    #[test]
    fn reset_restores_initial() {
        let mut b = Backoff::new();
        b.advance();
        b.advance();
        assert_eq!(b.delay_us(), 300);
        b.reset();
        assert_eq!(b, Backoff::new());
    }
}
