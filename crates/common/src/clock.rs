//! Session clock for step timestamps.
//!
//! Every step in a session is stamped from one clock anchored at session
//! start: a wall-clock epoch plus monotonic elapsed time. Wall-clock jumps
//! during a session therefore never reorder timestamps.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A clock that yields non-decreasing wall-clock timestamps for one session.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch.
    epoch_wall: DateTime<Utc>,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: Utc::now(),
        }
    }

    /// Create a clock from a known epoch.
    pub fn from_epoch(epoch: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            epoch,
            epoch_wall: wall,
        }
    }

    /// Current timestamp: epoch wall time plus monotonic elapsed time.
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed =
            chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.epoch_wall
            .checked_add_signed(elapsed)
            .unwrap_or(self.epoch_wall)
    }

    /// Time elapsed since session start.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> DateTime<Utc> {
        self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_now_is_non_decreasing() {
        let clock = SessionClock::start();
        let mut previous = clock.now();
        for _ in 0..1000 {
            let current = clock.now();
            assert!(current >= previous);
            previous = current;
        }
        assert!(previous >= clock.epoch_wall());
    }

    #[test]
    fn test_now_ignores_wall_clock_after_epoch() {
        let wall = DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = SessionClock::from_epoch(Instant::now(), wall);
        let now = clock.now();
        assert!(now >= wall);
        assert!(now < wall + chrono::Duration::seconds(5));
    }
}
