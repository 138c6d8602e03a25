//! Limit the rate of diagnostics emitted from the transmit path.
//!
//! A failing primitive may fail for every packet of a connection, so its warnings are only emitted
//! up to `burst` times per `interval`. The state is behind a spin lock that is never waited for: a
//! caller that finds it contended simply suppresses its message.
use std::time::{Duration, Instant};

use spin::Mutex;

/// Admits at most `burst` events per `interval`.
#[derive(Debug)]
pub struct RateLimit {
    interval: Duration,
    burst: u32,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    begin: Option<Instant>,
    printed: u32,
    missed: u32,
}

impl RateLimit {
    /// Create a limit admitting `burst` events in each `interval`.
    ///
    /// A zero interval disables the limit.
    pub fn new(interval: Duration, burst: u32) -> Self {
        RateLimit {
            interval,
            burst,
            state: Mutex::new(State::default()),
        }
    }

    /// Check if an event happening now may be reported.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    /// Check if an event happening at `now` may be reported.
    pub fn admit_at(&self, now: Instant) -> bool {
        if self.interval == Duration::from_secs(0) {
            return true;
        }

        let mut state = match self.state.try_lock() {
            Some(state) => state,
            None => return false,
        };

        let begin = *state.begin.get_or_insert(now);
        if now.saturating_duration_since(begin) >= self.interval {
            if state.missed > 0 {
                net_warn!("{} diagnostics suppressed", state.missed);
            }
            state.begin = Some(now);
            state.printed = 0;
            state.missed = 0;
        }

        if state.printed < self.burst {
            state.printed += 1;
            true
        } else {
            state.missed += 1;
            false
        }
    }

    /// The number of events suppressed in the current interval.
    pub fn missed(&self) -> u32 {
        self.state.try_lock().map_or(0, |state| state.missed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_then_suppress() {
        let limit = RateLimit::new(Duration::from_secs(5), 2);
        let start = Instant::now();
        assert!(limit.admit_at(start));
        assert!(limit.admit_at(start + Duration::from_millis(1)));
        assert!(!limit.admit_at(start + Duration::from_millis(2)));
        assert_eq!(limit.missed(), 1);

        // A new interval opens the gate again.
        assert!(limit.admit_at(start + Duration::from_secs(6)));
        assert_eq!(limit.missed(), 0);
    }

    #[test]
    fn zero_interval_unlimited() {
        let limit = RateLimit::new(Duration::from_secs(0), 0);
        assert!((0..100).all(|_| limit.admit()));
    }

    #[test]
    fn contended_suppresses() {
        let limit = RateLimit::new(Duration::from_secs(5), 10);
        let _guard = limit.state.lock();
        assert!(!limit.admit());
    }
}
