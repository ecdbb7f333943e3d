//! Strictly increasing request timestamps.
//!
//! Two requests signed by the same client must never share a timestamp,
//! otherwise identical operations would produce identical signatures. Clones
//! of a clock share its counter, so cloned clients stay distinct too.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Hands out UTC timestamps with millisecond resolution, each strictly later
/// than the previous one.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock {
    last_millis: Arc<AtomicI64>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return DateTime::<Utc>::from_timestamp_millis(candidate).unwrap_or_else(Utc::now),
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn consecutive_timestamps_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut previous = clock.next();
        for _ in 0..1000 {
            let next = clock.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn concurrent_callers_never_share_a_timestamp() {
        let clock = Arc::new(MonotonicClock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || (0..250).map(|_| clock.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for ts in handle.join().unwrap() {
                assert!(seen.insert(ts), "duplicate timestamp {ts}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn clones_share_one_counter() {
        let clock = MonotonicClock::new();
        let copy = clock.clone();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(clock.next()));
            assert!(seen.insert(copy.next()));
        }
    }

    #[test]
    fn timestamps_track_wall_clock() {
        let before = Utc::now();
        let ts = MonotonicClock::new().next();
        assert!((ts - before).num_seconds().abs() < 5);
    }
}
