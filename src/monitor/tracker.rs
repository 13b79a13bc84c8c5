//! Text stability state machine.
//!
//! Consumes one text sample per tick and reports whether the text is absent,
//! just changed, unchanged for some duration, or has been unchanged for longer
//! than the timeout. After a timeout the tracker forgets the text, so the same
//! frozen text must change and stabilize again before another timeout fires.

use std::time::{Duration, Instant};

use crate::error::ConfigError;

/// What the tracker remembers between ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StabilityState {
    /// No text is being tracked
    Absent,
    /// `text` has been seen unchanged since `since`
    Tracking { text: String, since: Instant },
}

/// Outcome of observing one sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StabilityEvent {
    /// The sample was empty; any streak is cancelled
    Absent,
    /// The sample differs from the tracked text (or is the first text seen)
    Changed(String),
    /// The sample equals the tracked text and the timeout has not passed
    Unchanged(Duration),
    /// The sample equals the tracked text for longer than the timeout
    TimedOut(Duration),
}

/// Detects text that stops changing.
#[derive(Debug)]
pub struct StabilityTracker {
    timeout: Duration,
    state: StabilityState,
}

impl StabilityTracker {
    /// Creates a tracker in the `Absent` state. The timeout must be positive.
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Self {
            timeout,
            state: StabilityState::Absent,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg(test)]
    pub fn state(&self) -> &StabilityState {
        &self.state
    }

    /// Forgets any tracked text.
    pub fn reset(&mut self) {
        self.state = StabilityState::Absent;
    }

    /// Advances the state machine with the sample taken at `now`.
    pub fn observe(&mut self, sample: &str, now: Instant) -> StabilityEvent {
        if sample.is_empty() {
            self.state = StabilityState::Absent;
            return StabilityEvent::Absent;
        }

        let streak_start = match &self.state {
            StabilityState::Tracking { text, since } if text == sample => Some(*since),
            _ => None,
        };
        let Some(since) = streak_start else {
            self.state = StabilityState::Tracking {
                text: sample.to_string(),
                since: now,
            };
            return StabilityEvent::Changed(sample.to_string());
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed > self.timeout {
            self.state = StabilityState::Absent;
            StabilityEvent::TimedOut(elapsed)
        } else {
            StabilityEvent::Unchanged(elapsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn tracker(timeout: u64) -> StabilityTracker {
        StabilityTracker::new(secs(timeout)).unwrap()
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            StabilityTracker::new(Duration::ZERO),
            Err(ConfigError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_first_text_is_a_change() {
        let t0 = Instant::now();
        let mut tr = tracker(35);
        assert_eq!(tr.observe("A", t0), StabilityEvent::Changed("A".to_string()));
        assert_eq!(
            tr.state(),
            &StabilityState::Tracking {
                text: "A".to_string(),
                since: t0
            }
        );
    }

    #[test]
    fn test_repeated_absence_is_idempotent() {
        let t0 = Instant::now();
        let mut tr = tracker(35);
        for i in 0..5 {
            assert_eq!(tr.observe("", t0 + secs(i)), StabilityEvent::Absent);
            assert_eq!(tr.state(), &StabilityState::Absent);
        }
    }

    #[test]
    fn test_equal_consecutive_samples_never_change() {
        let t0 = Instant::now();
        let mut tr = tracker(35);
        let samples = ["A", "A", "B", "B", "B", "", "B", "B", "C", "C"];
        let mut previous: Option<&str> = None;
        for (i, sample) in samples.iter().enumerate() {
            let event = tr.observe(sample, t0 + secs(i as u64));
            if previous == Some(*sample) && !sample.is_empty() {
                assert!(
                    !matches!(event, StabilityEvent::Changed(_)),
                    "sample {} repeated but reported as a change",
                    i
                );
            }
            previous = Some(*sample);
        }
    }

    #[test]
    fn test_empty_sample_clears_any_streak() {
        let t0 = Instant::now();
        let mut tr = tracker(35);
        tr.observe("A", t0);
        for i in 1..=30 {
            tr.observe("A", t0 + secs(i));
        }
        assert_eq!(tr.observe("", t0 + secs(31)), StabilityEvent::Absent);
        assert_eq!(tr.state(), &StabilityState::Absent);
    }

    #[test]
    fn test_timeout_boundary_is_inclusive() {
        // TIMEOUT=35, period=1
        let t0 = Instant::now();
        let mut tr = tracker(35);

        assert_eq!(tr.observe("A", t0), StabilityEvent::Changed("A".to_string()));
        for i in 1..=35 {
            assert_eq!(
                tr.observe("A", t0 + secs(i)),
                StabilityEvent::Unchanged(secs(i)),
                "tick {}",
                i
            );
        }
        assert_eq!(tr.observe("A", t0 + secs(36)), StabilityEvent::TimedOut(secs(36)));
        assert_eq!(tr.state(), &StabilityState::Absent);
    }

    #[test]
    fn test_absence_restarts_streak_instead_of_resuming() {
        let t0 = Instant::now();
        let mut tr = tracker(35);

        assert_eq!(tr.observe("A", t0), StabilityEvent::Changed("A".to_string()));
        assert_eq!(tr.observe("A", t0 + secs(1)), StabilityEvent::Unchanged(secs(1)));
        assert_eq!(tr.observe("", t0 + secs(2)), StabilityEvent::Absent);
        assert_eq!(
            tr.observe("A", t0 + secs(3)),
            StabilityEvent::Changed("A".to_string())
        );
        assert_eq!(
            tr.state(),
            &StabilityState::Tracking {
                text: "A".to_string(),
                since: t0 + secs(3)
            }
        );
        assert_eq!(tr.observe("A", t0 + secs(4)), StabilityEvent::Unchanged(secs(1)));
    }

    #[test]
    fn test_timed_out_fires_exactly_once_per_episode() {
        let t0 = Instant::now();
        let mut tr = tracker(5);
        tr.observe("stuck", t0);

        let mut fired = Vec::new();
        for i in 1..=20 {
            if let StabilityEvent::TimedOut(_) = tr.observe("stuck", t0 + secs(i)) {
                fired.push(i);
            }
        }
        // Fires at t=6; the repeat at t=7 is treated as a fresh change, so the
        // next firing needs another full timeout: since=7, fires at t=13, then
        // since=14 fires at t=20
        assert_eq!(fired, vec![6, 13, 20]);
    }

    #[test]
    fn test_no_immediate_refire_after_timeout() {
        let t0 = Instant::now();
        let mut tr = tracker(5);
        tr.observe("stuck", t0);
        assert!(matches!(
            tr.observe("stuck", t0 + secs(6)),
            StabilityEvent::TimedOut(_)
        ));
        assert_eq!(
            tr.observe("stuck", t0 + secs(7)),
            StabilityEvent::Changed("stuck".to_string())
        );
        for i in 8..=12 {
            assert!(matches!(
                tr.observe("stuck", t0 + secs(i)),
                StabilityEvent::Unchanged(_)
            ));
        }
    }

    #[test]
    fn test_change_resets_clock() {
        let t0 = Instant::now();
        let mut tr = tracker(10);
        tr.observe("Processing 1/3", t0);
        tr.observe("Processing 1/3", t0 + secs(9));
        assert_eq!(
            tr.observe("Processing 2/3", t0 + secs(10)),
            StabilityEvent::Changed("Processing 2/3".to_string())
        );
        assert_eq!(
            tr.observe("Processing 2/3", t0 + secs(20)),
            StabilityEvent::Unchanged(secs(10))
        );
    }

    #[test]
    fn test_reset_forgets_text() {
        let t0 = Instant::now();
        let mut tr = tracker(10);
        tr.observe("A", t0);
        tr.reset();
        assert_eq!(tr.state(), &StabilityState::Absent);
        assert_eq!(
            tr.observe("A", t0 + secs(1)),
            StabilityEvent::Changed("A".to_string())
        );
    }
}
