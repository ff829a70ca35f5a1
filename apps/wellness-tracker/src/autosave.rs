//! Quiet-period debounce for autosaving the log form.

use std::time::{Duration, Instant};

/// Fires once `delay` has passed since the last change.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    /// Record a change, restarting the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    /// Drop any pending change.
    pub fn cancel(&mut self) {
        self.last_change = None;
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// Whether the quiet period has elapsed. Clears the pending change when
    /// it has, so each burst of edits fires once.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before a pending change fires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_change
            .map(|at| self.delay.saturating_sub(now.saturating_duration_since(at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_secs(2));

        assert!(!debounce.fire(start));
        debounce.touch(start);
        assert!(!debounce.fire(start + Duration::from_millis(1999)));
        assert!(debounce.fire(start + Duration::from_secs(2)));
        assert!(!debounce.fire(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_touch_restarts_period() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_secs(2));

        debounce.touch(start);
        debounce.touch(start + Duration::from_secs(1));
        assert!(!debounce.fire(start + Duration::from_secs(2)));
        assert_eq!(
            debounce.remaining(start + Duration::from_secs(2)),
            Some(Duration::from_secs(1))
        );
        assert!(debounce.fire(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(10));

        debounce.touch(start);
        assert!(debounce.is_pending());
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(start + Duration::from_secs(1)));
        assert_eq!(debounce.remaining(start), None);
    }
}
