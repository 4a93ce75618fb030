//! Idle timer: Active until `timeout` passes without activity, then Idle.
//!
//! The timer holds a single deadline. Every restart replaces it, so there is
//! never more than one pending expiry.

use std::time::Duration;
use tokio::time::Instant;

/// Inactivity timer driving the idle takeover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleTimer {
    timeout: Duration,
    deadline: Option<Instant>,
    is_idle: bool,
}

impl IdleTimer {
    /// A stopped timer.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
            is_idle: false,
        }
    }

    /// Starts (or restarts) the window from `now` and marks the kiosk active.
    pub fn start(&mut self, now: Instant) {
        self.is_idle = false;
        self.deadline = Some(now + self.timeout);
    }

    /// Records user activity.
    ///
    /// Returns true when this activity ended an idle period.
    pub fn record_activity(&mut self, now: Instant) -> bool {
        let was_idle = self.is_idle;
        self.start(now);
        was_idle
    }

    /// Advances the timer. Returns true exactly once per idle period, at the
    /// first poll at or after the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.is_idle = true;
                true
            }
            _ => false,
        }
    }

    /// Cancels the pending expiry.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Changes the window length. A running window restarts from `now`.
    pub fn set_timeout(&mut self, timeout: Duration, now: Instant) {
        self.timeout = timeout;
        if self.deadline.is_some() {
            self.deadline = Some(now + timeout);
        }
    }

    /// Length of the inactivity window.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// When the timer next needs a poll.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True while the idle takeover should show.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.is_idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Duration = Duration::from_secs(60);

    #[test]
    fn test_goes_idle_exactly_once() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(D);
        timer.start(t0);

        assert!(!timer.poll(t0 + D - Duration::from_millis(1)));
        assert!(timer.poll(t0 + D));
        assert!(timer.is_idle());
        assert!(!timer.poll(t0 + D * 2));
        assert!(!timer.poll(t0 + D * 10));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn test_activity_before_deadline_keeps_active() {
        let t0 = Instant::now();
        let step = D - Duration::from_millis(1);
        let mut timer = IdleTimer::new(D);
        timer.start(t0);

        let mut now = t0;
        for _ in 0..100 {
            now += step;
            assert!(!timer.poll(now));
            assert!(!timer.record_activity(now));
        }
        assert!(!timer.is_idle());
    }

    #[test]
    fn test_activity_wakes_and_rearms() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(D);
        timer.start(t0);
        assert!(timer.poll(t0 + D));

        let woke_at = t0 + D * 3;
        assert!(timer.record_activity(woke_at));
        assert!(!timer.is_idle());
        assert_eq!(timer.deadline(), Some(woke_at + D));
        assert!(timer.poll(woke_at + D));
    }

    #[test]
    fn test_restart_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(D);
        timer.start(t0);
        timer.start(t0 + Duration::from_secs(30));
        timer.start(t0 + Duration::from_secs(40));

        assert!(!timer.poll(t0 + D));
        assert!(timer.poll(t0 + Duration::from_secs(100)));
        assert!(!timer.poll(t0 + Duration::from_secs(101)));
    }

    #[test]
    fn test_stop_and_set_timeout() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(D);
        assert!(!timer.poll(t0 + D * 5));

        timer.start(t0);
        timer.stop();
        assert!(!timer.poll(t0 + D * 5));

        timer.start(t0);
        timer.set_timeout(Duration::from_secs(5), t0 + Duration::from_secs(1));
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(6)));
    }
}
