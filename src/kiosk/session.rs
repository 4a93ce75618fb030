//! Two-stage session timer: a warning, then a forced reset.
//!
//! Both stages are measured from the same start instant. Restarting moves the
//! start instant, which replaces both pending stages at once.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Stage of the session timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Counting towards the warning
    Active,
    /// Warning shown, counting down to the reset
    Warning,
    /// Reset happened; waiting for the next visitor
    Expired,
}

/// Something the session timer wants the kiosk to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Show the "are you still there?" countdown
    Warning,
    /// Return the kiosk to its home state
    Reset,
}

/// Session timeout with a warning stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    warn_after: Duration,
    reset_after: Duration,
    started: Option<Instant>,
    phase: SessionPhase,
}

impl SessionTimer {
    /// A stopped timer. `warn_after` must be shorter than `reset_after`.
    #[must_use]
    pub fn new(warn_after: Duration, reset_after: Duration) -> Self {
        debug_assert!(warn_after < reset_after);
        Self {
            warn_after,
            reset_after,
            started: None,
            phase: SessionPhase::Expired,
        }
    }

    /// Restarts both stages from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.started = Some(now);
        self.phase = SessionPhase::Active;
    }

    /// The visitor answered the warning. Restarts both stages.
    pub fn continue_session(&mut self, now: Instant) {
        self.restart(now);
    }

    /// Records user activity.
    ///
    /// Activity restarts both stages, except while the warning is shown: only
    /// [`continue_session`](Self::continue_session) dismisses the warning.
    /// Returns true when the timer was restarted.
    pub fn record_activity(&mut self, now: Instant) -> bool {
        if self.phase == SessionPhase::Warning {
            return false;
        }
        self.restart(now);
        true
    }

    /// Ends the session immediately. The timer stays expired until restarted.
    pub fn reset_now(&mut self) {
        self.started = None;
        self.phase = SessionPhase::Expired;
    }

    /// Stops the timer without firing anything.
    pub fn stop(&mut self) {
        self.reset_now();
    }

    /// Advances the timer, returning every stage reached by `now` in order.
    ///
    /// Each stage fires once per start.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut fired = Vec::new();
        let Some(started) = self.started else {
            return fired;
        };

        if self.phase == SessionPhase::Active && now >= started + self.warn_after {
            self.phase = SessionPhase::Warning;
            fired.push(SessionEvent::Warning);
        }

        if self.phase == SessionPhase::Warning && now >= started + self.reset_after {
            self.reset_now();
            fired.push(SessionEvent::Reset);
        }

        fired
    }

    /// When the timer next needs a poll.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let started = self.started?;
        match self.phase {
            SessionPhase::Active => Some(started + self.warn_after),
            SessionPhase::Warning => Some(started + self.reset_after),
            SessionPhase::Expired => None,
        }
    }

    /// Whole seconds left on the warning countdown.
    ///
    /// Starts at `floor((reset - warn) / 1s)` when the warning appears, drops
    /// by one every second and never goes below zero. Zero outside the warning.
    #[must_use]
    pub fn seconds_remaining(&self, now: Instant) -> u64 {
        let Some(started) = self.started else {
            return 0;
        };
        if self.phase != SessionPhase::Warning {
            return 0;
        }

        let countdown = (self.reset_after - self.warn_after).as_secs();
        let since_warning = now.saturating_duration_since(started + self.warn_after);
        countdown.saturating_sub(since_warning.as_secs())
    }

    /// Where the countdown stands.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True between the warning and the reset.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.phase == SessionPhase::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARN: Duration = Duration::from_millis(45_000);
    const RESET: Duration = Duration::from_millis(60_000);

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn started(t0: Instant) -> SessionTimer {
        let mut timer = SessionTimer::new(WARN, RESET);
        timer.restart(t0);
        timer
    }

    #[test]
    fn test_stopped_until_restarted() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(WARN, RESET);
        assert_eq!(timer.phase(), SessionPhase::Expired);
        assert!(timer.poll(t0 + secs(600)).is_empty());
        assert_eq!(timer.next_deadline(), None);
    }

    #[test]
    fn test_warning_then_reset_once_each() {
        let t0 = Instant::now();
        let mut timer = started(t0);

        assert!(timer.poll(t0 + secs(44)).is_empty());
        assert_eq!(timer.poll(t0 + secs(45)), vec![SessionEvent::Warning]);
        assert!(timer.poll(t0 + secs(50)).is_empty());
        assert_eq!(timer.poll(t0 + secs(60)), vec![SessionEvent::Reset]);
        assert!(timer.poll(t0 + secs(61)).is_empty());
        assert!(timer.poll(t0 + secs(600)).is_empty());
        assert_eq!(timer.phase(), SessionPhase::Expired);
    }

    #[test]
    fn test_late_poll_fires_both_in_order() {
        let t0 = Instant::now();
        let mut timer = started(t0);
        assert_eq!(
            timer.poll(t0 + secs(90)),
            vec![SessionEvent::Warning, SessionEvent::Reset]
        );
    }

    #[test]
    fn test_continue_at_50s_restarts_both_stages() {
        let t0 = Instant::now();
        let mut timer = started(t0);
        assert_eq!(timer.poll(t0 + secs(45)), vec![SessionEvent::Warning]);

        let resumed = t0 + secs(50);
        timer.continue_session(resumed);
        assert_eq!(timer.phase(), SessionPhase::Active);

        assert!(timer.poll(t0 + secs(60)).is_empty());
        assert!(timer.poll(resumed + secs(44)).is_empty());
        assert_eq!(timer.poll(resumed + secs(45)), vec![SessionEvent::Warning]);
        assert_eq!(timer.poll(resumed + secs(60)), vec![SessionEvent::Reset]);
    }

    #[test]
    fn test_activity_ignored_during_warning() {
        let t0 = Instant::now();
        let mut timer = started(t0);

        assert!(timer.record_activity(t0 + secs(30)));
        assert_eq!(timer.next_deadline(), Some(t0 + secs(75)));

        assert_eq!(timer.poll(t0 + secs(75)), vec![SessionEvent::Warning]);
        assert!(!timer.record_activity(t0 + secs(80)));
        assert_eq!(timer.poll(t0 + secs(90)), vec![SessionEvent::Reset]);
    }

    #[test]
    fn test_activity_after_expiry_restarts() {
        let t0 = Instant::now();
        let mut timer = started(t0);
        timer.reset_now();
        assert!(timer.record_activity(t0 + secs(5)));
        assert_eq!(timer.phase(), SessionPhase::Active);
        assert_eq!(timer.next_deadline(), Some(t0 + secs(50)));
    }

    #[test]
    fn test_countdown() {
        let t0 = Instant::now();
        let mut timer = started(t0);
        assert_eq!(timer.seconds_remaining(t0 + secs(10)), 0);

        timer.poll(t0 + secs(45));
        assert_eq!(timer.seconds_remaining(t0 + secs(45)), 15);
        assert_eq!(
            timer.seconds_remaining(t0 + secs(45) + Duration::from_millis(999)),
            15
        );
        assert_eq!(timer.seconds_remaining(t0 + secs(46)), 14);
        assert_eq!(timer.seconds_remaining(t0 + secs(59)), 1);
        assert_eq!(timer.seconds_remaining(t0 + secs(75)), 0);
    }

    #[test]
    fn test_countdown_rounds_down() {
        let t0 = Instant::now();
        let mut timer =
            SessionTimer::new(Duration::from_millis(1_000), Duration::from_millis(3_500));
        timer.restart(t0);
        timer.poll(t0 + secs(1));
        assert_eq!(timer.seconds_remaining(t0 + secs(1)), 2);
    }

    #[test]
    fn test_repeated_restarts_never_double_fire() {
        let t0 = Instant::now();
        let mut timer = started(t0);
        for i in 1..=10 {
            timer.restart(t0 + secs(i));
        }

        let mut fired = Vec::new();
        let mut now = t0;
        while now <= t0 + secs(200) {
            fired.extend(timer.poll(now));
            now += Duration::from_millis(500);
        }
        assert_eq!(fired, vec![SessionEvent::Warning, SessionEvent::Reset]);
    }
}
