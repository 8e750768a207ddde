//! One-shot timer contracts used to drive delayed session transitions.

use std::{cell::RefCell, rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};

/// Opaque identifier for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

impl std::fmt::Display for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Host service that fires a one-shot callback token after a delay.
///
/// Implementations never call back into the runtime themselves. The embedding host collects fired
/// tokens and hands them to the runtime, which keeps every state mutation on one call stack.
pub trait TimerService {
    /// Arms `token` to fire once after `delay`.
    fn schedule(&self, token: TimerToken, delay: Duration);

    /// Disarms `token`. Cancelling an unknown or already-fired token is a no-op.
    fn cancel(&self, token: TimerToken);

    /// Removes and returns the tokens that fired since the last call, in firing order.
    ///
    /// Services whose host hands fired tokens to the runtime some other way return nothing.
    fn take_fired(&self) -> Vec<TimerToken> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer service that never fires. For hosts that run without session delays.
pub struct NoopTimerService;

impl TimerService for NoopTimerService {
    fn schedule(&self, _token: TimerToken, _delay: Duration) {}

    fn cancel(&self, _token: TimerToken) {}
}

#[derive(Debug, Default)]
struct ManualClock {
    now: Duration,
    armed: Vec<(Duration, TimerToken)>,
}

#[derive(Debug, Clone, Default)]
/// Virtual-clock timer service advanced explicitly by the host or a test.
pub struct ManualTimerService {
    inner: Rc<RefCell<ManualClock>>,
}

impl ManualTimerService {
    /// Creates a timer service at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances virtual time by `elapsed` and returns every token that came due, in due order.
    pub fn advance(&self, elapsed: Duration) -> Vec<TimerToken> {
        let mut clock = self.inner.borrow_mut();
        clock.now += elapsed;
        let now = clock.now;
        let mut due: Vec<(Duration, TimerToken)> = Vec::new();
        clock.armed.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort();
        due.into_iter().map(|(_, token)| token).collect()
    }

    /// Returns the current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Returns the tokens still armed.
    pub fn armed(&self) -> Vec<TimerToken> {
        self.inner
            .borrow()
            .armed
            .iter()
            .map(|(_, token)| *token)
            .collect()
    }
}

impl TimerService for ManualTimerService {
    fn schedule(&self, token: TimerToken, delay: Duration) {
        let mut clock = self.inner.borrow_mut();
        let due = clock.now + delay;
        clock.armed.retain(|(_, armed)| *armed != token);
        clock.armed.push((due, token));
    }

    fn cancel(&self, token: TimerToken) {
        self.inner
            .borrow_mut()
            .armed
            .retain(|(_, armed)| *armed != token);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn advance_fires_only_due_tokens_in_order() {
        let timers = ManualTimerService::new();
        timers.schedule(TimerToken(2), Duration::from_millis(1000));
        timers.schedule(TimerToken(1), Duration::from_millis(500));
        timers.schedule(TimerToken(3), Duration::from_millis(3000));

        assert_eq!(timers.advance(Duration::from_millis(999)), vec![TimerToken(1)]);
        assert_eq!(timers.advance(Duration::from_millis(1)), vec![TimerToken(2)]);
        assert_eq!(timers.armed(), vec![TimerToken(3)]);
        assert_eq!(timers.now(), Duration::from_millis(1000));
    }

    #[test]
    fn cancelled_token_never_fires() {
        let timers = ManualTimerService::new();
        timers.schedule(TimerToken(7), Duration::from_millis(10));
        timers.cancel(TimerToken(7));

        assert!(timers.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn rescheduling_a_token_replaces_its_deadline() {
        let timers = ManualTimerService::new();
        timers.schedule(TimerToken(1), Duration::from_millis(10));
        timers.schedule(TimerToken(1), Duration::from_millis(50));

        assert!(timers.advance(Duration::from_millis(20)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(30)), vec![TimerToken(1)]);
    }
}
