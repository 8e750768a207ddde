//! Wall-clock timer service for native hosts.

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use crate::{TimerService, TimerToken};

#[derive(Debug, Clone, Default)]
/// Timer service measured against [`Instant`]. Nothing fires on its own: the host polls
/// [`TimerService::take_fired`], and the shell runtime does so before every command.
pub struct ClockTimerService {
    armed: Rc<RefCell<Vec<(Instant, TimerToken)>>>,
}

impl ClockTimerService {
    /// Creates a service with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tokens still armed.
    pub fn armed(&self) -> Vec<TimerToken> {
        self.armed.borrow().iter().map(|(_, token)| *token).collect()
    }

    fn arm_at(&self, token: TimerToken, due: Instant) {
        let mut armed = self.armed.borrow_mut();
        armed.retain(|(_, armed)| *armed != token);
        armed.push((due, token));
    }

    fn fired_by(&self, now: Instant) -> Vec<TimerToken> {
        let mut due = Vec::new();
        self.armed.borrow_mut().retain(|entry| {
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
}

impl TimerService for ClockTimerService {
    fn schedule(&self, token: TimerToken, delay: Duration) {
        // A delay past the end of `Instant` never fires.
        if let Some(due) = Instant::now().checked_add(delay) {
            self.arm_at(token, due);
        } else {
            self.cancel(token);
        }
    }

    fn cancel(&self, token: TimerToken) {
        self.armed.borrow_mut().retain(|(_, armed)| *armed != token);
    }

    fn take_fired(&self) -> Vec<TimerToken> {
        self.fired_by(Instant::now())
    }
}
