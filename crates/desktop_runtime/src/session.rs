//! Coarse session lifecycle transitions.
//!
//! [`plan`] is the whole legal-transition table. Anything it returns `None` for is an illegal
//! request and leaves the session untouched.

use std::time::Duration;

use desktop_app_contract::PowerAction;
use serde::{Deserialize, Serialize};

use crate::{config::SessionTimings, model::SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionTrigger {
    /// Process start; arms the boot timer.
    Boot,
    /// Click or tap on the lock surface.
    Unlock,
    /// Credential submission. Any submission succeeds.
    SubmitLogin,
    /// Lock, restart, or shutdown.
    Power(PowerAction),
    /// Click on the power-off surface.
    PowerOn,
}

impl SessionTrigger {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Unlock => "unlock",
            Self::SubmitLogin => "submit-login",
            Self::Power(action) => action.token(),
            Self::PowerOn => "power-on",
        }
    }

    /// Restart and shutdown are accepted while another transition is pending and cancel it.
    /// Every other trigger waits for the pending transition to resolve.
    pub const fn supersedes_pending(self) -> bool {
        matches!(
            self,
            Self::Power(PowerAction::Shutdown) | Self::Power(PowerAction::Restart)
        )
    }
}

impl std::fmt::Display for SessionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPlan {
    /// State entered immediately, if any.
    pub enter: Option<SessionState>,
    /// State entered once the delay elapses, if the transition is not superseded first.
    pub follow_up: Option<(SessionState, Duration)>,
    /// Whether every open window is force-closed on entry.
    pub clears_windows: bool,
}

impl SessionPlan {
    fn immediate(target: SessionState) -> Self {
        Self {
            enter: Some(target),
            follow_up: None,
            clears_windows: false,
        }
    }

    fn delayed(target: SessionState, delay: Duration) -> Self {
        Self {
            enter: None,
            follow_up: Some((target, delay)),
            clears_windows: false,
        }
    }

    fn then(mut self, target: SessionState, delay: Duration) -> Self {
        self.follow_up = Some((target, delay));
        self
    }

    fn clearing_windows(mut self) -> Self {
        self.clears_windows = true;
        self
    }
}

pub fn plan(
    from: SessionState,
    trigger: SessionTrigger,
    timings: &SessionTimings,
) -> Option<SessionPlan> {
    use SessionState::*;

    let plan = match (from, trigger) {
        (Booting, SessionTrigger::Boot) => SessionPlan::delayed(Locked, timings.boot_delay()),
        (Locked, SessionTrigger::Unlock) => SessionPlan::delayed(Login, timings.unlock_delay()),
        (Login, SessionTrigger::SubmitLogin) => {
            SessionPlan::delayed(Desktop, timings.login_delay())
        }
        (Desktop, SessionTrigger::Power(PowerAction::Lock)) => SessionPlan::immediate(Locked),
        (Desktop | Locked | Login, SessionTrigger::Power(PowerAction::Shutdown)) => {
            SessionPlan::immediate(PowerOff).clearing_windows()
        }
        (Desktop | Locked | Login, SessionTrigger::Power(PowerAction::Restart)) => {
            SessionPlan::immediate(Restarting)
                .then(Locked, timings.restart_delay())
                .clearing_windows()
        }
        (PowerOff, SessionTrigger::PowerOn) => {
            SessionPlan::immediate(Booting).then(Locked, timings.boot_delay())
        }
        _ => return None,
    };
    Some(plan)
}
