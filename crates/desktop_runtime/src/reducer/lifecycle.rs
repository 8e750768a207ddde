//! Reducer helpers for session lifecycle transitions.

use platform_host::TimerToken;

use crate::{
    model::{InteractionState, PendingTransition, SessionState, ShellState},
    overlay,
    reducer::{ReducerError, RuntimeEffect, ShellAction, ShellContext},
    session::{self, SessionPlan, SessionTrigger},
};

/// Handles session actions. Returns `Ok(false)` for actions that belong to another reducer.
pub(super) fn reduce_session_action(
    state: &mut ShellState,
    interaction: &mut InteractionState,
    context: &ShellContext<'_>,
    action: &ShellAction,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<bool, ReducerError> {
    let trigger = match action {
        ShellAction::Boot => SessionTrigger::Boot,
        ShellAction::Unlock => SessionTrigger::Unlock,
        ShellAction::SubmitLogin => SessionTrigger::SubmitLogin,
        ShellAction::PowerOn => SessionTrigger::PowerOn,
        ShellAction::RequestPowerAction(power) => SessionTrigger::Power(*power),
        ShellAction::TransitionElapsed { token } => {
            complete_transition(state, *token)?;
            return Ok(true);
        }
        _ => return Ok(false),
    };

    let plan = session::plan(state.session, trigger, &context.config.session).ok_or(
        ReducerError::IllegalTransition {
            from: state.session,
            trigger: trigger.token(),
        },
    )?;

    if let Some(pending) = state.pending {
        if !trigger.supersedes_pending() {
            return Err(ReducerError::TransitionPending(pending.target));
        }
        state.pending = None;
        effects.push(RuntimeEffect::CancelTimer {
            token: pending.token,
        });
    }

    apply_plan(state, interaction, trigger, plan, effects);
    Ok(true)
}

fn apply_plan(
    state: &mut ShellState,
    interaction: &mut InteractionState,
    trigger: SessionTrigger,
    plan: SessionPlan,
    effects: &mut Vec<RuntimeEffect>,
) {
    let previous = state.session;

    if plan.clears_windows {
        effects.extend(
            state
                .windows
                .drain(..)
                .map(|window| RuntimeEffect::UnmountApp {
                    app_id: window.app_id,
                }),
        );
    }

    if let Some(target) = plan.enter {
        state.session = target;
    }
    if state.session != SessionState::Desktop {
        overlay::close_all(&mut state.overlay);
        interaction.dragging = None;
    }

    if let Some((target, delay)) = plan.follow_up {
        let token = TimerToken(state.next_timer_token);
        state.next_timer_token = state.next_timer_token.saturating_add(1);
        state.pending = Some(PendingTransition {
            token,
            from: state.session,
            target,
        });
        effects.push(RuntimeEffect::ScheduleTimer { token, delay });
    }

    match plan.follow_up {
        Some((target, delay)) => log::info!(
            "session {previous} -> {} via {trigger}; {target} in {}ms",
            state.session,
            delay.as_millis()
        ),
        None => log::info!("session {previous} -> {} via {trigger}", state.session),
    }
}

fn complete_transition(state: &mut ShellState, token: TimerToken) -> Result<(), ReducerError> {
    match state.pending {
        Some(pending) if pending.token == token && pending.from == state.session => {
            state.pending = None;
            state.session = pending.target;
            log::info!("session {} -> {} after {token}", pending.from, pending.target);
            Ok(())
        }
        _ => Err(ReducerError::StaleTimer(token)),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use desktop_app_contract::{AppId, PowerAction};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        apps::AppCatalog,
        config::ShellConfig,
        model::{OverlayState, PointerPosition},
        overlay::OverlayRequest,
        reducer::reduce_shell,
    };

    struct Fixture {
        state: ShellState,
        interaction: InteractionState,
        catalog: AppCatalog,
        config: ShellConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: ShellState::default(),
                interaction: InteractionState::default(),
                catalog: AppCatalog::builtin(),
                config: ShellConfig::default(),
            }
        }

        fn reduce(&mut self, action: ShellAction) -> Result<Vec<RuntimeEffect>, ReducerError> {
            let context = ShellContext {
                catalog: &self.catalog,
                config: &self.config,
            };
            reduce_shell(&mut self.state, &mut self.interaction, &context, action)
        }

        fn scheduled_token(effects: &[RuntimeEffect]) -> TimerToken {
            effects
                .iter()
                .find_map(|effect| match effect {
                    RuntimeEffect::ScheduleTimer { token, .. } => Some(*token),
                    _ => None,
                })
                .expect("timer scheduled")
        }

        fn elapse(&mut self, effects: &[RuntimeEffect]) {
            let token = Self::scheduled_token(effects);
            self.reduce(ShellAction::TransitionElapsed { token })
                .expect("timer accepted");
        }

        fn to_desktop(&mut self) {
            let boot = self.reduce(ShellAction::Boot).unwrap();
            self.elapse(&boot);
            let unlock = self.reduce(ShellAction::Unlock).unwrap();
            self.elapse(&unlock);
            let login = self.reduce(ShellAction::SubmitLogin).unwrap();
            self.elapse(&login);
            assert_eq!(self.state.session, SessionState::Desktop);
        }
    }

    #[test]
    fn boot_waits_for_timer_then_locks() {
        let mut fx = Fixture::new();
        let effects = fx.reduce(ShellAction::Boot).unwrap();
        assert_eq!(
            effects,
            vec![RuntimeEffect::ScheduleTimer {
                token: TimerToken(1),
                delay: Duration::from_millis(3000),
            }]
        );
        assert_eq!(fx.state.session, SessionState::Booting);

        fx.elapse(&effects);
        assert_eq!(fx.state.session, SessionState::Locked);
        assert_eq!(fx.state.pending, None);
    }

    #[test]
    fn repeated_unlock_during_delay_is_ignored() {
        let mut fx = Fixture::new();
        let boot = fx.reduce(ShellAction::Boot).unwrap();
        fx.elapse(&boot);

        let unlock = fx.reduce(ShellAction::Unlock).unwrap();
        assert_eq!(
            fx.reduce(ShellAction::Unlock),
            Err(ReducerError::TransitionPending(SessionState::Login))
        );
        fx.elapse(&unlock);
        assert_eq!(fx.state.session, SessionState::Login);
    }

    #[test]
    fn shutdown_supersedes_pending_login_and_invalidates_its_timer() {
        let mut fx = Fixture::new();
        let boot = fx.reduce(ShellAction::Boot).unwrap();
        fx.elapse(&boot);
        let unlock = fx.reduce(ShellAction::Unlock).unwrap();
        fx.elapse(&unlock);
        let login = fx.reduce(ShellAction::SubmitLogin).unwrap();
        let login_token = Fixture::scheduled_token(&login);

        let effects = fx
            .reduce(ShellAction::RequestPowerAction(PowerAction::Shutdown))
            .unwrap();
        assert_eq!(effects, vec![RuntimeEffect::CancelTimer { token: login_token }]);
        assert_eq!(fx.state.session, SessionState::PowerOff);

        assert_eq!(
            fx.reduce(ShellAction::TransitionElapsed { token: login_token }),
            Err(ReducerError::StaleTimer(login_token))
        );
        assert_eq!(fx.state.session, SessionState::PowerOff);
    }

    #[test]
    fn restart_clears_windows_and_returns_to_lock_screen() {
        let mut fx = Fixture::new();
        fx.to_desktop();
        fx.reduce(ShellAction::LaunchApp {
            app_id: AppId::trusted("notepad"),
            spawn_offset: PointerPosition::default(),
        })
        .unwrap();
        fx.reduce(ShellAction::OpenOverlay(OverlayRequest::StartMenu))
            .unwrap();

        let effects = fx
            .reduce(ShellAction::RequestPowerAction(PowerAction::Restart))
            .unwrap();
        assert_eq!(
            effects[0],
            RuntimeEffect::UnmountApp {
                app_id: AppId::trusted("notepad")
            }
        );
        assert!(fx.state.windows.is_empty());
        assert_eq!(fx.state.overlay, OverlayState::None);
        assert_eq!(fx.state.session, SessionState::Restarting);

        fx.elapse(&effects);
        assert_eq!(fx.state.session, SessionState::Locked);
    }

    #[test]
    fn lock_keeps_windows_for_the_next_login() {
        let mut fx = Fixture::new();
        fx.to_desktop();
        fx.reduce(ShellAction::LaunchApp {
            app_id: AppId::trusted("calculator"),
            spawn_offset: PointerPosition::default(),
        })
        .unwrap();

        let effects = fx
            .reduce(ShellAction::RequestPowerAction(PowerAction::Lock))
            .unwrap();
        assert!(effects.is_empty());
        assert_eq!(fx.state.session, SessionState::Locked);
        assert_eq!(fx.state.windows.len(), 1);
    }

    #[test]
    fn illegal_transitions_leave_session_untouched() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.reduce(ShellAction::Unlock),
            Err(ReducerError::IllegalTransition {
                from: SessionState::Booting,
                trigger: "unlock",
            })
        );
        assert_eq!(
            fx.reduce(ShellAction::RequestPowerAction(PowerAction::Shutdown)),
            Err(ReducerError::IllegalTransition {
                from: SessionState::Booting,
                trigger: "shutdown",
            })
        );
        assert_eq!(fx.state.session, SessionState::Booting);
    }

    #[test]
    fn power_on_reboots_through_booting() {
        let mut fx = Fixture::new();
        fx.to_desktop();
        fx.reduce(ShellAction::RequestPowerAction(PowerAction::Shutdown))
            .unwrap();

        let effects = fx.reduce(ShellAction::PowerOn).unwrap();
        assert_eq!(fx.state.session, SessionState::Booting);
        fx.elapse(&effects);
        assert_eq!(fx.state.session, SessionState::Locked);
    }
}
