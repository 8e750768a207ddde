//! Reducer actions, side-effect intents, and transition logic for the desktop shell.

mod lifecycle;

use std::time::Duration;

use desktop_app_contract::{AppId, OsSettingsPatch, PowerAction};
use platform_host::TimerToken;
use thiserror::Error;

use crate::{
    apps::AppCatalog,
    config::ShellConfig,
    model::{DragSession, InteractionState, PointerPosition, SessionState, ShellState},
    overlay::{self, OverlayRequest},
    window_manager::{self, LaunchOutcome},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_shell`] to mutate [`ShellState`].
pub enum ShellAction {
    /// Arm the boot timer at process start.
    Boot,
    /// Unlock gesture on the lock surface.
    Unlock,
    /// Credential submission on the login surface.
    SubmitLogin,
    /// Power the machine back on from the power-off surface.
    PowerOn,
    /// Lock, restart, or shut down.
    RequestPowerAction(PowerAction),
    /// A session transition timer fired.
    TransitionElapsed {
        /// Token the timer was armed with.
        token: TimerToken,
    },
    /// Launch an app, or restore and raise its existing window.
    LaunchApp {
        /// App to launch.
        app_id: AppId,
        /// Offset added to the configured spawn origin when a new window is created.
        spawn_offset: PointerPosition,
    },
    /// Close a window.
    CloseWindow {
        /// Window to close.
        app_id: AppId,
    },
    /// Raise a window and give it focus.
    FocusWindow {
        /// Window to focus.
        app_id: AppId,
    },
    /// Minimize a window.
    MinimizeWindow {
        /// Window to minimize.
        app_id: AppId,
    },
    /// Flip a window between maximized and floating.
    ToggleMaximizeWindow {
        /// Window to toggle.
        app_id: AppId,
    },
    /// Move a floating window directly, without focusing it.
    DragWindow {
        /// Window to move.
        app_id: AppId,
        /// New top-left position.
        position: PointerPosition,
    },
    /// Pointer-down on a title bar.
    BeginDrag {
        /// Window being dragged.
        app_id: AppId,
        /// Pointer position at gesture start.
        pointer: PointerPosition,
    },
    /// Pointer-move during a drag gesture.
    UpdateDrag {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// Pointer-up ending a drag gesture.
    EndDrag,
    /// Show an overlay, replacing any other.
    OpenOverlay(OverlayRequest),
    /// Taskbar-button toggle for an overlay.
    ToggleOverlay(OverlayRequest),
    /// Hide every overlay.
    CloseOverlays,
    /// Merge a settings patch.
    UpdateSettings(OsSettingsPatch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_shell`] for the host to execute in order.
pub enum RuntimeEffect {
    /// Arm a one-shot session timer.
    ScheduleTimer {
        /// Token returned on expiry.
        token: TimerToken,
        /// Delay before expiry.
        delay: Duration,
    },
    /// Disarm a superseded session timer.
    CancelTimer {
        /// Token to disarm.
        token: TimerToken,
    },
    /// Mount the collaborator app for a newly created window.
    MountApp {
        /// App whose window was created.
        app_id: AppId,
    },
    /// Unmount the collaborator app of a destroyed window.
    UnmountApp {
        /// App whose window was destroyed.
        app_id: AppId,
    },
    /// Shared settings changed; mounted apps should be told.
    SettingsChanged,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Rejected requests. None of these are failures; the runtime turns each into a silent no-op.
pub enum ReducerError {
    /// No window is open for the app.
    #[error("no window open for `{0}`")]
    WindowNotFound(AppId),
    /// The app is not in the catalog.
    #[error("app `{0}` is not in the catalog")]
    UnknownApp(AppId),
    /// Window and overlay operations need the desktop session.
    #[error("window and overlay operations require the desktop session (currently {0})")]
    SessionInactive(SessionState),
    /// The transition table has no entry for this request.
    #[error("`{trigger}` is not a legal transition from {from}")]
    IllegalTransition {
        /// Session state at request time.
        from: SessionState,
        /// Requested trigger token.
        trigger: &'static str,
    },
    /// Another transition is still waiting on its timer.
    #[error("a transition to {0} is still pending")]
    TransitionPending(SessionState),
    /// The fired timer no longer matches the pending transition.
    #[error("{0} is stale")]
    StaleTimer(TimerToken),
    /// Geometry changes are ignored while maximized.
    #[error("window `{0}` is maximized")]
    WindowMaximized(AppId),
    /// Drag update or end without a drag in progress.
    #[error("no drag gesture in progress")]
    NoActiveDrag,
}

/// Read-only inputs the reducer consults.
#[derive(Debug, Clone, Copy)]
pub struct ShellContext<'a> {
    pub catalog: &'a AppCatalog,
    pub config: &'a ShellConfig,
}

/// Applies a [`ShellAction`] to the shell state and collects resulting side effects.
///
/// This is the single transition engine for session, window, and overlay state. Callers that need
/// all-or-nothing semantics should reduce a copy and keep it only on `Ok`, since a rejected action
/// may have touched state before being refused.
///
/// # Errors
///
/// Returns a [`ReducerError`] describing why the request was refused.
pub fn reduce_shell(
    state: &mut ShellState,
    interaction: &mut InteractionState,
    context: &ShellContext<'_>,
    action: ShellAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    if lifecycle::reduce_session_action(state, interaction, context, &action, &mut effects)? {
        return Ok(effects);
    }

    match action {
        ShellAction::CloseOverlays => {
            overlay::close_all(&mut state.overlay);
        }
        ShellAction::UpdateSettings(patch) => {
            if patch.apply(&mut state.settings) {
                effects.push(RuntimeEffect::SettingsChanged);
            }
        }
        ShellAction::OpenOverlay(request) => {
            require_desktop(state)?;
            overlay::open_overlay(&mut state.overlay, request);
        }
        ShellAction::ToggleOverlay(request) => {
            require_desktop(state)?;
            overlay::toggle_overlay(&mut state.overlay, request);
        }
        ShellAction::LaunchApp {
            app_id,
            spawn_offset,
        } => {
            require_desktop(state)?;
            let descriptor = context
                .catalog
                .get(&app_id)
                .ok_or_else(|| ReducerError::UnknownApp(app_id.clone()))?;
            overlay::close_all(&mut state.overlay);
            let outcome = window_manager::launch_window(
                state,
                descriptor,
                &context.config.windows,
                spawn_offset,
            );
            if outcome == LaunchOutcome::Created {
                effects.push(RuntimeEffect::MountApp { app_id });
            }
        }
        ShellAction::CloseWindow { app_id } => {
            require_desktop(state)?;
            overlay::close_all(&mut state.overlay);
            window_manager::close_window(state, &app_id)?;
            abandon_drag_of(interaction, &app_id);
            effects.push(RuntimeEffect::UnmountApp { app_id });
        }
        ShellAction::FocusWindow { app_id } => {
            require_desktop(state)?;
            overlay::close_all(&mut state.overlay);
            // A focus request for a missing window still dismisses overlays.
            if state.window(&app_id).is_some() {
                window_manager::focus_window(state, &app_id)?;
            }
        }
        ShellAction::MinimizeWindow { app_id } => {
            require_desktop(state)?;
            overlay::close_all(&mut state.overlay);
            window_manager::minimize_window(state, &app_id)?;
            abandon_drag_of(interaction, &app_id);
        }
        ShellAction::ToggleMaximizeWindow { app_id } => {
            require_desktop(state)?;
            overlay::close_all(&mut state.overlay);
            window_manager::toggle_maximize_window(state, &app_id)?;
        }
        ShellAction::DragWindow { app_id, position } => {
            require_desktop(state)?;
            window_manager::drag_window(state, &app_id, position)?;
        }
        ShellAction::BeginDrag { app_id, pointer } => {
            require_desktop(state)?;
            let window = state
                .window(&app_id)
                .ok_or_else(|| ReducerError::WindowNotFound(app_id.clone()))?;
            if window.maximized {
                return Err(ReducerError::WindowMaximized(app_id));
            }
            let rect_start = window.rect;
            overlay::close_all(&mut state.overlay);
            window_manager::focus_window(state, &app_id)?;
            interaction.dragging = Some(DragSession {
                app_id,
                pointer_start: pointer,
                rect_start,
            });
        }
        ShellAction::UpdateDrag { pointer } => {
            require_desktop(state)?;
            let session = interaction
                .dragging
                .clone()
                .ok_or(ReducerError::NoActiveDrag)?;
            if state.window(&session.app_id).is_none() {
                interaction.dragging = None;
                return Ok(effects);
            }
            let dx = pointer.x.saturating_sub(session.pointer_start.x);
            let dy = pointer.y.saturating_sub(session.pointer_start.y);
            let position = session.rect_start.offset(dx, dy).position();
            window_manager::drag_window(state, &session.app_id, position)?;
        }
        ShellAction::EndDrag => {
            interaction
                .dragging
                .take()
                .ok_or(ReducerError::NoActiveDrag)?;
        }
        ShellAction::Boot
        | ShellAction::Unlock
        | ShellAction::SubmitLogin
        | ShellAction::PowerOn
        | ShellAction::RequestPowerAction(_)
        | ShellAction::TransitionElapsed { .. } => {}
    }

    Ok(effects)
}

fn require_desktop(state: &ShellState) -> Result<(), ReducerError> {
    if state.session == SessionState::Desktop {
        Ok(())
    } else {
        Err(ReducerError::SessionInactive(state.session))
    }
}

fn abandon_drag_of(interaction: &mut InteractionState, app_id: &AppId) {
    if interaction
        .dragging
        .as_ref()
        .is_some_and(|session| &session.app_id == app_id)
    {
        interaction.dragging = None;
    }
}
