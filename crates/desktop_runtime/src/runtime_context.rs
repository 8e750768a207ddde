//! The shell controller: the single owner of session, window, and overlay state.
//!
//! Every operation here is a command routed through one reducer call. The reducer works on a copy
//! and the copy replaces the live state only when the command is accepted, so observers never see
//! a half-applied update. Rejected commands are logged and otherwise have no effect.
//!
//! Before each command the runtime collects expired session timers from the host's
//! [`platform_host::TimerService`], so a command issued after a delay has elapsed sees the
//! completed transition. Hosts whose timers fire in the background call
//! [`ShellRuntime::pump_timers`] to deliver them between commands.

use desktop_app_contract::{
    AppId, ManagedApp, OsSettingsPatch, PowerAction, ShellRequest, ShellRequestQueue,
};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use platform_host::{HostServices, SeededOffsetSource, TimerToken};
use std::rc::Rc;

use crate::{
    apps::AppCatalog,
    config::{ConfigError, ShellConfig},
    host::ShellHostContext,
    model::{InteractionState, PointerPosition, SessionState, ShellSnapshot, ShellState},
    overlay::{ContextMenuCommand, OverlayRequest},
    reducer::{reduce_shell, ShellAction, ShellContext},
};

const SETTINGS_APP_ID: &str = "settings";

pub struct ShellRuntime {
    state: ShellState,
    interaction: InteractionState,
    config: ShellConfig,
    catalog: AppCatalog,
    host: ShellHostContext,
    subscribers: Vec<UnboundedSender<ShellSnapshot>>,
}

impl ShellRuntime {
    /// Builds a runtime in the `booting` state and arms the boot timer.
    ///
    /// When `config.spawn_seed` is set it replaces the offset source in `services`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `config` fails validation.
    pub fn new(
        config: ShellConfig,
        catalog: AppCatalog,
        services: HostServices,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let services = match config.spawn_seed {
            Some(seed) => services.with_offsets(Rc::new(SeededOffsetSource::new(seed))),
            None => services,
        };
        let mut runtime = Self {
            state: ShellState::with_settings(config.settings.clone()),
            interaction: InteractionState::default(),
            config,
            catalog,
            host: ShellHostContext::new(services),
            subscribers: Vec::new(),
        };
        runtime.apply(ShellAction::Boot);
        Ok(runtime)
    }

    /// Registers the collaborator app mounted into windows of `app_id`.
    pub fn register_app<F, A>(&mut self, app_id: AppId, factory: F)
    where
        F: Fn() -> A + 'static,
        A: ManagedApp + 'static,
    {
        self.host.register_app(
            app_id,
            Box::new(move || -> Box<dyn ManagedApp> { Box::new(factory()) }),
        );
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    pub fn host(&self) -> &ShellHostContext {
        &self.host
    }

    /// Queue collaborator apps use for their limited shell requests.
    pub fn app_requests(&self) -> ShellRequestQueue {
        self.host.requests()
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        self.state
            .snapshot(&self.catalog, self.config.workspace.maximized_rect())
    }

    /// Receives a snapshot after every accepted command that changed state.
    pub fn subscribe(&mut self) -> UnboundedReceiver<ShellSnapshot> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn launch_app(&mut self, app_id: &AppId) -> bool {
        self.pump_timers();
        // Rejected and refocusing launches must not advance a seeded placement sequence.
        let creates_window = self.state.session == SessionState::Desktop
            && self.catalog.get(app_id).is_some()
            && self.state.window(app_id).is_none();
        let spawn_offset = if creates_window {
            self.host.next_spawn_offset(self.config.windows.spawn_jitter)
        } else {
            PointerPosition::default()
        };
        self.apply(ShellAction::LaunchApp {
            app_id: app_id.clone(),
            spawn_offset,
        })
    }

    /// Taskbar icon click. Launches, or restores and raises, the app's window.
    pub fn activate_taskbar_app(&mut self, app_id: &AppId) -> bool {
        self.launch_app(app_id)
    }

    pub fn close_window(&mut self, app_id: &AppId) -> bool {
        self.dispatch(ShellAction::CloseWindow {
            app_id: app_id.clone(),
        })
    }

    pub fn focus_window(&mut self, app_id: &AppId) -> bool {
        self.dispatch(ShellAction::FocusWindow {
            app_id: app_id.clone(),
        })
    }

    pub fn minimize_window(&mut self, app_id: &AppId) -> bool {
        self.dispatch(ShellAction::MinimizeWindow {
            app_id: app_id.clone(),
        })
    }

    pub fn toggle_maximize_window(&mut self, app_id: &AppId) -> bool {
        self.dispatch(ShellAction::ToggleMaximizeWindow {
            app_id: app_id.clone(),
        })
    }

    pub fn drag_window(&mut self, app_id: &AppId, position: PointerPosition) -> bool {
        self.dispatch(ShellAction::DragWindow {
            app_id: app_id.clone(),
            position,
        })
    }

    pub fn begin_drag(&mut self, app_id: &AppId, pointer: PointerPosition) -> bool {
        self.dispatch(ShellAction::BeginDrag {
            app_id: app_id.clone(),
            pointer,
        })
    }

    pub fn update_drag(&mut self, pointer: PointerPosition) -> bool {
        self.dispatch(ShellAction::UpdateDrag { pointer })
    }

    pub fn end_drag(&mut self) -> bool {
        self.dispatch(ShellAction::EndDrag)
    }

    pub fn request_power_action(&mut self, action: PowerAction) -> bool {
        self.dispatch(ShellAction::RequestPowerAction(action))
    }

    pub fn unlock(&mut self) -> bool {
        self.dispatch(ShellAction::Unlock)
    }

    /// Credentials are not checked; any submission signs in after the login delay.
    pub fn submit_login(&mut self, _credential: &str) -> bool {
        self.dispatch(ShellAction::SubmitLogin)
    }

    pub fn power_on(&mut self) -> bool {
        self.dispatch(ShellAction::PowerOn)
    }

    pub fn open_overlay(&mut self, request: OverlayRequest) -> bool {
        self.dispatch(ShellAction::OpenOverlay(request))
    }

    pub fn toggle_overlay(&mut self, request: OverlayRequest) -> bool {
        self.dispatch(ShellAction::ToggleOverlay(request))
    }

    /// Desktop background click.
    pub fn close_overlays(&mut self) -> bool {
        self.dispatch(ShellAction::CloseOverlays)
    }

    pub fn context_menu_command(&mut self, command: ContextMenuCommand) -> bool {
        match command {
            ContextMenuCommand::Refresh => self.close_overlays(),
            // Launching closes the menu in the same update.
            ContextMenuCommand::Personalize => self.launch_app(&AppId::trusted(SETTINGS_APP_ID)),
        }
    }

    pub fn update_settings(&mut self, patch: OsSettingsPatch) -> bool {
        self.dispatch(ShellAction::UpdateSettings(patch))
    }

    /// Delivers a fired session timer.
    pub fn timer_elapsed(&mut self, token: TimerToken) -> bool {
        self.apply(ShellAction::TransitionElapsed { token })
    }

    /// Delivers every timer the host's timer service reports as fired and returns how many were
    /// accepted.
    pub fn pump_timers(&mut self) -> usize {
        let fired = self.host.services().timers.take_fired();
        if fired.is_empty() {
            return 0;
        }
        self.fire_timers(fired)
    }

    /// Delivers several fired timers in order and returns how many were accepted.
    pub fn fire_timers(&mut self, tokens: impl IntoIterator<Item = TimerToken>) -> usize {
        tokens
            .into_iter()
            .filter(|token| self.timer_elapsed(*token))
            .count()
    }

    /// Applies every request collaborator apps queued since the last pump, in submission order.
    /// Returns how many were accepted.
    pub fn pump_app_requests(&mut self) -> usize {
        let mut accepted = 0;
        loop {
            let batch = self.host.requests().drain();
            if batch.is_empty() {
                break;
            }
            for request in batch {
                let ok = match request {
                    ShellRequest::LaunchApp(app_id) => self.launch_app(&app_id),
                    ShellRequest::PowerAction(action) => self.request_power_action(action),
                    ShellRequest::UpdateSettings(patch) => self.update_settings(patch),
                };
                if ok {
                    accepted += 1;
                }
            }
        }
        accepted
    }

    fn dispatch(&mut self, action: ShellAction) -> bool {
        self.pump_timers();
        self.apply(action)
    }

    fn apply(&mut self, action: ShellAction) -> bool {
        let mut next = self.state.clone();
        let mut ui = self.interaction.clone();
        let context = ShellContext {
            catalog: &self.catalog,
            config: &self.config,
        };

        match reduce_shell(&mut next, &mut ui, &context, action) {
            Ok(effects) => {
                let changed = next != self.state;
                self.state = next;
                self.interaction = ui;
                for effect in effects {
                    self.host.run_runtime_effect(effect, &self.state);
                }
                if changed {
                    self.publish();
                }
                true
            }
            Err(err) => {
                log::debug!("shell command ignored: {err}");
                false
            }
        }
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }
}

impl std::fmt::Debug for ShellRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellRuntime")
            .field("state", &self.state)
            .field("interaction", &self.interaction)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use platform_host::ManualTimerService;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::SessionTimings, model::OverlayState};

    fn runtime() -> (ShellRuntime, ManualTimerService) {
        let timers = ManualTimerService::new();
        let services = HostServices::new(
            Rc::new(timers.clone()),
            Rc::new(SeededOffsetSource::new(1)),
        );
        let runtime = ShellRuntime::new(ShellConfig::default(), AppCatalog::builtin(), services)
            .expect("runtime");
        (runtime, timers)
    }

    fn instant_config(seed: u64) -> ShellConfig {
        ShellConfig {
            spawn_seed: Some(seed),
            session: SessionTimings {
                boot_delay_ms: 0,
                restart_delay_ms: 0,
                unlock_delay_ms: 0,
                login_delay_ms: 0,
            },
            ..ShellConfig::default()
        }
    }

    fn seeded_runtime(seed: u64) -> (ShellRuntime, ManualTimerService) {
        let timers = ManualTimerService::new();
        let services = HostServices::new(
            Rc::new(timers.clone()),
            Rc::new(SeededOffsetSource::new(5)),
        );
        let rt = ShellRuntime::new(instant_config(seed), AppCatalog::builtin(), services).unwrap();
        (rt, timers)
    }

    fn sign_in(rt: &mut ShellRuntime, timers: &ManualTimerService) {
        rt.fire_timers(timers.advance(Duration::ZERO));
        rt.unlock();
        rt.fire_timers(timers.advance(Duration::ZERO));
        rt.submit_login("");
        rt.fire_timers(timers.advance(Duration::ZERO));
        assert_eq!(rt.state().session, SessionState::Desktop);
    }

    fn drain(rx: &mut UnboundedReceiver<ShellSnapshot>) -> Vec<ShellSnapshot> {
        std::iter::from_fn(|| rx.try_next().ok().flatten()).collect()
    }

    #[test]
    fn rejected_command_publishes_nothing_and_changes_nothing() {
        let (mut rt, _timers) = runtime();
        let mut rx = rt.subscribe();
        let before = rt.state().clone();

        assert!(!rt.launch_app(&AppId::trusted("notepad")));
        assert_eq!(rt.state(), &before);
        assert!(rx.try_next().is_err());
    }

    #[test]
    fn spawn_seed_makes_window_placement_reproducible() {
        let place = || {
            let (mut rt, timers) = seeded_runtime(99);
            sign_in(&mut rt, &timers);
            rt.launch_app(&AppId::trusted("notepad"));
            rt.state().window(&AppId::trusted("notepad")).unwrap().rect
        };
        assert_eq!(place(), place());
    }

    #[test]
    fn rejected_and_refocusing_launches_do_not_consume_spawn_offsets() {
        let notepad = AppId::trusted("notepad");
        let calculator = AppId::trusted("calculator");

        let (mut busy, timers) = seeded_runtime(42);
        assert!(!busy.launch_app(&notepad));
        sign_in(&mut busy, &timers);
        busy.launch_app(&notepad);
        assert!(!busy.launch_app(&AppId::trusted("paint")));
        assert!(busy.launch_app(&notepad));
        busy.launch_app(&calculator);

        let (mut quiet, timers) = seeded_runtime(42);
        sign_in(&mut quiet, &timers);
        quiet.launch_app(&notepad);
        quiet.launch_app(&calculator);

        assert_eq!(
            busy.state().window(&calculator).unwrap().rect,
            quiet.state().window(&calculator).unwrap().rect
        );
    }

    #[test]
    fn personalize_publishes_a_single_snapshot() {
        let (mut rt, timers) = seeded_runtime(3);
        sign_in(&mut rt, &timers);
        rt.open_overlay(OverlayRequest::ContextMenu {
            at: PointerPosition { x: 40, y: 40 },
        });
        let mut rx = rt.subscribe();

        assert!(rt.context_menu_command(ContextMenuCommand::Personalize));

        let snapshots = drain(&mut rx);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].overlay, OverlayState::None);
        let open: Vec<&str> = snapshots[0]
            .windows
            .iter()
            .map(|w| w.app_id.as_str())
            .collect();
        assert_eq!(open, vec!["settings"]);
    }

    #[test]
    fn dropped_receivers_are_pruned_while_live_ones_keep_receiving() {
        let (mut rt, timers) = seeded_runtime(3);
        sign_in(&mut rt, &timers);
        let mut live = rt.subscribe();
        let gone = rt.subscribe();
        assert_eq!(rt.subscribers.len(), 2);
        drop(gone);

        rt.launch_app(&AppId::trusted("weather"));

        assert_eq!(rt.subscribers.len(), 1);
        let snapshots = drain(&mut live);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].active_focus, Some(AppId::trusted("weather")));
    }

    #[test]
    fn default_host_services_complete_timed_transitions() {
        let config = ShellConfig {
            spawn_seed: None,
            ..instant_config(0)
        };
        let mut rt = ShellRuntime::new(config, AppCatalog::builtin(), HostServices::default())
            .expect("runtime");
        assert_eq!(rt.state().session, SessionState::Booting);

        assert!(rt.unlock());
        assert!(rt.snapshot().transition_pending);
        assert_eq!(rt.pump_timers(), 1);
        assert_eq!(rt.state().session, SessionState::Login);
        assert_eq!(rt.pump_timers(), 0);
    }

    #[test]
    fn invalid_config_is_refused_at_construction() {
        let mut config = ShellConfig::default();
        config.workspace.width = 0;
        let result = ShellRuntime::new(config, AppCatalog::builtin(), HostServices::default());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
