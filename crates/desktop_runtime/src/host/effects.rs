//! Runtime-effect dispatch for the shell host boundary.

use platform_host::HostServices;

use crate::{host::AppBus, model::ShellState, reducer::RuntimeEffect};

pub(super) fn run_runtime_effect(
    services: &HostServices,
    apps: &mut AppBus,
    effect: RuntimeEffect,
    state: &ShellState,
) {
    match effect {
        RuntimeEffect::ScheduleTimer { token, delay } => services.timers.schedule(token, delay),
        RuntimeEffect::CancelTimer { token } => services.timers.cancel(token),
        RuntimeEffect::MountApp { app_id } => apps.mount(app_id, &state.settings),
        RuntimeEffect::UnmountApp { app_id } => apps.unmount(&app_id),
        RuntimeEffect::SettingsChanged => apps.broadcast_settings(&state.settings),
    }
}
