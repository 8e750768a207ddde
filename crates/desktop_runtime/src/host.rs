//! Host-side execution of reducer effects.
//!
//! The reducer only describes what should happen outside the state container. This module arms
//! and cancels timers through [`platform_host::TimerService`] and mounts or unmounts collaborator
//! apps through the [`AppBus`].

mod app_bus;
mod effects;

use desktop_app_contract::{AppFactory, AppId, ShellRequestQueue};
use platform_host::HostServices;

use crate::{
    model::{PointerPosition, ShellState},
    reducer::RuntimeEffect,
};

pub use app_bus::AppBus;

/// Host service bundle plus the collaborator app registry.
pub struct ShellHostContext {
    services: HostServices,
    apps: AppBus,
}

impl ShellHostContext {
    pub fn new(services: HostServices) -> Self {
        Self {
            services,
            apps: AppBus::default(),
        }
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    /// Queue collaborator apps push their shell requests into.
    pub fn requests(&self) -> ShellRequestQueue {
        self.apps.requests()
    }

    pub fn register_app(&mut self, app_id: AppId, factory: AppFactory) {
        self.apps.register(app_id, factory);
    }

    pub fn is_mounted(&self, app_id: &AppId) -> bool {
        self.apps.is_mounted(app_id)
    }

    /// Draws a spawn offset in `0..jitter` on each axis.
    pub fn next_spawn_offset(&self, jitter: i32) -> PointerPosition {
        PointerPosition {
            x: self.services.offsets.next_offset(jitter),
            y: self.services.offsets.next_offset(jitter),
        }
    }

    pub(crate) fn run_runtime_effect(&mut self, effect: RuntimeEffect, state: &ShellState) {
        effects::run_runtime_effect(&self.services, &mut self.apps, effect, state);
    }
}

impl std::fmt::Debug for ShellHostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellHostContext")
            .field("services", &self.services)
            .field("mounted", &self.apps.mounted_ids())
            .finish()
    }
}
