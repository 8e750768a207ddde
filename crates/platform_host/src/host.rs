//! Host service bundle injected into the shell runtime.

use std::rc::Rc;

use crate::{OffsetSource, SeededOffsetSource, TimerService};

#[derive(Clone)]
/// Host services the shell runtime is composed with.
pub struct HostServices {
    /// One-shot timer scheduling for delayed session transitions.
    pub timers: Rc<dyn TimerService>,
    /// Spawn-offset source for newly launched windows.
    pub offsets: Rc<dyn OffsetSource>,
}

impl HostServices {
    /// Builds a bundle from explicit services.
    pub fn new(timers: Rc<dyn TimerService>, offsets: Rc<dyn OffsetSource>) -> Self {
        Self { timers, offsets }
    }

    /// Replaces the offset source, keeping the timer service.
    pub fn with_offsets(mut self, offsets: Rc<dyn OffsetSource>) -> Self {
        self.offsets = offsets;
        self
    }
}

/// Browser timeouts on wasm32, the monotonic clock elsewhere, and clock-seeded spawn offsets.
impl Default for HostServices {
    fn default() -> Self {
        #[cfg(target_arch = "wasm32")]
        let timers: Rc<dyn TimerService> = Rc::new(crate::WebTimerService::new());
        #[cfg(not(target_arch = "wasm32"))]
        let timers: Rc<dyn TimerService> = Rc::new(crate::ClockTimerService::new());
        Self {
            timers,
            offsets: Rc::new(SeededOffsetSource::from_clock()),
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
