//! Browser timer service backed by `setTimeout` / `clearTimeout`.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
    time::Duration,
};

use wasm_bindgen::{closure::Closure, JsCast};

use crate::{TimerService, TimerToken};

#[derive(Default)]
struct WebTimers {
    handles: HashMap<TimerToken, i32>,
    fired: VecDeque<TimerToken>,
    wake: Option<Rc<dyn Fn()>>,
}

#[derive(Clone, Default)]
/// Arms one browser timeout per token. Expired tokens are queued for
/// [`TimerService::take_fired`]. The optional wake hook runs after each expiry so the host can
/// pump the runtime right away instead of waiting for the next command.
pub struct WebTimerService {
    inner: Rc<RefCell<WebTimers>>,
}

impl WebTimerService {
    /// Creates a service without a wake hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service that calls `wake` after each timer expires.
    pub fn with_wake(wake: impl Fn() + 'static) -> Self {
        let service = Self::default();
        service.inner.borrow_mut().wake = Some(Rc::new(wake));
        service
    }
}

impl TimerService for WebTimerService {
    fn schedule(&self, token: TimerToken, delay: Duration) {
        self.cancel(token);
        let Some(window) = web_sys::window() else {
            return;
        };
        let inner = Rc::clone(&self.inner);
        let callback = Closure::once_into_js(move || {
            let wake = {
                let mut timers = inner.borrow_mut();
                timers.handles.remove(&token);
                timers.fired.push_back(token);
                timers.wake.clone()
            };
            if let Some(wake) = wake {
                wake();
            }
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Ok(handle) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            self.inner.borrow_mut().handles.insert(token, handle);
        }
    }

    fn cancel(&self, token: TimerToken) {
        let handle = {
            let mut timers = self.inner.borrow_mut();
            timers.fired.retain(|fired| *fired != token);
            timers.handles.remove(&token)
        };
        if let (Some(handle), Some(window)) = (handle, web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }

    fn take_fired(&self) -> Vec<TimerToken> {
        self.inner.borrow_mut().fired.drain(..).collect()
    }
}

impl std::fmt::Debug for WebTimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timers = self.inner.borrow();
        f.debug_struct("WebTimerService")
            .field("armed", &timers.handles.len())
            .field("fired", &timers.fired)
            .finish_non_exhaustive()
    }
}
