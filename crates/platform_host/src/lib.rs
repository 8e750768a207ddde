//! Typed host-domain contracts the desktop shell runtime is driven by.
//!
//! The shell core never reads a clock or arms a timer on its own. Delayed session transitions are
//! requested through [`TimerService`], and window spawn jitter is drawn from an [`OffsetSource`],
//! so a browser host, a native host, or a test can each supply their own implementation.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

#[cfg(not(target_arch = "wasm32"))]
pub mod clock_timer;
pub mod host;
pub mod placement;
pub mod time;
pub mod timer;
#[cfg(target_arch = "wasm32")]
pub mod web_timer;

#[cfg(not(target_arch = "wasm32"))]
pub use clock_timer::ClockTimerService;
pub use host::HostServices;
pub use placement::{OffsetSource, SeededOffsetSource};
pub use time::unix_time_ms_now;
pub use timer::{ManualTimerService, NoopTimerService, TimerService, TimerToken};
#[cfg(target_arch = "wasm32")]
pub use web_timer::WebTimerService;
