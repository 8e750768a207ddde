//! Desktop shell controller: session lifecycle, window registry, and overlay coordination for a
//! simulated desktop rendered in the browser.
//!
//! All state lives in one [`ShellState`] owned by a [`ShellRuntime`]. The presentation layer
//! calls runtime commands and renders the [`ShellSnapshot`]s it publishes; it never mutates state
//! directly.

pub mod apps;
pub mod config;
pub mod host;
pub mod model;
pub mod overlay;
pub mod reducer;
pub mod runtime_context;
pub mod session;
pub mod window_manager;

pub use apps::{AppCatalog, AppDescriptor};
pub use config::{ConfigError, SessionTimings, ShellConfig, WindowDefaults, WorkspaceConfig};
pub use model::*;
pub use overlay::{ContextMenuCommand, OverlayRequest};
pub use reducer::{reduce_shell, ReducerError, RuntimeEffect, ShellAction, ShellContext};
pub use runtime_context::ShellRuntime;
pub use session::SessionTrigger;
