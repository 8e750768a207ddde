//! Shared contract types between the desktop shell runtime and the collaborator apps it mounts.
//!
//! Apps never touch session, window, or overlay state. At mount they receive an
//! [`AppMountContext`]: a read-only [`OsSettings`] snapshot plus a [`ShellRequestQueue`] through
//! which they may ask the shell to launch another app, run a power action, or update settings.
//! The shell drains that queue on its own schedule.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use serde::{Deserialize, Serialize};

/// Stable identifier for a launchable app. At most one window per id is open at a time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Returns an app identifier when `raw` is a lowercase kebab-case token.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_app_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid app id `{raw}`; expected lowercase ascii letters, digits, and inner hyphens"
            ))
        }
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns whether `raw` is usable as an [`AppId`].
pub fn is_valid_app_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 64 {
        return false;
    }
    let bytes = raw.as_bytes();
    if !bytes[0].is_ascii_lowercase() || raw.ends_with('-') {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// User-facing shell settings shared with overlays and collaborator apps.
pub struct OsSettings {
    /// Wallpaper image URL.
    pub wallpaper: String,
    /// Whether translucent "liquid glass" surfaces are enabled.
    pub liquid_glass: bool,
    /// Display name of the connected wireless network.
    pub current_wifi: String,
    /// Signed-in user display name.
    pub user_name: String,
    /// Signed-in user email.
    pub user_email: String,
    /// Whether the dark theme is active.
    pub dark_mode: bool,
}

impl Default for OsSettings {
    fn default() -> Self {
        Self {
            wallpaper: "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?auto=format&fit=crop&q=80&w=2564".to_string(),
            liquid_glass: true,
            current_wifi: "LTT_Dev_Network".to_string(),
            user_name: "LTT Developer".to_string(),
            user_email: "admin@evolution.sys".to_string(),
            dark_mode: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Partial settings update; `None` fields are left untouched.
pub struct OsSettingsPatch {
    /// New wallpaper URL.
    pub wallpaper: Option<String>,
    /// New liquid-glass flag.
    pub liquid_glass: Option<bool>,
    /// New wireless network name.
    pub current_wifi: Option<String>,
    /// New user display name.
    pub user_name: Option<String>,
    /// New user email.
    pub user_email: Option<String>,
    /// New dark-mode flag.
    pub dark_mode: Option<bool>,
}

impl OsSettingsPatch {
    /// Merges the patch into `settings` and returns whether any field changed.
    pub fn apply(&self, settings: &mut OsSettings) -> bool {
        let before = settings.clone();
        if let Some(wallpaper) = &self.wallpaper {
            settings.wallpaper = wallpaper.clone();
        }
        if let Some(enabled) = self.liquid_glass {
            settings.liquid_glass = enabled;
        }
        if let Some(wifi) = &self.current_wifi {
            settings.current_wifi = wifi.clone();
        }
        if let Some(name) = &self.user_name {
            settings.user_name = name.clone();
        }
        if let Some(email) = &self.user_email {
            settings.user_email = email.clone();
        }
        if let Some(enabled) = self.dark_mode {
            settings.dark_mode = enabled;
        }
        *settings != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Power actions exposed by the start menu and control center.
pub enum PowerAction {
    /// Return to the lock screen, keeping open windows.
    Lock,
    /// Close every window and cycle back to the lock screen.
    Restart,
    /// Close every window and power off.
    Shutdown,
}

impl PowerAction {
    /// Returns a stable string token for diagnostics.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Restart => "restart",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Request an app may enqueue for the shell.
pub enum ShellRequest {
    /// Launch (or refocus) another app.
    LaunchApp(AppId),
    /// Run a power action.
    PowerAction(PowerAction),
    /// Merge a settings patch.
    UpdateSettings(OsSettingsPatch),
}

#[derive(Debug, Clone, Default)]
/// Shared single-threaded queue of app-originated shell requests.
pub struct ShellRequestQueue {
    inner: Rc<RefCell<VecDeque<ShellRequest>>>,
}

impl ShellRequestQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a raw request.
    pub fn push(&self, request: ShellRequest) {
        self.inner.borrow_mut().push_back(request);
    }

    /// Removes and returns every queued request in submission order.
    pub fn drain(&self) -> Vec<ShellRequest> {
        self.inner.borrow_mut().drain(..).collect()
    }

    /// Returns the number of queued requests.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns whether no requests are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

#[derive(Debug, Clone)]
/// Context handed to an app when the shell mounts it into a window.
pub struct AppMountContext {
    app_id: AppId,
    settings: OsSettings,
    requests: ShellRequestQueue,
}

impl AppMountContext {
    /// Creates a mount context.
    pub fn new(app_id: AppId, settings: OsSettings, requests: ShellRequestQueue) -> Self {
        Self {
            app_id,
            settings,
            requests,
        }
    }

    /// Returns the id of the window the app is mounted into.
    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Returns the settings snapshot taken at mount time.
    pub fn settings(&self) -> &OsSettings {
        &self.settings
    }

    /// Asks the shell to launch or refocus `app_id`.
    pub fn launch_app(&self, app_id: AppId) {
        self.requests.push(ShellRequest::LaunchApp(app_id));
    }

    /// Asks the shell to run `action`.
    pub fn request_power_action(&self, action: PowerAction) {
        self.requests.push(ShellRequest::PowerAction(action));
    }

    /// Asks the shell to merge `patch` into the shared settings.
    pub fn update_settings(&self, patch: OsSettingsPatch) {
        self.requests.push(ShellRequest::UpdateSettings(patch));
    }
}

/// Collaborator app mounted by the shell into a window frame.
pub trait ManagedApp {
    /// Called once when the app's window is created.
    fn mount(&mut self, context: AppMountContext);

    /// Called after the shared settings change while the app is mounted.
    fn settings_changed(&mut self, _settings: &OsSettings) {}

    /// Called once before the app's window is destroyed.
    fn unmount(&mut self) {}
}

/// Factory producing a fresh app instance for each mount.
pub type AppFactory = Box<dyn Fn() -> Box<dyn ManagedApp>>;
