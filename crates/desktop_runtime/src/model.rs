use desktop_app_contract::{AppId, OsSettings};
use platform_host::TimerToken;
use serde::{Deserialize, Serialize};

use crate::apps::AppCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    #[default]
    Booting,
    Locked,
    Login,
    Desktop,
    Restarting,
    PowerOff,
}

impl SessionState {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Locked => "locked",
            Self::Login => "login",
            Self::Desktop => "desktop",
            Self::Restarting => "restarting",
            Self::PowerOff => "power-off",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self
        }
    }

    pub fn at(self, position: PointerPosition) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..self
        }
    }

    pub fn position(self) -> PointerPosition {
        PointerPosition {
            x: self.x,
            y: self.y,
        }
    }

    pub fn clamped_min(self, min_w: i32, min_h: i32) -> Self {
        Self {
            w: self.w.max(min_w),
            h: self.h.max(min_h),
            ..self
        }
    }
}

/// Runtime record for one open application surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub app_id: AppId,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub minimized: bool,
    pub maximized: bool,
    /// Higher is more recently focused. Values come from a counter that never goes backwards.
    pub stack_order: u64,
    /// Floating geometry. Left untouched while maximized so un-maximize restores it exactly.
    pub rect: WindowRect,
}

impl WindowEntry {
    /// Rectangle the presentation layer should draw, given the maximized workspace rectangle.
    pub fn layout_rect(&self, workspace: WindowRect) -> WindowRect {
        if self.maximized {
            workspace
        } else {
            self.rect
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OverlayState {
    #[default]
    None,
    StartMenu,
    WidgetsPanel,
    ControlCenter,
    ContextMenu {
        at: PointerPosition,
    },
}

impl OverlayState {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A timed session transition waiting on its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub token: TimerToken,
    pub from: SessionState,
    pub target: SessionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    pub session: SessionState,
    pub pending: Option<PendingTransition>,
    pub windows: Vec<WindowEntry>,
    pub overlay: OverlayState,
    pub next_stack_order: u64,
    pub next_timer_token: u64,
    pub settings: OsSettings,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::with_settings(OsSettings::default())
    }
}

impl ShellState {
    pub fn with_settings(settings: OsSettings) -> Self {
        Self {
            session: SessionState::Booting,
            pending: None,
            windows: Vec::new(),
            overlay: OverlayState::None,
            next_stack_order: 0,
            next_timer_token: 1,
            settings,
        }
    }

    pub fn window(&self, app_id: &AppId) -> Option<&WindowEntry> {
        self.windows.iter().find(|w| &w.app_id == app_id)
    }

    /// The app owning the active window: the non-minimized entry with the greatest stack order.
    pub fn active_focus(&self) -> Option<&AppId> {
        crate::window_manager::active_focus(&self.windows)
    }

    pub fn snapshot(&self, catalog: &AppCatalog, workspace: WindowRect) -> ShellSnapshot {
        let active = self.active_focus().cloned();

        let mut ordered: Vec<&WindowEntry> = self.windows.iter().collect();
        ordered.sort_by_key(|w| w.stack_order);
        let windows = ordered
            .into_iter()
            .map(|w| WindowView {
                app_id: w.app_id.clone(),
                title: w.title.clone(),
                icon: w.icon.clone(),
                color: w.color.clone(),
                minimized: w.minimized,
                maximized: w.maximized,
                stack_order: w.stack_order,
                layout_rect: w.layout_rect(workspace),
                is_active: active.as_ref() == Some(&w.app_id),
            })
            .collect();

        let mut taskbar: Vec<TaskbarItem> = catalog
            .pinned()
            .map(|app| TaskbarItem {
                app_id: app.app_id.clone(),
                name: app.name.clone(),
                icon: app.icon.clone(),
                is_open: self.window(&app.app_id).is_some(),
                is_active: active.as_ref() == Some(&app.app_id),
            })
            .collect();
        for window in &self.windows {
            if taskbar.iter().any(|item| item.app_id == window.app_id) {
                continue;
            }
            taskbar.push(TaskbarItem {
                app_id: window.app_id.clone(),
                name: window.title.clone(),
                icon: window.icon.clone(),
                is_open: true,
                is_active: active.as_ref() == Some(&window.app_id),
            });
        }

        ShellSnapshot {
            session: self.session,
            transition_pending: self.pending.is_some(),
            overlay: self.overlay,
            active_focus: active,
            settings: self.settings.clone(),
            windows,
            taskbar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub app_id: AppId,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub dragging: Option<DragSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowView {
    pub app_id: AppId,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub minimized: bool,
    pub maximized: bool,
    pub stack_order: u64,
    pub layout_rect: WindowRect,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskbarItem {
    pub app_id: AppId,
    pub name: String,
    pub icon: String,
    pub is_open: bool,
    pub is_active: bool,
}

/// Read-only view published to the presentation layer after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSnapshot {
    pub session: SessionState,
    pub transition_pending: bool,
    pub overlay: OverlayState,
    pub active_focus: Option<AppId>,
    pub settings: OsSettings,
    /// Ascending by stack order, so the last entry is topmost.
    pub windows: Vec<WindowView>,
    pub taskbar: Vec<TaskbarItem>,
}
