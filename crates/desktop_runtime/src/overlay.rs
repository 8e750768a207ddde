//! Mutually exclusive flyout coordination.
//!
//! At most one overlay is visible. Every open replaces whatever was showing in a single update,
//! so no intermediate state with two overlays (or a stale one) is observable.

use serde::{Deserialize, Serialize};

use crate::model::{OverlayState, PointerPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OverlayRequest {
    StartMenu,
    WidgetsPanel,
    ControlCenter,
    ContextMenu { at: PointerPosition },
}

impl OverlayRequest {
    fn into_state(self) -> OverlayState {
        match self {
            Self::StartMenu => OverlayState::StartMenu,
            Self::WidgetsPanel => OverlayState::WidgetsPanel,
            Self::ControlCenter => OverlayState::ControlCenter,
            Self::ContextMenu { at } => OverlayState::ContextMenu { at },
        }
    }

    fn matches(self, current: OverlayState) -> bool {
        matches!(
            (self, current),
            (Self::StartMenu, OverlayState::StartMenu)
                | (Self::WidgetsPanel, OverlayState::WidgetsPanel)
                | (Self::ControlCenter, OverlayState::ControlCenter)
                | (Self::ContextMenu { .. }, OverlayState::ContextMenu { .. })
        )
    }
}

/// Commands offered by the desktop context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextMenuCommand {
    Refresh,
    Personalize,
}

/// Shows `request`, replacing any open overlay. A context menu opened over another one moves to
/// the new coordinates.
pub fn open_overlay(overlay: &mut OverlayState, request: OverlayRequest) {
    *overlay = request.into_state();
}

/// Taskbar-button semantics: closes the requested panel when it is the one showing, otherwise
/// opens it in place of whatever else is open. Context menus never toggle; they relocate.
pub fn toggle_overlay(overlay: &mut OverlayState, request: OverlayRequest) {
    let is_context_menu = matches!(request, OverlayRequest::ContextMenu { .. });
    if !is_context_menu && request.matches(*overlay) {
        *overlay = OverlayState::None;
    } else {
        open_overlay(overlay, request);
    }
}

/// Hides any open overlay. Returns whether something was showing.
pub fn close_all(overlay: &mut OverlayState) -> bool {
    let was_open = overlay.is_open();
    *overlay = OverlayState::None;
    was_open
}
