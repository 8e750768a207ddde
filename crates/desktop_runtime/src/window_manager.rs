//! Window registry transitions used by the shell reducer.
//!
//! Stacking uses a counter on [`ShellState`] that only ever increases: raising a window assigns it
//! the next value, so the topmost window is always the unique maximum and no reshuffle of other
//! entries is needed. Active focus is derived from those values rather than stored.

use desktop_app_contract::AppId;

use crate::{
    apps::AppDescriptor,
    config::WindowDefaults,
    model::{PointerPosition, ShellState, WindowEntry},
    reducer::ReducerError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A new entry was created.
    Created,
    /// An existing entry was restored and raised.
    Refocused,
}

/// Non-minimized entry with the greatest stack order.
pub fn active_focus(windows: &[WindowEntry]) -> Option<&AppId> {
    windows
        .iter()
        .filter(|w| !w.minimized)
        .max_by_key(|w| w.stack_order)
        .map(|w| &w.app_id)
}

fn next_stack_order(state: &mut ShellState) -> u64 {
    state.next_stack_order = state.next_stack_order.saturating_add(1);
    state.next_stack_order
}

fn find_window_mut<'a>(
    state: &'a mut ShellState,
    app_id: &AppId,
) -> Result<&'a mut WindowEntry, ReducerError> {
    state
        .windows
        .iter_mut()
        .find(|w| &w.app_id == app_id)
        .ok_or_else(|| ReducerError::WindowNotFound(app_id.clone()))
}

/// Opens `descriptor`, or restores and raises it when it already has a window.
pub fn launch_window(
    state: &mut ShellState,
    descriptor: &AppDescriptor,
    defaults: &WindowDefaults,
    spawn_offset: PointerPosition,
) -> LaunchOutcome {
    if state.window(&descriptor.app_id).is_some() {
        let order = next_stack_order(state);
        if let Ok(window) = find_window_mut(state, &descriptor.app_id) {
            window.minimized = false;
            window.stack_order = order;
        }
        return LaunchOutcome::Refocused;
    }

    let stack_order = next_stack_order(state);
    state.windows.push(WindowEntry {
        app_id: descriptor.app_id.clone(),
        title: descriptor.name.clone(),
        icon: descriptor.icon.clone(),
        color: descriptor.color.clone(),
        minimized: false,
        maximized: false,
        stack_order,
        rect: defaults.spawn_rect(spawn_offset),
    });
    LaunchOutcome::Created
}

/// Removes the entry and returns it.
pub fn close_window(state: &mut ShellState, app_id: &AppId) -> Result<WindowEntry, ReducerError> {
    let index = state
        .windows
        .iter()
        .position(|w| &w.app_id == app_id)
        .ok_or_else(|| ReducerError::WindowNotFound(app_id.clone()))?;
    Ok(state.windows.remove(index))
}

/// Raises the entry to the top of the stack. A minimized entry is restored so it can own focus.
///
/// The entry that already owns focus holds the maximum stack order and is left untouched.
pub fn focus_window(state: &mut ShellState, app_id: &AppId) -> Result<(), ReducerError> {
    if active_focus(&state.windows) == Some(app_id) {
        return Ok(());
    }
    find_window_mut(state, app_id)?;
    let order = next_stack_order(state);
    let window = find_window_mut(state, app_id)?;
    window.minimized = false;
    window.stack_order = order;
    Ok(())
}

/// Hides the entry without touching its stack order.
pub fn minimize_window(state: &mut ShellState, app_id: &AppId) -> Result<(), ReducerError> {
    find_window_mut(state, app_id)?.minimized = true;
    Ok(())
}

/// Flips the maximized flag and returns the new value. Stack order is untouched.
pub fn toggle_maximize_window(state: &mut ShellState, app_id: &AppId) -> Result<bool, ReducerError> {
    let window = find_window_mut(state, app_id)?;
    window.maximized = !window.maximized;
    Ok(window.maximized)
}

/// Moves a floating window. Refused while maximized.
pub fn drag_window(
    state: &mut ShellState,
    app_id: &AppId,
    position: PointerPosition,
) -> Result<(), ReducerError> {
    let window = find_window_mut(state, app_id)?;
    if window.maximized {
        return Err(ReducerError::WindowMaximized(app_id.clone()));
    }
    window.rect = window.rect.at(position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn descriptor(id: &str) -> AppDescriptor {
        AppDescriptor::new(AppId::trusted(id), id.to_uppercase(), "icon", "color")
    }

    fn launch(state: &mut ShellState, id: &str) -> LaunchOutcome {
        launch_window(
            state,
            &descriptor(id),
            &WindowDefaults::default(),
            PointerPosition { x: 5, y: 7 },
        )
    }

    fn order(state: &ShellState, id: &str) -> u64 {
        state.window(&AppId::trusted(id)).unwrap().stack_order
    }

    #[test]
    fn launch_creates_offset_entry_with_catalog_title() {
        let mut state = ShellState::default();
        assert_eq!(launch(&mut state, "notepad"), LaunchOutcome::Created);

        let window = state.window(&AppId::trusted("notepad")).unwrap();
        assert_eq!(window.title, "NOTEPAD");
        assert_eq!((window.rect.x, window.rect.y), (125, 127));
        assert_eq!((window.rect.w, window.rect.h), (960, 680));
        assert_eq!(window.stack_order, 1);
    }

    #[test]
    fn relaunch_restores_and_raises_without_duplicating() {
        let mut state = ShellState::default();
        launch(&mut state, "notepad");
        launch(&mut state, "calculator");
        minimize_window(&mut state, &AppId::trusted("notepad")).unwrap();

        assert_eq!(launch(&mut state, "notepad"), LaunchOutcome::Refocused);
        assert_eq!(state.windows.len(), 2);
        assert!(!state.window(&AppId::trusted("notepad")).unwrap().minimized);
        assert!(order(&state, "notepad") > order(&state, "calculator"));
        assert_eq!(active_focus(&state.windows), Some(&AppId::trusted("notepad")));
    }

    #[test]
    fn focus_fallback_skips_minimized_entries() {
        let mut state = ShellState::default();
        launch(&mut state, "a");
        launch(&mut state, "b");
        launch(&mut state, "c");

        minimize_window(&mut state, &AppId::trusted("c")).unwrap();
        assert_eq!(active_focus(&state.windows), Some(&AppId::trusted("b")));
        assert_eq!(order(&state, "c"), 3);

        close_window(&mut state, &AppId::trusted("b")).unwrap();
        assert_eq!(active_focus(&state.windows), Some(&AppId::trusted("a")));

        minimize_window(&mut state, &AppId::trusted("a")).unwrap();
        assert_eq!(active_focus(&state.windows), None);
    }

    #[test]
    fn stack_orders_are_never_reused_after_close() {
        let mut state = ShellState::default();
        launch(&mut state, "a");
        launch(&mut state, "b");
        close_window(&mut state, &AppId::trusted("b")).unwrap();
        launch(&mut state, "c");

        assert_eq!(order(&state, "c"), 3);
    }

    #[test]
    fn focusing_the_active_window_keeps_its_order() {
        let mut state = ShellState::default();
        launch(&mut state, "a");
        focus_window(&mut state, &AppId::trusted("a")).unwrap();
        assert_eq!(order(&state, "a"), 1);
    }

    #[test]
    fn drag_is_refused_while_maximized_and_geometry_survives_toggle() {
        let mut state = ShellState::default();
        launch(&mut state, "a");
        let id = AppId::trusted("a");
        let before = state.window(&id).unwrap().rect;

        assert_eq!(toggle_maximize_window(&mut state, &id), Ok(true));
        assert_eq!(
            drag_window(&mut state, &id, PointerPosition { x: 0, y: 0 }),
            Err(ReducerError::WindowMaximized(id.clone()))
        );
        assert_eq!(toggle_maximize_window(&mut state, &id), Ok(false));
        assert_eq!(state.window(&id).unwrap().rect, before);

        drag_window(&mut state, &id, PointerPosition { x: 40, y: 50 }).unwrap();
        let moved = state.window(&id).unwrap().rect;
        assert_eq!((moved.x, moved.y, moved.w), (40, 50, before.w));
    }

    #[test]
    fn operations_on_missing_windows_report_not_found() {
        let mut state = ShellState::default();
        let ghost = AppId::trusted("ghost");
        assert_eq!(
            focus_window(&mut state, &ghost),
            Err(ReducerError::WindowNotFound(ghost.clone()))
        );
        assert!(close_window(&mut state, &ghost).is_err());
        assert!(minimize_window(&mut state, &ghost).is_err());
        assert!(toggle_maximize_window(&mut state, &ghost).is_err());
    }
}
