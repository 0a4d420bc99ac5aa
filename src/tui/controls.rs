//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Left => app.shift_days(-1),
        KeyCode::Right => app.shift_days(1),
        KeyCode::PageUp => app.shift_days(-7),
        KeyCode::PageDown => app.shift_days(7),
        KeyCode::Up => app.shift_hours(1),
        KeyCode::Down => app.shift_hours(-1),
        KeyCode::Char('p') => app.toggle_plot(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('z') => app.cycle_range(),
        KeyCode::Char('r') => app.reset(),
        _ => {}
    }
}
