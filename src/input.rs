use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tui_textarea::Input;

use crate::app::{AppState, InputMode};

/// Lines scrolled per mouse wheel notch
const WHEEL_LINES: i64 = 3;

/// Handle a mouse event
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.mode != InputMode::Normal || state.show_help {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => state.scroll_by(-WHEEL_LINES),
        MouseEventKind::ScrollDown => state.scroll_by(WHEEL_LINES),
        MouseEventKind::Down(MouseButton::Left) => state.click(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => state.drag(mouse.column),
        MouseEventKind::Up(MouseButton::Left) => state.end_drag(),
        _ => {}
    }
}

/// Handle a bracketed paste
pub fn handle_paste(state: &mut AppState, text: &str) {
    match state.mode {
        InputMode::FilterEditing => {
            let line = text.lines().next().unwrap_or_default();
            if state.filter_textarea.insert_str(line) {
                state.filter_changed();
            }
        }
        InputMode::Normal | InputMode::Editing => {
            state.open_editor();
            state.paste_text(text);
        }
    }
}

/// Handle a key event and update app state accordingly
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Help overlay takes priority
    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            state.show_help = false;
        }
        return;
    }

    match state.mode {
        InputMode::Normal => handle_normal_mode(state, key),
        InputMode::Editing => handle_editor_mode(state, key),
        InputMode::FilterEditing => handle_filter_mode(state, key),
    }
}

fn handle_normal_mode(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        // Quit
        KeyCode::Char('q') => {
            state.should_quit = true;
        }
        // Ctrl+C also quits
        KeyCode::Char('c') if ctrl => {
            state.should_quit = true;
        }

        // Help
        KeyCode::Char('?') => {
            state.show_help = true;
        }

        // Open the paste overlay
        KeyCode::Char('e') | KeyCode::Char('i') => {
            state.open_editor();
        }
        // Paste straight from the clipboard
        KeyCode::Char('v') if ctrl => {
            state.open_editor();
            state.paste_from_clipboard();
        }

        // Rows
        KeyCode::Char('j') | KeyCode::Down => state.select_next(),
        KeyCode::Char('k') | KeyCode::Up => state.select_prev(),
        KeyCode::PageDown => state.select_page_down(),
        KeyCode::PageUp => state.select_page_up(),
        KeyCode::Char('d') if ctrl => state.select_page_down(),
        KeyCode::Char('u') if ctrl => state.select_page_up(),
        KeyCode::Char('g') | KeyCode::Home => state.select_first(),
        KeyCode::Char('G') | KeyCode::End => state.select_last(),

        // Columns
        KeyCode::Char('l') | KeyCode::Right => state.focus_next_column(),
        KeyCode::Char('h') | KeyCode::Left => state.focus_prev_column(),
        KeyCode::Char('s') | KeyCode::Enter => state.toggle_sort_focused(),
        KeyCode::Char('+') | KeyCode::Char('>') => state.resize_focused(2),
        KeyCode::Char('-') | KeyCode::Char('<') => state.resize_focused(-2),

        // Toggle cell wrap
        KeyCode::Char('w') => {
            state.toggle_wrap();
        }

        // Copy selected row
        KeyCode::Char('y') => {
            state.yank_selected();
        }

        // Enter filter mode
        KeyCode::Char('/') => {
            state.start_filter();
        }

        // Toggle regex mode
        KeyCode::Char('r') => {
            state.toggle_regex_mode();
        }

        // Clear filter
        KeyCode::Esc => {
            state.clear_filter();
        }

        _ => {}
    }
}

fn handle_editor_mode(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            state.close_editor();
        }
        KeyCode::Char('v') if ctrl => {
            state.paste_from_clipboard();
        }
        KeyCode::Char('l') if ctrl => {
            state.clear_editor();
        }
        _ => {
            // Forward all other keys to the editor
            if state.editor.input(Input::from(key)) {
                state.text_changed();
            }
        }
    }
}

fn handle_filter_mode(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            state.apply_filter();
        }
        KeyCode::Esc => {
            state.cancel_filter();
        }
        // Toggle regex mode with Ctrl+R
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.toggle_regex_mode();
        }
        _ => {
            // Forward all other keys to the textarea
            let input = Input::from(key);
            if state.filter_textarea.input(input) {
                // Text changed, mark for debounce
                state.filter_changed();
            }
        }
    }
}
