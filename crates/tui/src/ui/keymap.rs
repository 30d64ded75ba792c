use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    NextField,
    Submit,
    Backspace,
    Up,
    Down,
    Input(char),
    None,
}

/// Maps a key press. While `typing` into a form, letters are input and only
/// Ctrl+C quits.
pub fn map_key(key: KeyEvent, typing: bool) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::Char('q') if !typing => AppAction::Quit,
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Char('k') if !typing => AppAction::Up,
        KeyCode::Char('j') if !typing => AppAction::Down,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_is_text_while_typing() {
        assert_eq!(map_key(press(KeyCode::Char('q')), true), AppAction::Input('q'));
        assert_eq!(map_key(press(KeyCode::Char('q')), false), AppAction::Quit);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, true), AppAction::Quit);
        assert_eq!(map_key(key, false), AppAction::Quit);
    }

    #[test]
    fn vim_keys_navigate_outside_forms() {
        assert_eq!(map_key(press(KeyCode::Char('j')), false), AppAction::Down);
        assert_eq!(map_key(press(KeyCode::Char('j')), true), AppAction::Input('j'));
    }
}
