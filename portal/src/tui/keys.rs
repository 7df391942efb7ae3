use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    NextRoute,
    PrevRoute,
    JumpRoute(usize),
    MoveDown,
    MoveUp,
    PageDown,
    PageUp,
    JumpFirst,
    JumpLast,
    Open,
    Back,
    StartQuery,
    Download,
    Reload,
    InputChar(char),
    Backspace,
    CursorLeft,
    CursorRight,
    CursorStart,
    CursorEnd,
    KillToEnd,
    ToggleHelp,
    Dismiss,
    Noop,
}

pub fn map_key_with_input_mode(key: KeyEvent, input_mode_active: bool) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    if input_mode_active {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => KeyAction::CursorStart,
                KeyCode::Char('e') => KeyAction::CursorEnd,
                KeyCode::Char('k') => KeyAction::KillToEnd,
                _ => KeyAction::Noop,
            };
        }
        return match key.code {
            KeyCode::Enter => KeyAction::Open,
            KeyCode::Esc => KeyAction::Dismiss,
            KeyCode::Backspace => KeyAction::Backspace,
            KeyCode::Left => KeyAction::CursorLeft,
            KeyCode::Right => KeyAction::CursorRight,
            KeyCode::Home => KeyAction::CursorStart,
            KeyCode::End => KeyAction::CursorEnd,
            KeyCode::Char(c) if !c.is_control() => KeyAction::InputChar(c),
            _ => KeyAction::Noop,
        };
    }
    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Tab => KeyAction::NextRoute,
        KeyCode::BackTab => KeyAction::PrevRoute,
        KeyCode::Char('1') => KeyAction::JumpRoute(1),
        KeyCode::Char('2') => KeyAction::JumpRoute(2),
        KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
        KeyCode::PageDown => KeyAction::PageDown,
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::Char('g') | KeyCode::Home => KeyAction::JumpFirst,
        KeyCode::Char('G') | KeyCode::End => KeyAction::JumpLast,
        KeyCode::Enter => KeyAction::Open,
        KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Left => KeyAction::Back,
        KeyCode::Char('/') => KeyAction::StartQuery,
        KeyCode::Char('d') => KeyAction::Download,
        KeyCode::Char('r') => KeyAction::Reload,
        KeyCode::Char('?') => KeyAction::ToggleHelp,
        KeyCode::Esc => KeyAction::Dismiss,
        _ => KeyAction::Noop,
    }
}
