use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions from keyboard events.
///
/// Mapping is stateless; what an action means while a confirmation or key
/// entry is open is decided by the app.
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    Escape,
    Submit,
    NextPane,
    ClearMemory,
    ClearHistory,
    HistoryUp,
    HistoryDown,
    ShowLive,
    EnterKey,
    CopyToClipboard,
    Input(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Escape,
        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Tab, _) => Action::NextPane,

        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ClearMemory,
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => Action::ClearHistory,
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Action::ShowLive,
        (KeyCode::Char('k'), KeyModifiers::CONTROL) => Action::EnterKey,
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Action::CopyToClipboard,

        (KeyCode::Up, _) => Action::HistoryUp,
        (KeyCode::Down, _) => Action::HistoryDown,

        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::Input(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}
