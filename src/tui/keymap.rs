//! Static key tables, one per view
//!
//! A key press resolves to a [`KeyAction`] here and one dispatch function
//! in `app.rs` acts on it. Text editing in the settings form bypasses the
//! tables entirely.

use super::state::View;
use crossterm::event::KeyCode;

/// Everything a key press can mean, independent of widget layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    /// Return to the main view
    Back,
    OpenSettings,
    OpenQueue,
    FocusNext,
    FocusPrev,
    CycleLeft,
    CycleRight,
    Activate,
    /// Re-pull video info (main) or re-fetch the queue (queue view)
    Refresh,
}

const MAIN_KEYS: &[(KeyCode, KeyAction)] = &[
    (KeyCode::Char('q'), KeyAction::Quit),
    (KeyCode::Esc, KeyAction::Quit),
    (KeyCode::Char('s'), KeyAction::OpenSettings),
    (KeyCode::Char('l'), KeyAction::OpenQueue),
    (KeyCode::Char('r'), KeyAction::Refresh),
    (KeyCode::Tab, KeyAction::FocusNext),
    (KeyCode::Down, KeyAction::FocusNext),
    (KeyCode::Char('j'), KeyAction::FocusNext),
    (KeyCode::BackTab, KeyAction::FocusPrev),
    (KeyCode::Up, KeyAction::FocusPrev),
    (KeyCode::Char('k'), KeyAction::FocusPrev),
    (KeyCode::Left, KeyAction::CycleLeft),
    (KeyCode::Right, KeyAction::CycleRight),
    (KeyCode::Enter, KeyAction::Activate),
    (KeyCode::Char(' '), KeyAction::Activate),
];

const SETTINGS_KEYS: &[(KeyCode, KeyAction)] = &[
    (KeyCode::Esc, KeyAction::Back),
    (KeyCode::Tab, KeyAction::FocusNext),
    (KeyCode::Down, KeyAction::FocusNext),
    (KeyCode::BackTab, KeyAction::FocusPrev),
    (KeyCode::Up, KeyAction::FocusPrev),
    (KeyCode::Left, KeyAction::CycleLeft),
    (KeyCode::Right, KeyAction::CycleRight),
    (KeyCode::Enter, KeyAction::Activate),
];

const QUEUE_KEYS: &[(KeyCode, KeyAction)] = &[
    (KeyCode::Esc, KeyAction::Back),
    (KeyCode::Char('q'), KeyAction::Quit),
    (KeyCode::Char('r'), KeyAction::Refresh),
];

/// Resolve a key press for the active view
pub fn resolve(view: View, code: KeyCode) -> Option<KeyAction> {
    let table = match view {
        View::Main => MAIN_KEYS,
        View::Settings => SETTINGS_KEYS,
        View::Queue => QUEUE_KEYS,
    };
    table
        .iter()
        .find(|(bound, _)| *bound == code)
        .map(|(_, action)| *action)
}
