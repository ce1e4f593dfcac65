//! Key mapping for window manager commands
//!
//! Converts key events to `Command`s. Commands live on Alt chords; while the
//! rename field has focus, plain keys edit it instead. Nothing is ever
//! forwarded to a session.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::wm::Direction;

use super::text_field::FieldEdit;

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Everything a key can ask the window manager to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    CycleBackground,
    Spawn,
    Raise,
    Close,
    Step(Direction),
    ToggleMove,
    ToggleResize,
    RenameStart,
    RenameCommit,
    RenameCancel,
    /// Zero-based workspace index
    ToggleWorkspace(usize),
    Edit(FieldEdit),
}

/// Key mapper for converting key events to commands
pub struct KeyMapper;

impl KeyMapper {
    /// Map a key press. `editing` is true while the rename field has focus.
    pub fn map(event: &KeyEvent, editing: bool) -> Option<Command> {
        let mods = Modifiers::from(event.modifiers);

        if mods.contains(Modifiers::CTRL) {
            return None;
        }
        if mods.contains(Modifiers::ALT) {
            return Self::map_alt(event.code);
        }

        match event.code {
            KeyCode::Enter => Some(Command::RenameCommit),
            _ if editing => Self::map_edit(event.code),
            _ => None,
        }
    }

    /// Alt chords
    fn map_alt(code: KeyCode) -> Option<Command> {
        let cmd = match code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Enter => Command::Spawn,
            KeyCode::Char(ch) => match ch {
                'b' => Command::CycleBackground,
                'z' => Command::Raise,
                'q' => Command::Close,
                'w' => Command::Step(Direction::Up),
                's' => Command::Step(Direction::Down),
                'a' => Command::Step(Direction::Left),
                'd' => Command::Step(Direction::Right),
                'e' => Command::ToggleMove,
                'r' => Command::ToggleResize,
                'c' => Command::RenameStart,
                '1'..='8' => Command::ToggleWorkspace(ch as usize - '1' as usize),
                _ => return None,
            },
            _ => return None,
        };
        Some(cmd)
    }

    /// Plain keys while the rename field has focus
    fn map_edit(code: KeyCode) -> Option<Command> {
        let edit = match code {
            KeyCode::Esc => return Some(Command::RenameCancel),
            KeyCode::Char(ch) => FieldEdit::Insert(ch),
            KeyCode::Backspace => FieldEdit::Backspace,
            KeyCode::Delete => FieldEdit::Delete,
            KeyCode::Left => FieldEdit::Left,
            KeyCode::Right => FieldEdit::Right,
            KeyCode::Home => FieldEdit::Home,
            KeyCode::End => FieldEdit::End,
            _ => return None,
        };
        Some(Command::Edit(edit))
    }
}
