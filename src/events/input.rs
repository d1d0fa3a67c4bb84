//! Key events and matching them against configured bindings.
//!
//! Bindings are strings such as `"l"`, `"Enter"`, `"space"` or `"Ctrl+c"`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys a binding can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    /// Anything no binding can refer to.
    Other,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            _ => Key::Other,
        }
    }
}

impl Key {
    /// Parse the key part of a binding.
    fn parse(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "enter" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    fn same_as(self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A key press reduced to what bindings can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers::from(event.modifiers),
        }
    }
}

impl InputEvent {
    /// Whether this press triggers `binding`. Malformed bindings never match.
    pub fn matches(&self, binding: &str) -> bool {
        let Some((modifiers, key)) = parse_binding(binding) else {
            return false;
        };

        // Terminals report Shift for symbols like '?', so it only counts for letters.
        let shift_matters = !matches!(self.key, Key::Char(c) if !c.is_ascii_alphabetic());

        self.modifiers.ctrl == modifiers.ctrl
            && self.modifiers.alt == modifiers.alt
            && (!shift_matters || self.modifiers.shift == modifiers.shift)
            && self.key.same_as(key)
    }
}

fn parse_binding(binding: &str) -> Option<(Modifiers, Key)> {
    // A lone "+" would split into two empty parts.
    if binding == "+" {
        return Some((Modifiers::default(), Key::Char('+')));
    }

    let mut modifiers = Modifiers::default();
    let mut key = None;
    for part in binding.split('+') {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" => modifiers.ctrl = true,
            "alt" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            _ => key = Some(Key::parse(part)?),
        }
    }
    key.map(|key| (modifiers, key))
}
