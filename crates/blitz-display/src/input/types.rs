/// Keyboard key, as seen by keyboard handlers.
///
/// Printable keys arrive as [`Key::Char`] after layout translation, so `'q'`
/// means the key that types a `q` on the user's layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Char(char),

    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// Function key `F1`..`F24`.
    F(u8),

    /// Key with no mapping here (media keys, IME keys, ...).
    Unknown,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Modifier keys held during a key event.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    #[inline]
    pub fn none(self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// One keyboard transition delivered to the session's keyboard handler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,
    pub modifiers: Modifiers,
    /// Auto-repeat while held.
    pub repeat: bool,
}

impl KeyEvent {
    #[inline]
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    #[inline]
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Pressed
    }

    /// Case-insensitive match against a printable key.
    pub fn is_char(&self, c: char) -> bool {
        match self.key {
            Key::Char(k) => k.eq_ignore_ascii_case(&c),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_match_ignores_case() {
        let ev = KeyEvent::pressed(Key::Char('Q'));
        assert!(ev.is_char('q'));
        assert!(!ev.is_char('w'));
        assert!(!KeyEvent::pressed(Key::Escape).is_char('q'));
    }

    #[test]
    fn default_modifiers_are_empty() {
        assert!(Modifiers::default().none());
        assert!(!Modifiers { ctrl: true, ..Default::default() }.none());
    }
}
