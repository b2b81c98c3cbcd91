use std::fmt;

/// Keyboard key symbol.
///
/// Collaborators map native key codes into these variants where possible.
/// For unsupported keys, use `Key::Unknown(u32)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
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

    // Modifiers as keys
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Physical key position as reported by the platform.
///
/// Unlike [`Key`], the scancode does not depend on the active keyboard layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Scancode(pub u32);

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false, meta: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false, meta: false };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    /// True when the platform's "command" modifier is held (Cmd on macOS, Ctrl elsewhere).
    pub fn command(&self) -> bool {
        if cfg!(target_os = "macos") { self.meta || self.ctrl } else { self.ctrl }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_modifiers_reports_none_held() {
        assert!(!Modifiers::NONE.any());
        assert!(!Modifiers::NONE.command());
    }

    #[test]
    fn ctrl_counts_as_command_everywhere() {
        assert!(Modifiers::CTRL.any());
        assert!(Modifiers::CTRL.command());
    }

    #[test]
    fn unknown_key_displays_its_code() {
        assert_eq!(Key::Unknown(42).to_string(), "Unknown(42)");
        assert_eq!(Key::Escape.to_string(), "Escape");
    }
}
