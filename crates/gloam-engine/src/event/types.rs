use std::path::PathBuf;

use crate::input::{Key, Modifiers, MouseButton, Scancode};

/// Pointer button press/release in window coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseButtonEvent {
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
    /// True when the press originated from a touch device.
    pub is_touch: bool,
    /// Number of consecutive clicks (1 for single, 2 for double, ...).
    pub clicks: u8,
}

/// Typed domain event produced by a collaborator.
///
/// Each native event maps to at most one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user asked the application to close (window close button, OS quit).
    Quit,

    KeyDown {
        key: Key,
        scancode: Scancode,
        repeat: bool,
        modifiers: Modifiers,
    },

    KeyUp {
        key: Key,
        scancode: Scancode,
        modifiers: Modifiers,
    },

    /// Committed text, after keyboard layout and IME processing.
    TextInput(String),

    MouseButtonDown(MouseButtonEvent),
    MouseButtonUp(MouseButtonEvent),

    MouseMoved {
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        is_touch: bool,
    },

    WheelMoved { x: f32, y: f32 },

    FileDropped(PathBuf),

    Resized { width: u32, height: u32 },

    Focus(bool),
}

impl Event {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Quit => "quit",
            Event::KeyDown { .. } => "key-down",
            Event::KeyUp { .. } => "key-up",
            Event::TextInput(_) => "text-input",
            Event::MouseButtonDown(_) => "mouse-down",
            Event::MouseButtonUp(_) => "mouse-up",
            Event::MouseMoved { .. } => "mouse-moved",
            Event::WheelMoved { .. } => "wheel-moved",
            Event::FileDropped(_) => "file-dropped",
            Event::Resized { .. } => "resized",
            Event::Focus(_) => "focus",
        }
    }

    /// Convenience constructor for an unmodified, non-repeating key press.
    pub fn key_down(key: Key) -> Self {
        Event::KeyDown {
            key,
            scancode: Scancode::default(),
            repeat: false,
            modifiers: Modifiers::NONE,
        }
    }
}
