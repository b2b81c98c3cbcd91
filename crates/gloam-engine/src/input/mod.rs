//! Input vocabulary.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Collaborators translate native events into `event::Event` values built from these.

mod types;

pub use types::{Key, Modifiers, MouseButton, Scancode};
