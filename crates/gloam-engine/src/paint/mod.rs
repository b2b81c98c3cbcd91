//! Paint model.
//!
//! The core only ever clears the surface, so a single color type is all it needs.
//! Drawing primitives live outside the engine.

pub mod color;

pub use color::Color;
