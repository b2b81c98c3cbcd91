//! Collaborator boundary.
//!
//! The engine never touches a window system, GPU or clipboard directly. Everything
//! it needs from the outside world goes through the [`Platform`] trait:
//! - [`HeadlessPlatform`] is a scripted in-memory implementation
//! - [`WinitPlatform`] drives a real desktop window through winit + wgpu

mod desktop;
mod headless;
mod subsystem;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::paint::Color;

pub use desktop::WinitPlatform;
pub use headless::HeadlessPlatform;
pub use subsystem::{SubsystemFlags, SubsystemManager};

/// Surface creation parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceMode {
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub borderless: bool,
    pub high_dpi: bool,
}

impl SurfaceMode {
    /// Safe defaults used when a surface has to be created during fault recovery.
    pub const FALLBACK: Self = Self {
        width: 800,
        height: 600,
        resizable: true,
        borderless: false,
        high_dpi: false,
    };
}

impl Default for SurfaceMode {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            resizable: false,
            borderless: false,
            high_dpi: false,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FullscreenType {
    /// Borderless window covering the desktop at its current resolution.
    #[default]
    Desktop,
    /// Exclusive video mode change.
    Exclusive,
}

/// Failure reported by a collaborator operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlatformError {
    #[error("subsystem {0} is not initialized")]
    NotInitialized(SubsystemFlags),

    #[error("no surface is open")]
    NoSurface,

    #[error("{operation} failed: {reason}")]
    Operation {
        operation: &'static str,
        reason: String,
    },

    #[error("{0} is not supported by this platform")]
    Unsupported(&'static str),
}

impl PlatformError {
    pub fn operation(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Operation {
            operation,
            reason: reason.to_string(),
        }
    }
}

/// Services the engine consumes from the windowing, graphics and input layers.
///
/// All methods are called from the engine's thread. Implementations are not
/// required to be `Send`.
pub trait Platform {
    // ── subsystems ────────────────────────────────────────────────────────

    /// Starts the requested subsystems and returns the set that is now active.
    fn init_subsystems(&mut self, flags: SubsystemFlags) -> Result<SubsystemFlags, PlatformError>;

    /// Stops the given subsystems. Stopping an inactive subsystem is a no-op.
    fn quit_subsystems(&mut self, flags: SubsystemFlags);

    // ── surface ───────────────────────────────────────────────────────────

    /// Creates (or recreates) the drawing surface.
    fn set_mode(&mut self, mode: &SurfaceMode) -> Result<(), PlatformError>;

    fn is_open(&self) -> bool;

    /// True when the open surface can be cleared and presented.
    fn has_renderer(&self) -> bool;

    /// Destroys the surface. No-op when none is open.
    fn close(&mut self);

    fn set_title(&mut self, title: &str);

    fn set_fullscreen(&mut self, fullscreen: bool, kind: FullscreenType) -> Result<(), PlatformError>;

    fn set_vsync(&mut self, enabled: bool) -> Result<(), PlatformError>;

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PlatformError>;

    fn set_icon(&mut self, path: &Path) -> Result<(), PlatformError>;

    // ── graphics ──────────────────────────────────────────────────────────

    /// Sets the color the next presented frame is cleared to.
    fn clear(&mut self, color: Color);

    fn present(&mut self) -> Result<(), PlatformError>;

    // ── input modes ───────────────────────────────────────────────────────

    fn set_pointer_visible(&mut self, visible: bool) -> Result<(), PlatformError>;

    fn set_pointer_grabbed(&mut self, grabbed: bool) -> Result<(), PlatformError>;

    fn set_relative_mode(&mut self, enabled: bool) -> Result<(), PlatformError>;

    // ── misc services ─────────────────────────────────────────────────────

    fn set_clipboard_text(&mut self, text: &str) -> Result<(), PlatformError>;

    /// Returns the next queued event, or `None` when the queue is empty.
    fn poll_event(&mut self) -> Option<Event>;

    /// Monotonic time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;

    fn sleep(&mut self, duration: Duration);
}
