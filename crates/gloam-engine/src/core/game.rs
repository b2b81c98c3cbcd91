use std::path::Path;

use crate::input::{Key, MouseButton, Scancode};

use super::ctx::Ctx;
use super::fault::Fault;

/// Result type returned by every game callback.
///
/// Returning an error is treated exactly like a panic: the callback is considered
/// faulted and the run moves into fault recovery.
pub type GameResult = anyhow::Result<()>;

/// Game contract driven by [`Engine`](super::Engine).
///
/// `load`, `update` and `draw` are mandatory. Everything else is an optional
/// capability: the engine asks for it through an accessor and drops the related
/// events when the accessor returns `None`.
pub trait Game {
    /// Name shown in the diagnostic window title.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Called once after the startup configuration was applied.
    fn load(&mut self, ctx: &mut Ctx<'_>) -> GameResult;

    /// Called once per frame with the elapsed seconds since the previous frame.
    fn update(&mut self, ctx: &mut Ctx<'_>, dt: f64) -> GameResult;

    /// Called once per frame after `update`; the frame is presented afterwards.
    fn draw(&mut self, ctx: &mut Ctx<'_>) -> GameResult;

    fn keyboard(&mut self) -> Option<&mut dyn KeyboardHandler> {
        None
    }

    fn mouse(&mut self) -> Option<&mut dyn MouseHandler> {
        None
    }

    fn window_events(&mut self) -> Option<&mut dyn WindowHandler> {
        None
    }

    /// Custom fault handler. When present it replaces the default diagnostic display.
    fn fault_handler(&mut self) -> Option<&mut dyn FaultHandler> {
        None
    }
}

pub trait KeyboardHandler {
    fn key_pressed(&mut self, ctx: &mut Ctx<'_>, key: Key, scancode: Scancode, is_repeat: bool) -> GameResult {
        let _ = (ctx, key, scancode, is_repeat);
        Ok(())
    }

    fn key_released(&mut self, ctx: &mut Ctx<'_>, key: Key, scancode: Scancode) -> GameResult {
        let _ = (ctx, key, scancode);
        Ok(())
    }

    fn text_input(&mut self, ctx: &mut Ctx<'_>, text: &str) -> GameResult {
        let _ = (ctx, text);
        Ok(())
    }
}

/// Pointer callbacks. Touch input is reported through the same methods with
/// `is_touch` set.
pub trait MouseHandler {
    fn mouse_pressed(
        &mut self,
        ctx: &mut Ctx<'_>,
        x: i32,
        y: i32,
        button: MouseButton,
        is_touch: bool,
        clicks: u8,
    ) -> GameResult {
        let _ = (ctx, x, y, button, is_touch, clicks);
        Ok(())
    }

    fn mouse_released(
        &mut self,
        ctx: &mut Ctx<'_>,
        x: i32,
        y: i32,
        button: MouseButton,
        is_touch: bool,
        clicks: u8,
    ) -> GameResult {
        let _ = (ctx, x, y, button, is_touch, clicks);
        Ok(())
    }

    fn mouse_moved(&mut self, ctx: &mut Ctx<'_>, x: f32, y: f32, dx: f32, dy: f32, is_touch: bool) -> GameResult {
        let _ = (ctx, x, y, dx, dy, is_touch);
        Ok(())
    }

    fn wheel_moved(&mut self, ctx: &mut Ctx<'_>, x: f32, y: f32) -> GameResult {
        let _ = (ctx, x, y);
        Ok(())
    }
}

pub trait WindowHandler {
    fn file_dropped(&mut self, ctx: &mut Ctx<'_>, path: &Path) -> GameResult {
        let _ = (ctx, path);
        Ok(())
    }

    fn resized(&mut self, ctx: &mut Ctx<'_>, width: u32, height: u32) -> GameResult {
        let _ = (ctx, width, height);
        Ok(())
    }

    fn focus(&mut self, ctx: &mut Ctx<'_>, focused: bool) -> GameResult {
        let _ = (ctx, focused);
        Ok(())
    }
}

/// Receives the first fault of a run.
///
/// The surface is closed after the handler returns, unless the handler itself
/// already closed it. A failing handler is logged and never re-enters recovery.
pub trait FaultHandler {
    fn handle_fault(&mut self, ctx: &mut Ctx<'_>, fault: &Fault) -> GameResult;
}
