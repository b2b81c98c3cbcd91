//! Desktop collaborator: winit window + event queue, wgpu presentation, system clipboard.
//!
//! The engine owns the loop, so winit is driven by pumping: every time the engine
//! drains an empty queue, pending OS events are pumped once with a zero timeout.

mod translate;

use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize, Size};
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Fullscreen, Icon, Window, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::event::Event;
use crate::paint::Color;

use super::{FullscreenType, Platform, PlatformError, SubsystemFlags, SurfaceMode};
use translate::Translator;

#[self_referencing]
struct WindowSurface {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Option<Gpu<'this>>,
}

impl WindowSurface {
    fn create(window: Window, init: GpuInit) -> Self {
        WindowSurfaceBuilder {
            window,
            gpu_builder: |w| match pollster::block_on(Gpu::new(w, init)) {
                Ok(gpu) => Some(gpu),
                Err(err) => {
                    log::warn!("no renderer for window: {err:#}");
                    None
                }
            },
        }
        .build()
    }
}

/// State touched from inside winit callbacks.
struct Pump {
    pending_mode: Option<SurfaceMode>,
    title: String,
    gpu_init: GpuInit,
    surface: Option<WindowSurface>,
    create_error: Option<String>,

    translator: Translator,
    relative_mode: bool,
    events: VecDeque<Event>,
    exited: bool,
}

impl Pump {
    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(mode) = self.pending_mode.take() else {
            return;
        };

        let size: Size = if mode.high_dpi {
            LogicalSize::new(mode.width as f64, mode.height as f64).into()
        } else {
            PhysicalSize::new(mode.width, mode.height).into()
        };

        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(size)
            .with_resizable(mode.resizable)
            .with_decorations(!mode.borderless);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                // Drop the old surface before binding a new one.
                self.surface = None;
                self.surface = Some(WindowSurface::create(window, self.gpu_init.clone()));
            }
            Err(err) => self.create_error = Some(err.to_string()),
        }
    }
}

impl ApplicationHandler for Pump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.borrow_window().id() != window_id {
            return;
        }

        if let WindowEvent::Resized(size) = &event {
            surface.with_gpu_mut(|gpu| {
                if let Some(gpu) = gpu {
                    gpu.resize(*size);
                }
            });
        }

        let scale = surface.borrow_window().scale_factor();
        self.translator.translate(scale, &event, Instant::now(), &mut self.events);
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.relative_mode && self.surface.is_some() {
                let ev = self.translator.raw_motion(dx, dy);
                self.events.push_back(ev);
            }
        }
    }
}

/// [`Platform`] backed by a real desktop window.
pub struct WinitPlatform {
    event_loop: Option<EventLoop<()>>,
    active: SubsystemFlags,
    pump: Pump,
    pumped: bool,
    clear: Color,
    clipboard: Option<arboard::Clipboard>,
    origin: Instant,
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self::with_gpu_init(GpuInit::default())
    }

    pub fn with_gpu_init(gpu_init: GpuInit) -> Self {
        Self {
            event_loop: None,
            active: SubsystemFlags::empty(),
            pump: Pump {
                pending_mode: None,
                title: String::new(),
                gpu_init,
                surface: None,
                create_error: None,
                translator: Translator::default(),
                relative_mode: false,
                events: VecDeque::new(),
                exited: false,
            },
            pumped: false,
            clear: Color::BLACK,
            clipboard: None,
            origin: Instant::now(),
        }
    }

    fn pump_events(&mut self) {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return;
        };
        if self.pump.exited {
            return;
        }

        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump) {
            log::info!("event loop exited with code {code}");
            self.pump.exited = true;
            self.pump.events.push_back(Event::Quit);
        }
    }

    fn window(&self) -> Result<&Window, PlatformError> {
        self.pump
            .surface
            .as_ref()
            .map(|s| s.borrow_window())
            .ok_or(PlatformError::NoSurface)
    }

    fn require(&self, flags: SubsystemFlags) -> Result<(), PlatformError> {
        if self.active.contains(flags) {
            Ok(())
        } else {
            Err(PlatformError::NotInitialized(flags.difference(self.active)))
        }
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WinitPlatform {
    fn init_subsystems(&mut self, flags: SubsystemFlags) -> Result<SubsystemFlags, PlatformError> {
        if self.event_loop.is_none() {
            let event_loop = EventLoop::new().map_err(|e| PlatformError::operation("init", e))?;
            self.event_loop = Some(event_loop);
        }
        self.active |= flags;
        Ok(flags)
    }

    fn quit_subsystems(&mut self, flags: SubsystemFlags) {
        if flags.contains(SubsystemFlags::VIDEO) {
            self.pump.surface = None;
            self.clipboard = None;
        }
        if flags.contains(SubsystemFlags::EVENTS) {
            self.pump.events.clear();
        }
        // winit allows one event loop per process, so it is kept for reuse.
        self.active.remove(flags);
    }

    fn set_mode(&mut self, mode: &SurfaceMode) -> Result<(), PlatformError> {
        self.require(SubsystemFlags::VIDEO)?;

        self.pump.pending_mode = Some(*mode);
        self.pump.create_error = None;
        // Window creation needs an active event loop; pump until it has happened.
        for _ in 0..8 {
            self.pump_events();
            if self.pump.pending_mode.is_none() || self.pump.exited {
                break;
            }
        }

        if let Some(err) = self.pump.create_error.take() {
            return Err(PlatformError::operation("set_mode", err));
        }
        if self.pump.surface.is_none() {
            self.pump.pending_mode = None;
            return Err(PlatformError::operation("set_mode", "window was not created"));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.pump.surface.is_some()
    }

    fn has_renderer(&self) -> bool {
        self.pump
            .surface
            .as_ref()
            .is_some_and(|s| s.borrow_gpu().is_some())
    }

    fn close(&mut self) {
        if self.pump.surface.take().is_some() {
            log::debug!("window closed");
        }
    }

    fn set_title(&mut self, title: &str) {
        self.pump.title = title.to_string();
        if let Ok(window) = self.window() {
            window.set_title(title);
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool, kind: FullscreenType) -> Result<(), PlatformError> {
        let window = self.window()?;
        if !fullscreen {
            window.set_fullscreen(None);
            return Ok(());
        }

        let mode = match kind {
            FullscreenType::Desktop => Fullscreen::Borderless(None),
            FullscreenType::Exclusive => {
                let video_mode = window
                    .current_monitor()
                    .and_then(|m| {
                        m.video_modes().max_by_key(|v| {
                            let s = v.size();
                            (s.width as u64 * s.height as u64, v.refresh_rate_millihertz())
                        })
                    })
                    .ok_or(PlatformError::Unsupported("exclusive fullscreen"))?;
                Fullscreen::Exclusive(video_mode)
            }
        };
        window.set_fullscreen(Some(mode));
        Ok(())
    }

    fn set_vsync(&mut self, enabled: bool) -> Result<(), PlatformError> {
        let surface = self.pump.surface.as_mut().ok_or(PlatformError::NoSurface)?;
        surface.with_gpu_mut(|gpu| match gpu {
            Some(gpu) => gpu
                .set_vsync(enabled)
                .map_err(|e| PlatformError::operation("set_vsync", format!("{e:#}"))),
            None => Err(PlatformError::Unsupported("vsync without a renderer")),
        })
    }

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PlatformError> {
        self.window()?.set_outer_position(PhysicalPosition::new(x, y));
        Ok(())
    }

    fn set_icon(&mut self, path: &Path) -> Result<(), PlatformError> {
        let window = self.window()?;
        let icon = load_icon(path).map_err(|e| PlatformError::operation("set_icon", format!("{e:#}")))?;
        window.set_window_icon(Some(icon));
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.clear = color;
    }

    fn present(&mut self) -> Result<(), PlatformError> {
        let color = self.clear.to_wgpu();
        let surface = self.pump.surface.as_mut().ok_or(PlatformError::NoSurface)?;
        surface.borrow_window().pre_present_notify();

        surface.with_gpu_mut(|gpu| {
            let Some(gpu) = gpu else {
                return Err(PlatformError::Unsupported("present without a renderer"));
            };
            match gpu.clear_and_present(color) {
                Ok(()) => Ok(()),
                Err(err) => {
                    let action = gpu.handle_surface_error(&err);
                    log::debug!("surface error {err:?} -> {action:?}");
                    match action {
                        SurfaceErrorAction::Fatal => Err(PlatformError::operation("present", err)),
                        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                            Err(PlatformError::operation("present", format!("frame skipped: {err}")))
                        }
                    }
                }
            }
        })
    }

    fn set_pointer_visible(&mut self, visible: bool) -> Result<(), PlatformError> {
        self.window()?.set_cursor_visible(visible);
        Ok(())
    }

    fn set_pointer_grabbed(&mut self, grabbed: bool) -> Result<(), PlatformError> {
        let window = self.window()?;
        let result = if grabbed {
            window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        result.map_err(|e| PlatformError::operation("set_pointer_grabbed", e))
    }

    fn set_relative_mode(&mut self, enabled: bool) -> Result<(), PlatformError> {
        let window = self.window()?;
        let mode = if enabled { CursorGrabMode::Locked } else { CursorGrabMode::None };
        window
            .set_cursor_grab(mode)
            .map_err(|e| PlatformError::operation("set_relative_mode", e))?;
        window.set_cursor_visible(!enabled);
        self.pump.relative_mode = enabled;
        Ok(())
    }

    fn set_clipboard_text(&mut self, text: &str) -> Result<(), PlatformError> {
        if self.clipboard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| PlatformError::operation("set_clipboard_text", e))?;
            self.clipboard = Some(clipboard);
        }

        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_owned())
                .map_err(|e| PlatformError::operation("set_clipboard_text", e)),
            None => Err(PlatformError::Unsupported("clipboard")),
        }
    }

    fn poll_event(&mut self) -> Option<Event> {
        // Pump at most once per drain so a busy OS queue cannot stall the frame.
        if self.pump.events.is_empty() && !self.pumped && self.active.contains(SubsystemFlags::EVENTS) {
            self.pump_events();
            self.pumped = true;
        }

        let event = self.pump.events.pop_front();
        if event.is_none() {
            self.pumped = false;
        }
        event
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

fn load_icon(path: &Path) -> anyhow::Result<Icon> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    Icon::from_rgba(image.into_raw(), width, height).context("invalid icon data")
}
