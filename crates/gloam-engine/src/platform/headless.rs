use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::event::Event;
use crate::paint::Color;

use super::{FullscreenType, Platform, PlatformError, SubsystemFlags, SurfaceMode};

/// In-memory collaborator with a scripted event queue and a fake clock.
///
/// Nothing is rendered. Every request is recorded so tests can assert on it, and
/// individual services can be made to fail.
///
/// Event scheduling is keyed on *drains*: each time [`poll_event`](Platform::poll_event)
/// finds the queue empty, the drain counter advances. The main loop drains once per
/// frame, so `push_event_at(n, ev)` delivers `ev` during the `n`-th frame (0-based),
/// counting diagnostic-loop frames after the main loop ends.
///
/// The clock advances by `frame_time` every time it is read.
#[derive(Debug)]
pub struct HeadlessPlatform {
    queue: VecDeque<Event>,
    scheduled: Vec<(u64, Event)>,
    drains: u64,

    active: SubsystemFlags,
    init_calls: Vec<SubsystemFlags>,
    quit_calls: Vec<SubsystemFlags>,

    open: bool,
    renderer: bool,
    mode: Option<SurfaceMode>,
    title: String,
    fullscreen: Option<FullscreenType>,
    vsync: Option<bool>,
    position: Option<(i32, i32)>,
    icon: Option<PathBuf>,
    set_mode_calls: u32,
    closes: u32,

    clear_color: Option<Color>,
    presents: u64,

    pointer_visible: bool,
    pointer_grabbed: bool,
    relative_mode: bool,
    clipboard: Option<String>,

    now: std::cell::Cell<Duration>,
    frame_time: Duration,

    renderer_available: bool,
    fail_init: bool,
    fail_set_mode: bool,
    fail_input_reset: bool,
    fail_clipboard: bool,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            scheduled: Vec::new(),
            drains: 0,
            active: SubsystemFlags::empty(),
            init_calls: Vec::new(),
            quit_calls: Vec::new(),
            open: false,
            renderer: false,
            mode: None,
            title: String::new(),
            fullscreen: None,
            vsync: None,
            position: None,
            icon: None,
            set_mode_calls: 0,
            closes: 0,
            clear_color: None,
            presents: 0,
            pointer_visible: true,
            pointer_grabbed: false,
            relative_mode: false,
            clipboard: None,
            now: std::cell::Cell::new(Duration::ZERO),
            frame_time: Duration::from_millis(16),
            renderer_available: true,
            fail_init: false,
            fail_set_mode: false,
            fail_input_reset: false,
            fail_clipboard: false,
        }
    }

    // ── builders ──────────────────────────────────────────────────────────

    /// Amount the clock advances per read.
    pub fn with_frame_time(mut self, frame_time: Duration) -> Self {
        self.frame_time = frame_time;
        self
    }

    /// Surfaces can be created but never get a renderer.
    pub fn without_renderer(mut self) -> Self {
        self.renderer_available = false;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_set_mode(mut self) -> Self {
        self.fail_set_mode = true;
        self
    }

    pub fn failing_input_reset(mut self) -> Self {
        self.fail_input_reset = true;
        self
    }

    pub fn failing_clipboard(mut self) -> Self {
        self.fail_clipboard = true;
        self
    }

    /// Starts with the pointer hidden, grabbed and in relative mode.
    pub fn with_captured_pointer(mut self) -> Self {
        self.pointer_visible = false;
        self.pointer_grabbed = true;
        self.relative_mode = true;
        self
    }

    // ── scripting ─────────────────────────────────────────────────────────

    /// Queues an event for the next drain.
    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Queues an event for the drain with index `drain` (0-based).
    pub fn push_event_at(&mut self, drain: u64, event: Event) {
        self.scheduled.push((drain, event));
    }

    // ── inspection ────────────────────────────────────────────────────────

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn drains(&self) -> u64 {
        self.drains
    }

    pub fn active_subsystems(&self) -> SubsystemFlags {
        self.active
    }

    pub fn init_calls(&self) -> &[SubsystemFlags] {
        &self.init_calls
    }

    pub fn quit_calls(&self) -> &[SubsystemFlags] {
        &self.quit_calls
    }

    pub fn mode(&self) -> Option<SurfaceMode> {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fullscreen(&self) -> Option<FullscreenType> {
        self.fullscreen
    }

    pub fn vsync(&self) -> Option<bool> {
        self.vsync
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    pub fn set_mode_calls(&self) -> u32 {
        self.set_mode_calls
    }

    pub fn close_count(&self) -> u32 {
        self.closes
    }

    pub fn clear_color(&self) -> Option<Color> {
        self.clear_color
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    pub fn pointer_visible(&self) -> bool {
        self.pointer_visible
    }

    pub fn pointer_grabbed(&self) -> bool {
        self.pointer_grabbed
    }

    pub fn relative_mode(&self) -> bool {
        self.relative_mode
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    fn release_scheduled(&mut self) {
        let drain = self.drains;
        let (due, later): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|(at, _)| *at <= drain);
        self.scheduled = later;
        self.queue.extend(due.into_iter().map(|(_, ev)| ev));
    }

    fn require_surface(&self) -> Result<(), PlatformError> {
        if self.open { Ok(()) } else { Err(PlatformError::NoSurface) }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn init_subsystems(&mut self, flags: SubsystemFlags) -> Result<SubsystemFlags, PlatformError> {
        self.init_calls.push(flags);
        if self.fail_init {
            return Err(PlatformError::operation("init", "headless init disabled"));
        }
        self.active |= flags;
        Ok(flags)
    }

    fn quit_subsystems(&mut self, flags: SubsystemFlags) {
        self.quit_calls.push(flags);
        if flags.contains(SubsystemFlags::VIDEO) {
            self.open = false;
            self.renderer = false;
        }
        self.active.remove(flags);
    }

    fn set_mode(&mut self, mode: &SurfaceMode) -> Result<(), PlatformError> {
        self.set_mode_calls += 1;
        if !self.active.contains(SubsystemFlags::VIDEO) {
            return Err(PlatformError::NotInitialized(SubsystemFlags::VIDEO));
        }
        if self.fail_set_mode {
            return Err(PlatformError::operation("set_mode", "headless surface creation disabled"));
        }
        self.mode = Some(*mode);
        self.open = true;
        self.renderer = self.renderer_available;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn has_renderer(&self) -> bool {
        self.open && self.renderer
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.renderer = false;
            self.closes += 1;
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_fullscreen(&mut self, fullscreen: bool, kind: FullscreenType) -> Result<(), PlatformError> {
        self.require_surface()?;
        self.fullscreen = fullscreen.then_some(kind);
        Ok(())
    }

    fn set_vsync(&mut self, enabled: bool) -> Result<(), PlatformError> {
        self.require_surface()?;
        self.vsync = Some(enabled);
        Ok(())
    }

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PlatformError> {
        self.require_surface()?;
        self.position = Some((x, y));
        Ok(())
    }

    fn set_icon(&mut self, path: &Path) -> Result<(), PlatformError> {
        self.require_surface()?;
        self.icon = Some(path.to_path_buf());
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = Some(color);
    }

    fn present(&mut self) -> Result<(), PlatformError> {
        self.require_surface()?;
        self.presents += 1;
        Ok(())
    }

    fn set_pointer_visible(&mut self, visible: bool) -> Result<(), PlatformError> {
        if self.fail_input_reset {
            return Err(PlatformError::operation("set_pointer_visible", "headless input disabled"));
        }
        self.pointer_visible = visible;
        Ok(())
    }

    fn set_pointer_grabbed(&mut self, grabbed: bool) -> Result<(), PlatformError> {
        if self.fail_input_reset {
            return Err(PlatformError::operation("set_pointer_grabbed", "headless input disabled"));
        }
        self.pointer_grabbed = grabbed;
        Ok(())
    }

    fn set_relative_mode(&mut self, enabled: bool) -> Result<(), PlatformError> {
        if self.fail_input_reset {
            return Err(PlatformError::operation("set_relative_mode", "headless input disabled"));
        }
        self.relative_mode = enabled;
        Ok(())
    }

    fn set_clipboard_text(&mut self, text: &str) -> Result<(), PlatformError> {
        if self.fail_clipboard {
            return Err(PlatformError::operation("set_clipboard_text", "headless clipboard disabled"));
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn poll_event(&mut self) -> Option<Event> {
        self.release_scheduled();
        let event = self.queue.pop_front();
        if event.is_none() {
            self.drains += 1;
        }
        event
    }

    fn now(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.frame_time);
        now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[test]
    fn scheduled_events_arrive_on_their_drain() {
        let mut p = HeadlessPlatform::new();
        p.push_event_at(1, Event::key_down(Key::A));

        assert_eq!(p.poll_event(), None);
        assert_eq!(p.poll_event(), Some(Event::key_down(Key::A)));
        assert_eq!(p.poll_event(), None);
        assert_eq!(p.drains(), 2);
    }

    #[test]
    fn clock_advances_per_read() {
        let p = HeadlessPlatform::new().with_frame_time(Duration::from_millis(10));
        assert_eq!(p.now(), Duration::ZERO);
        assert_eq!(p.now(), Duration::from_millis(10));
    }

    #[test]
    fn set_mode_requires_video() {
        let mut p = HeadlessPlatform::new();
        assert_eq!(
            p.set_mode(&SurfaceMode::default()),
            Err(PlatformError::NotInitialized(SubsystemFlags::VIDEO))
        );
        p.init_subsystems(SubsystemFlags::VIDEO).unwrap();
        p.set_mode(&SurfaceMode::default()).unwrap();
        assert!(p.is_open() && p.has_renderer());
    }

    #[test]
    fn without_renderer_opens_an_undrawable_surface() {
        let mut p = HeadlessPlatform::new().without_renderer();
        p.init_subsystems(SubsystemFlags::all()).unwrap();
        p.set_mode(&SurfaceMode::default()).unwrap();
        assert!(p.is_open());
        assert!(!p.has_renderer());
    }

    #[test]
    fn quitting_video_closes_the_surface() {
        let mut p = HeadlessPlatform::new();
        p.init_subsystems(SubsystemFlags::all()).unwrap();
        p.set_mode(&SurfaceMode::default()).unwrap();
        p.quit_subsystems(SubsystemFlags::VIDEO);
        assert!(!p.is_open());
        assert_eq!(p.active_subsystems(), SubsystemFlags::EVENTS);
    }
}
