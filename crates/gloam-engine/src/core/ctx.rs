use crate::paint::Color;
use crate::platform::Platform;
use crate::time::TimerStats;

/// Per-call context handed to every game callback.
///
/// Gives the game access to the collaborator (surface, clipboard, pointer modes)
/// and a timing snapshot taken at the start of the frame.
pub struct Ctx<'a> {
    platform: &'a mut dyn Platform,
    timer: TimerStats,
}

impl<'a> Ctx<'a> {
    pub fn new(platform: &'a mut dyn Platform, timer: TimerStats) -> Self {
        Self { platform, timer }
    }

    pub fn platform(&mut self) -> &mut dyn Platform {
        self.platform
    }

    pub fn timer(&self) -> TimerStats {
        self.timer
    }

    /// Frames per second published by the frame clock.
    pub fn fps(&self) -> u32 {
        self.timer.fps
    }

    pub fn is_open(&self) -> bool {
        self.platform.is_open()
    }

    /// Closes the surface. The run ends after the current frame.
    pub fn close(&mut self) {
        self.platform.close();
    }

    /// Sets the color the current frame is cleared to.
    pub fn clear(&mut self, color: Color) {
        self.platform.clear(color);
    }
}

impl std::fmt::Debug for Ctx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ctx")
            .field("open", &self.platform.is_open())
            .field("timer", &self.timer)
            .finish()
    }
}
