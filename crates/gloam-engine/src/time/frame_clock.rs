use std::collections::VecDeque;
use std::time::Duration;

/// Number of deltas kept for the smoothed average (one second at 60 fps).
pub const MAX_DELTA_HISTORY: usize = 60;

/// Length of one FPS sampling window, in seconds.
const FPS_WINDOW_SECS: f64 = 1.0;

/// Timing snapshot handed to game callbacks.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TimerStats {
    /// Time elapsed since the previous step, in seconds.
    pub delta: f64,

    /// Mean of the recent delta history, in seconds.
    pub average_delta: f64,

    /// Frames counted during the last complete one-second window.
    pub fps: u32,

    /// Seconds accumulated since `start()`.
    pub elapsed: f64,

    /// Number of steps taken since `start()`.
    pub frame_index: u64,
}

/// Frame clock producing per-iteration deltas, a smoothed average and an FPS counter.
///
/// Invariants:
/// - the delta history never holds more than [`MAX_DELTA_HISTORY`] entries; the oldest
///   entry is evicted first
/// - FPS republishes only once the accumulator reaches one second, and exactly one
///   second is subtracted so the overshoot counts toward the next window
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Duration>,

    history: VecDeque<f64>,
    history_sum: f64,

    delta: f64,
    average_delta: f64,
    elapsed: f64,
    frame_index: u64,

    fps_accumulator: f64,
    fps_frames: u32,
    fps: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            history: VecDeque::with_capacity(MAX_DELTA_HISTORY + 1),
            history_sum: 0.0,
            delta: 0.0,
            average_delta: 0.0,
            elapsed: 0.0,
            frame_index: 0,
            fps_accumulator: 0.0,
            fps_frames: 0,
            fps: 0,
        }
    }

    /// Sets the baseline to `now` and clears history and counters.
    pub fn start(&mut self, now: Duration) {
        *self = Self::new();
        self.last = Some(now);
    }

    /// Advances the clock to `now` and returns the elapsed seconds.
    ///
    /// Without a baseline (no `start()` and no previous step) the delta is zero.
    /// A timestamp earlier than the previous one also yields zero.
    pub fn step(&mut self, now: Duration) -> f64 {
        let dt = match self.last {
            Some(last) => now.saturating_sub(last).as_secs_f64(),
            None => 0.0,
        };
        self.last = Some(now);

        self.delta = dt;
        self.elapsed += dt;
        self.frame_index += 1;

        self.fps_frames += 1;
        self.fps_accumulator += dt;

        self.history.push_back(dt);
        self.history_sum += dt;
        if self.history.len() > MAX_DELTA_HISTORY {
            if let Some(oldest) = self.history.pop_front() {
                self.history_sum -= oldest;
            }
        }
        self.average_delta = self.history_sum / self.history.len() as f64;

        if self.fps_accumulator >= FPS_WINDOW_SECS {
            self.fps = self.fps_frames;
            self.fps_frames = 0;
            self.fps_accumulator -= FPS_WINDOW_SECS;
            log::debug!("fps={} avg_dt_ms={:.2}", self.fps, self.average_delta * 1000.0);
        }

        dt
    }

    /// Last published frames-per-second value.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Mean of the current delta history.
    pub fn average_delta(&self) -> f64 {
        self.average_delta
    }

    /// Most recent delta.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Time accumulated toward the next FPS republish.
    pub fn fps_accumulator(&self) -> f64 {
        self.fps_accumulator
    }

    /// Recent deltas, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn stats(&self) -> TimerStats {
        TimerStats {
            delta: self.delta,
            average_delta: self.average_delta,
            fps: self.fps,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Starts at zero and steps `n` times with a fixed 16 ms frame.
    fn run_16ms(n: u64) -> FrameClock {
        let mut clock = FrameClock::new();
        clock.start(Duration::ZERO);
        for i in 1..=n {
            clock.step(ms(16 * i));
        }
        clock
    }

    #[test]
    fn first_step_without_baseline_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.step(ms(500)), 0.0);
        assert!((clock.step(ms(516)) - 0.016).abs() < EPS);
    }

    #[test]
    fn republish_logs_the_updated_average() {
        crate::logging::capture::start();
        let mut clock = FrameClock::new();
        clock.start(Duration::ZERO);
        clock.step(ms(900));
        clock.step(ms(1100));

        assert_eq!(clock.fps(), 2);
        let lines = crate::logging::capture::lines(log::Level::Debug);
        assert!(lines.iter().any(|l| l == "fps=2 avg_dt_ms=550.00"), "{lines:?}");
    }

    #[test]
    fn step_backwards_in_time_yields_zero() {
        let mut clock = FrameClock::new();
        clock.start(ms(100));
        assert_eq!(clock.step(ms(50)), 0.0);
    }

    #[test]
    fn three_steps_average_without_republishing() {
        let clock = run_16ms(3);

        assert!((clock.average_delta() - 0.016).abs() < EPS);
        assert!((clock.fps_accumulator() - 0.048).abs() < EPS);
        assert_eq!(clock.fps(), 0);
        assert_eq!(clock.history().len(), 3);
    }

    #[test]
    fn sixty_two_steps_stay_below_the_window() {
        let clock = run_16ms(62);
        assert_eq!(clock.fps(), 0);
        assert!((clock.fps_accumulator() - 0.992).abs() < 1e-6);
    }

    #[test]
    fn crossing_one_second_publishes_step_count_and_keeps_overshoot() {
        let clock = run_16ms(63);

        assert_eq!(clock.fps(), 63);
        assert!((clock.fps_accumulator() - 0.008).abs() < 1e-6);
    }

    #[test]
    fn next_window_counts_only_steps_after_republish() {
        let mut clock = FrameClock::new();
        clock.start(Duration::ZERO);

        // 0.6 s + 0.6 s crosses the window on the second step.
        clock.step(ms(600));
        clock.step(ms(1200));
        assert_eq!(clock.fps(), 2);
        assert!((clock.fps_accumulator() - 0.2).abs() < 1e-6);

        // Three more steps of 0.3 s: 0.2 + 0.9 = 1.1 crosses again.
        clock.step(ms(1500));
        clock.step(ms(1800));
        assert_eq!(clock.fps(), 2);
        clock.step(ms(2100));
        assert_eq!(clock.fps(), 3);
        assert!((clock.fps_accumulator() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn large_single_delta_is_not_clamped_and_overshoot_carries() {
        let mut clock = FrameClock::new();
        clock.start(Duration::ZERO);
        clock.step(ms(2500));

        assert_eq!(clock.fps(), 1);
        assert!((clock.fps_accumulator() - 1.5).abs() < 1e-6);
        assert!((clock.delta() - 2.5).abs() < EPS);
    }

    #[test]
    fn history_is_bounded_and_evicts_oldest_first() {
        let mut clock = FrameClock::new();
        clock.start(Duration::ZERO);

        // Deltas 1 ms, 2 ms, ... so every entry is distinguishable.
        let mut now = Duration::ZERO;
        for i in 1..=75u64 {
            now += ms(i);
            clock.step(now);
            assert!(clock.history().len() <= MAX_DELTA_HISTORY);
        }

        let hist: Vec<f64> = clock.history().collect();
        assert_eq!(hist.len(), MAX_DELTA_HISTORY);
        assert!((hist[0] - 0.016).abs() < EPS);
        assert!((hist[MAX_DELTA_HISTORY - 1] - 0.075).abs() < EPS);

        let mean: f64 = hist.iter().sum::<f64>() / hist.len() as f64;
        assert!((clock.average_delta() - mean).abs() < 1e-9);
    }

    #[test]
    fn start_resets_counters() {
        let mut clock = run_16ms(70);
        clock.start(ms(10_000));

        let stats = clock.stats();
        assert_eq!(stats.frame_index, 0);
        assert_eq!(stats.fps, 0);
        assert_eq!(clock.history().len(), 0);
        assert!((clock.step(ms(10_016)) - 0.016).abs() < EPS);
    }

    #[test]
    fn stats_snapshot_tracks_elapsed_and_frame_index() {
        let clock = run_16ms(10);
        let stats = clock.stats();

        assert_eq!(stats.frame_index, 10);
        assert!((stats.elapsed - 0.16).abs() < 1e-9);
        assert!((stats.delta - 0.016).abs() < EPS);
    }
}
