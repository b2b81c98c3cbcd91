use std::panic::{self, AssertUnwindSafe};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::{dispatch_to_game, Drain, EventPump};
use crate::paint::Color;
use crate::platform::{Platform, SubsystemFlags, SubsystemManager};
use crate::time::FrameClock;

use super::ctx::Ctx;
use super::fault::{guard, CallSite, Fault, FaultController, Recovery};
use super::frame_loop::{run_frames, LoopControl};
use super::game::Game;

/// Orchestrator state. Only ever moves forward within a run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LoopState {
    NotStarted,
    Initializing,
    Running,
    Faulted,
    ShuttingDown,
    Stopped,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The surface was closed by the user or the game.
    Closed,
    /// A callback faulted; holds the first fault.
    Faulted(Fault),
    /// The engine could not start (or was already used).
    Aborted(EngineError),
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Main-loop iterations executed.
    pub frames: u64,
    /// Recovery path taken for the first fault, if any.
    pub recovery: Option<Recovery>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        matches!(self.outcome, RunOutcome::Closed)
    }

    pub fn fault(&self) -> Option<&Fault> {
        match &self.outcome {
            RunOutcome::Faulted(fault) => Some(fault),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: LoopState,
    history: Vec<LoopState>,
}

impl Lifecycle {
    fn new() -> Self {
        Self { state: LoopState::NotStarted, history: vec![LoopState::NotStarted] }
    }

    fn enter(&mut self, next: LoopState) {
        if next == self.state {
            return;
        }
        debug_assert!(next > self.state, "loop state moved backwards: {:?} -> {next:?}", self.state);
        log::debug!("loop state {:?} -> {next:?}", self.state);
        self.state = next;
        self.history.push(next);
    }
}

/// Drives one [`Game`] from startup to shutdown over a [`Platform`].
///
/// An engine runs exactly once. Everything the loop mutates lives here, so several
/// engines can run one after another in the same process.
pub struct Engine<P: Platform> {
    config: EngineConfig,
    platform: P,
    subsystems: SubsystemManager,
    clock: FrameClock,
    pump: EventPump,
    faults: FaultController,
    lifecycle: Lifecycle,
    frames: u64,
    recovery: Option<Recovery>,
}

impl<P: Platform> Engine<P> {
    pub fn new(config: EngineConfig, platform: P) -> Self {
        Self {
            config,
            platform,
            subsystems: SubsystemManager::new(),
            clock: FrameClock::new(),
            pump: EventPump::new(),
            faults: FaultController::new(),
            lifecycle: Lifecycle::new(),
            frames: 0,
            recovery: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.lifecycle.state
    }

    /// Every state entered so far, in order.
    pub fn transitions(&self) -> &[LoopState] {
        &self.lifecycle.history
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn in_error(&self) -> bool {
        self.faults.in_error()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `game` until the surface closes or a fault ends the run.
    ///
    /// Shutdown always happens before this returns, whatever the exit route.
    pub fn run<G>(&mut self, game: &mut G) -> RunReport
    where
        G: Game + ?Sized,
    {
        if self.lifecycle.state != LoopState::NotStarted {
            log::error!("{}", EngineError::AlreadyRan);
            return RunReport { outcome: RunOutcome::Aborted(EngineError::AlreadyRan), frames: 0, recovery: None };
        }

        log::info!(
            "gloam {} starting on {}/{}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.run_inner(game))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let fault = Fault::from_panic(CallSite::Framework, payload);
                log::error!("engine panicked: {fault}");
                self.handle_fault(fault, game)
            }
        };

        self.shutdown();

        RunReport { outcome, frames: self.frames, recovery: self.recovery }
    }

    fn run_inner<G>(&mut self, game: &mut G) -> RunOutcome
    where
        G: Game + ?Sized,
    {
        self.lifecycle.enter(LoopState::Initializing);

        if let Err(err) = self.subsystems.initialize(&mut self.platform, SubsystemFlags::all()) {
            log::error!("{err}");
            return RunOutcome::Aborted(err);
        }
        self.faults.set_input_initialized(self.subsystems.is_active(SubsystemFlags::EVENTS));

        if let Err(err) = self.apply_config() {
            log::error!("{err}");
            return RunOutcome::Aborted(err);
        }

        let loaded = {
            let mut ctx = Ctx::new(&mut self.platform, self.clock.stats());
            guard(CallSite::Load, || game.load(&mut ctx))
        };
        if let Err(fault) = loaded {
            return self.handle_fault(fault, game);
        }

        if !self.platform.is_open() {
            log::info!("surface closed during load");
            return RunOutcome::Closed;
        }

        self.clock.start(self.platform.now());
        self.lifecycle.enter(LoopState::Running);
        log::info!("running {}", game.name());

        match self.main_loop(game) {
            Some(fault) => self.handle_fault(fault, game),
            None => RunOutcome::Closed,
        }
    }

    /// Applies the startup configuration. Only surface creation is fatal.
    fn apply_config(&mut self) -> Result<(), EngineError> {
        let window = &self.config.window;
        let platform = &mut self.platform;

        platform.set_mode(&window.surface_mode()).map_err(EngineError::Configuration)?;
        platform.set_title(window.title_or_default());

        if window.fullscreen {
            if let Err(err) = platform.set_fullscreen(true, window.fullscreen_type) {
                log::warn!("could not enter fullscreen: {err}");
            }
        }

        if platform.has_renderer() {
            if let Err(err) = platform.set_vsync(window.vsync) {
                log::warn!("could not set vsync: {err}");
            }
        }

        if let Some((x, y)) = window.position() {
            if let Err(err) = platform.set_position(x, y) {
                log::warn!("could not position window: {err}");
            }
        }

        if let Some(icon) = window.resolved_icon() {
            if let Err(err) = platform.set_icon(&icon) {
                log::warn!("could not set icon {}: {err}", icon.display());
            }
        }

        Ok(())
    }

    /// Runs frames until the surface closes. Returns the fault that stopped the loop, if any.
    fn main_loop<G>(&mut self, game: &mut G) -> Option<Fault>
    where
        G: Game + ?Sized,
    {
        let Self { platform, clock, pump, frames, .. } = self;
        let mut failure: Option<Fault> = None;

        run_frames(platform, |platform| {
            let dt = clock.step(platform.now());
            *frames += 1;
            let timer = clock.stats();

            pump.drain(platform, |platform, event| {
                let mut ctx = Ctx::new(platform, timer);
                match dispatch_to_game(game, &mut ctx, event) {
                    Ok(()) => Drain::Continue,
                    Err(fault) => {
                        failure = Some(fault);
                        Drain::Stop
                    }
                }
            });

            if failure.is_some() || !platform.is_open() {
                return LoopControl::Break;
            }

            let mut ctx = Ctx::new(&mut *platform, timer);
            if let Err(fault) = guard(CallSite::Update, || game.update(&mut ctx, dt)) {
                failure = Some(fault);
                return LoopControl::Break;
            }
            if !ctx.is_open() {
                return LoopControl::Break;
            }

            ctx.clear(Color::BLACK);
            if let Err(fault) = guard(CallSite::Draw, || game.draw(&mut ctx)) {
                failure = Some(fault);
                return LoopControl::Break;
            }

            if platform.is_open() {
                if let Err(err) = platform.present() {
                    log::warn!("present failed, frame skipped: {err}");
                }
            }
            LoopControl::Continue
        });

        failure
    }

    fn handle_fault<G>(&mut self, fault: Fault, game: &mut G) -> RunOutcome
    where
        G: Game + ?Sized,
    {
        self.lifecycle.enter(LoopState::Faulted);

        let recovery = self.faults.recover(
            &fault,
            game,
            &mut self.platform,
            &mut self.pump,
            self.clock.stats(),
        );
        if self.recovery.is_none() {
            self.recovery = Some(recovery);
        }

        match self.faults.first_fault() {
            Some(first) => RunOutcome::Faulted(first.clone()),
            None => RunOutcome::Faulted(fault),
        }
    }

    fn shutdown(&mut self) {
        self.lifecycle.enter(LoopState::ShuttingDown);

        let platform = &mut self.platform;
        let subsystems = &mut self.subsystems;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            if platform.is_open() {
                platform.close();
            }
            subsystems.shutdown(platform);
        }));
        if result.is_err() {
            log::error!("panic during shutdown");
        }

        self.lifecycle.enter(LoopState::Stopped);
        log::info!("engine stopped after {} frames", self.frames);
    }
}

impl<P: Platform + std::fmt::Debug> std::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.lifecycle.state)
            .field("frames", &self.frames)
            .field("in_error", &self.faults.in_error())
            .field("platform", &self.platform)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameResult;
    use crate::platform::HeadlessPlatform;

    struct Quiet;

    impl Game for Quiet {
        fn load(&mut self, _: &mut Ctx<'_>) -> GameResult { Ok(()) }
        fn update(&mut self, ctx: &mut Ctx<'_>, _: f64) -> GameResult {
            if ctx.timer().frame_index >= 2 {
                ctx.close();
            }
            Ok(())
        }
        fn draw(&mut self, _: &mut Ctx<'_>) -> GameResult { Ok(()) }
    }

    #[test]
    fn clean_run_walks_the_happy_path() {
        let mut engine = Engine::new(EngineConfig::default(), HeadlessPlatform::new());
        let report = engine.run(&mut Quiet);

        assert!(report.is_clean());
        assert_eq!(report.frames, 2);
        assert_eq!(
            engine.transitions(),
            &[
                LoopState::NotStarted,
                LoopState::Initializing,
                LoopState::Running,
                LoopState::ShuttingDown,
                LoopState::Stopped,
            ]
        );
        assert_eq!(engine.platform().presents(), 1);
    }

    #[test]
    fn second_run_is_rejected() {
        let mut engine = Engine::new(EngineConfig::default(), HeadlessPlatform::new());
        engine.run(&mut Quiet);
        let report = engine.run(&mut Quiet);
        assert!(matches!(report.outcome, RunOutcome::Aborted(EngineError::AlreadyRan)));
        assert_eq!(engine.state(), LoopState::Stopped);
    }

    #[test]
    fn lifecycle_ignores_repeated_state() {
        let mut lc = Lifecycle::new();
        lc.enter(LoopState::Initializing);
        lc.enter(LoopState::Running);
        lc.enter(LoopState::Running);
        assert_eq!(lc.history.len(), 3);
    }
}
