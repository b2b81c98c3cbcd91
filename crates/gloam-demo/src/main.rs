use std::path::Path;
use std::process::ExitCode;

use gloam_engine::config::EngineConfig;
use gloam_engine::core::{Ctx, Engine, Game, GameResult, KeyboardHandler, MouseHandler, RunOutcome, WindowHandler};
use gloam_engine::input::{Key, MouseButton, Scancode};
use gloam_engine::logging::init_logging;
use gloam_engine::paint::Color;
use gloam_engine::platform::{FullscreenType, WinitPlatform};

/// Background slowly cycles through hues; clicks shift the phase.
///
/// Keys: Escape quits, F toggles fullscreen, E raises an error and P panics
/// (both end in the diagnostic screen).
#[derive(Default)]
struct Pulse {
    phase: f64,
    fullscreen: bool,
    clicks: u32,
}

impl Pulse {
    fn background(&self) -> Color {
        let t = self.phase * std::f64::consts::TAU;
        let channel = |offset: f64| (0.35 + 0.25 * (t + offset).sin()) as f32;
        Color::rgba(channel(0.0), channel(2.1), channel(4.2), 1.0)
    }
}

impl Game for Pulse {
    fn name(&self) -> &str {
        "Pulse"
    }

    fn load(&mut self, ctx: &mut Ctx<'_>) -> GameResult {
        log::info!("pulse loaded; Escape quits, F toggles fullscreen, E/P trigger a fault");
        ctx.clear(self.background());
        Ok(())
    }

    fn update(&mut self, ctx: &mut Ctx<'_>, dt: f64) -> GameResult {
        self.phase = (self.phase + dt * 0.1).fract();

        let timer = ctx.timer();
        if timer.frame_index % 600 == 0 {
            log::info!("fps={} avg_dt_ms={:.2}", timer.fps, timer.average_delta * 1000.0);
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Ctx<'_>) -> GameResult {
        ctx.clear(self.background());
        Ok(())
    }

    fn keyboard(&mut self) -> Option<&mut dyn KeyboardHandler> {
        Some(self)
    }

    fn mouse(&mut self) -> Option<&mut dyn MouseHandler> {
        Some(self)
    }

    fn window_events(&mut self) -> Option<&mut dyn WindowHandler> {
        Some(self)
    }
}

impl KeyboardHandler for Pulse {
    fn key_pressed(&mut self, ctx: &mut Ctx<'_>, key: Key, _scancode: Scancode, is_repeat: bool) -> GameResult {
        if is_repeat {
            return Ok(());
        }

        match key {
            Key::Escape => ctx.close(),
            Key::F => {
                self.fullscreen = !self.fullscreen;
                if let Err(err) = ctx.platform().set_fullscreen(self.fullscreen, FullscreenType::Desktop) {
                    log::warn!("fullscreen toggle failed: {err}");
                    self.fullscreen = !self.fullscreen;
                }
            }
            Key::E => anyhow::bail!("requested error after {} clicks", self.clicks),
            Key::P => panic!("requested panic at phase {:.3}", self.phase),
            _ => {}
        }
        Ok(())
    }
}

impl MouseHandler for Pulse {
    fn mouse_pressed(
        &mut self,
        _ctx: &mut Ctx<'_>,
        x: i32,
        y: i32,
        button: MouseButton,
        is_touch: bool,
        clicks: u8,
    ) -> GameResult {
        self.clicks += 1;
        if button == MouseButton::Left {
            self.phase = (self.phase + 0.1 * clicks as f64).fract();
        }
        log::debug!("{button:?} x{clicks} at ({x}, {y}) touch={is_touch}");
        Ok(())
    }
}

impl WindowHandler for Pulse {
    fn file_dropped(&mut self, _ctx: &mut Ctx<'_>, path: &Path) -> GameResult {
        log::info!("dropped {}", path.display());
        Ok(())
    }

    fn resized(&mut self, _ctx: &mut Ctx<'_>, width: u32, height: u32) -> GameResult {
        log::debug!("resized to {width}x{height}");
        Ok(())
    }
}

/// Config path: first CLI argument, else the `gloam.toml` next to this crate.
fn config_path() -> String {
    std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/gloam.toml").to_string())
}

fn main() -> ExitCode {
    let path = config_path();
    let config = match EngineConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.logging.to_logging_config());
    match &config.source {
        Some(source) => log::info!("config loaded from {}", source.display()),
        None => log::info!("no config at {path}, using defaults"),
    }

    let mut engine = Engine::new(config, WinitPlatform::new());
    let report = engine.run(&mut Pulse::default());

    log::info!("ran {} frames", report.frames);
    match report.outcome {
        RunOutcome::Closed => ExitCode::SUCCESS,
        RunOutcome::Faulted(fault) => {
            log::error!("ended by {fault}");
            ExitCode::FAILURE
        }
        RunOutcome::Aborted(err) => {
            log::error!("could not start: {err}");
            ExitCode::FAILURE
        }
    }
}
