//! Default fault fallback: log, then show a plain diagnostic screen until dismissed.

use std::time::Duration;

use crate::event::{Drain, Event, EventPump};
use crate::input::Key;
use crate::paint::Color;
use crate::platform::{Platform, SurfaceMode};

use super::fault::{Fault, Recovery};
use super::frame_loop::{run_frames, LoopControl};

const FRAME_SLEEP: Duration = Duration::from_millis(10);

pub(crate) fn log_fault(fault: &Fault) {
    log::error!("{} in {}: {}", fault.kind(), fault.site(), fault.message());
    if !fault.detail().is_empty() && fault.detail() != fault.message() {
        log::error!("{}", fault.detail());
    }
}

pub(crate) fn run_fallback(
    fault: &Fault,
    game_name: &str,
    platform: &mut dyn Platform,
    pump: &mut EventPump,
    input_initialized: bool,
) -> Recovery {
    log_fault(fault);

    let mut can_draw = ensure_surface(platform);

    if input_initialized && !reset_input_modes(platform) {
        can_draw = false;
    }

    if !can_draw {
        log::error!("no drawable surface; diagnostic is console-only");
        return Recovery::ConsoleOnly;
    }

    platform.set_title(&format!("Error - {game_name}"));
    let frames = show(fault, platform, pump);
    log::debug!("diagnostic screen closed after {frames} frames");
    Recovery::DiagnosticDisplayed
}

/// Returns whether an open surface with a renderer is available afterwards.
fn ensure_surface(platform: &mut dyn Platform) -> bool {
    if platform.is_open() && platform.has_renderer() {
        return true;
    }

    if let Err(err) = platform.set_mode(&SurfaceMode::FALLBACK) {
        log::warn!("could not create a diagnostic surface: {err}");
        return false;
    }
    platform.has_renderer()
}

/// Releases the pointer so the user can interact with the diagnostic screen.
fn reset_input_modes(platform: &mut dyn Platform) -> bool {
    let result = platform
        .set_pointer_visible(true)
        .and_then(|()| platform.set_pointer_grabbed(false))
        .and_then(|()| platform.set_relative_mode(false));

    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("failed to reset input modes: {err}");
            false
        }
    }
}

fn show(fault: &Fault, platform: &mut dyn Platform, pump: &mut EventPump) -> u64 {
    let report = fault.report();

    run_frames(platform, |platform| {
        pump.drain(platform, |platform, event| {
            match event {
                Event::Quit => {}
                Event::KeyDown { key: Key::Escape, .. } => platform.close(),
                Event::KeyDown { key: Key::C, modifiers, .. } if modifiers.command() => {
                    match platform.set_clipboard_text(&report) {
                        Ok(()) => log::info!("diagnostic copied to clipboard"),
                        Err(err) => log::warn!("failed to copy diagnostic: {err}"),
                    }
                }
                _ => {}
            }
            Drain::Continue
        });

        if !platform.is_open() {
            return LoopControl::Break;
        }

        platform.clear(Color::DIAGNOSTIC);
        if let Err(err) = platform.present() {
            log::warn!("diagnostic present failed: {err}");
        }
        platform.sleep(FRAME_SLEEP);
        LoopControl::Continue
    })
}
