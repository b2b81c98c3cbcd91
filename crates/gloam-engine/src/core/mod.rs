//! Game-facing contracts and the run orchestrator.
//!
//! - [`Game`] and its optional capabilities are what user code implements
//! - [`Engine`] drives a game through startup, the frame loop and shutdown
//! - [`guard`] and [`FaultController`] contain failures raised by game callbacks

mod ctx;
mod diagnostic;
mod engine;
mod fault;
mod frame_loop;
mod game;

pub use ctx::Ctx;
pub use engine::{Engine, LoopState, RunOutcome, RunReport};
pub use fault::{guard, CallSite, ErrorContext, Fault, FaultController, FaultKind, Recovery};
pub use frame_loop::{run_frames, LoopControl};
pub use game::{FaultHandler, Game, GameResult, KeyboardHandler, MouseHandler, WindowHandler};
