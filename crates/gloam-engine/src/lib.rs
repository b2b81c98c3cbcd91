//! Gloam engine crate.
//!
//! Runs a [`Game`](core::Game) through its lifecycle: subsystem startup, the frame
//! loop with timing and event dispatch, fault containment and shutdown. Windowing,
//! graphics and input come from a [`Platform`](platform::Platform) collaborator.

pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod event;
pub mod input;
pub mod logging;
pub mod paint;
pub mod platform;
pub mod time;

pub use crate::config::EngineConfig;
pub use crate::core::{Ctx, Engine, Game, GameResult};
pub use crate::error::EngineError;
