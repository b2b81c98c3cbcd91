//! Event pump adapter.
//!
//! Collaborators deliver typed [`Event`]s one at a time through
//! [`Platform::poll_event`](crate::platform::Platform::poll_event). The pump drains
//! every queued event per frame and hands each one to a per-loop sink; the main
//! loop's sink routes them into the game's capability set.

mod dispatch;
mod pump;
mod types;

pub(crate) use dispatch::dispatch_to_game;
pub use pump::{Drain, EventPump};
pub use types::{Event, MouseButtonEvent};
