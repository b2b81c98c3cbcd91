//! Time subsystem.
//!
//! Provides testable frame timing without coupling to the runtime. The clock never
//! reads time itself: callers pass the collaborator's monotonic reading in, so tests
//! can drive it with exact timestamps.
//!
//! Intended usage:
//! - one `FrameClock` per loop
//! - call `start()` once before the first frame, then `step()` once per iteration

mod frame_clock;

pub use frame_clock::{FrameClock, TimerStats, MAX_DELTA_HISTORY};
