//! GPU device + surface management for the desktop collaborator.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for a window
//! - configuring the Surface (swapchain) and switching present modes for vsync
//! - clearing and presenting a frame

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuInit, SurfaceErrorAction};
