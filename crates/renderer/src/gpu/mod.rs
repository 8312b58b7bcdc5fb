//! GPU orchestration for the playground.
//!
//! - `context` owns the wgpu instance/device/queue and the drawable target
//!   (window swapchain or headless texture), and reapplies the viewport on
//!   every resize.
//! - `pipeline` holds the fixed vertex stage and the quad position buffer,
//!   and links user fragment sources into render pipelines.
//! - `uniforms` mirrors the injected uniform blocks and encodes std140
//!   values for the generic setter.
//! - `clock` latches the render start timestamp and reports elapsed seconds.
//! - `state` glues everything together behind the `Playground` facade.

mod clock;
mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use context::GpuContext;
pub(crate) use state::GpuState;
