//! Renderer crate for shaderquad, a minimal fragment-shader playground.
//!
//! The crate compiles a user-supplied GLSL fragment shader against a fixed
//! full-screen quad vertex stage and drives a per-frame render loop that
//! feeds the shader a small set of standard uniforms. The overall flow is:
//!
//! ```text
//!   embedder / CLI
//!        │ PlaygroundOptions
//!        ▼
//!   Playground::new ──▶ GpuContext (surface + device) ──▶ GpuState
//!        │                                                  │
//!        ├─ set_source() ──▶ wrap + compile + link ─────────┤
//!        └─ render() ──▶ uniforms ─▶ clear ─▶ quad strip ─▶ present
//! ```
//!
//! The fragment shader sees four standard uniforms by fixed name:
//! `uResolution` (vec2, surface pixels), `uTime` (float, seconds since the
//! first frame), `uMousePosition` (vec2, pixels with a bottom-left origin),
//! and `uMousePressed` (int, 0/1). Custom uniforms declared in the source
//! can be written through [`Playground::set_uniform`].
//!
//! Frame scheduling is the embedder's job: `render()` draws exactly one
//! frame and is expected to be invoked once per display refresh.

mod compile;
mod error;
mod gpu;
mod input;
mod types;

use std::time::Instant;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use gpu::{GpuContext, GpuState};

pub use error::PlaygroundError;
pub use input::{PointerFeed, PointerSample, PointerTracker};
pub use types::{PlaygroundOptions, SurfaceExtent, UniformType, UniformValue};

/// A fragment-shader playground bound to one drawable surface.
///
/// Construction acquires the acceleration context and builds the fixed
/// vertex stage; supplying fragment source (at construction or later via
/// [`Playground::set_source`]) links the program; [`Playground::render`]
/// draws one frame and may be called repeatedly.
pub struct Playground {
    state: GpuState,
}

impl Playground {
    /// Builds a playground rendering into the given window target.
    ///
    /// The target must stay alive for as long as the playground; the surface
    /// is created from its raw window handles.
    pub fn new<T>(target: &T, options: PlaygroundOptions) -> Result<Self, PlaygroundError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, options.extent())?;
        Self::from_context(context, options)
    }

    /// Builds a playground rendering into an offscreen texture.
    ///
    /// Useful for embedding and testing without a windowing system.
    pub fn headless(options: PlaygroundOptions) -> Result<Self, PlaygroundError> {
        let context = GpuContext::headless(options.extent())?;
        Self::from_context(context, options)
    }

    fn from_context(
        context: GpuContext,
        options: PlaygroundOptions,
    ) -> Result<Self, PlaygroundError> {
        let mut state = GpuState::new(context)?;
        if let Some(source) = &options.source {
            state.set_source(source)?;
        }
        Ok(Self { state })
    }

    /// Current surface dimensions (and thereby the viewport).
    pub fn surface(&self) -> SurfaceExtent {
        self.state.extent()
    }

    /// Read-only handle to the underlying device.
    pub fn device(&self) -> &wgpu::Device {
        self.state.device()
    }

    /// Read-only handle to the submission queue.
    pub fn queue(&self) -> &wgpu::Queue {
        self.state.queue()
    }

    /// Resizes the surface; the viewport follows.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.state.set_size(width, height);
    }

    /// Resizes the surface width only; height is untouched.
    pub fn set_width(&mut self, width: u32) {
        self.state.set_width(width);
    }

    /// Resizes the surface height only; width is untouched.
    pub fn set_height(&mut self, height: u32) {
        self.state.set_height(height);
    }

    /// Compiles and links new fragment source, superseding the active
    /// program on success. On failure the previous program (if any) stays
    /// active and the compiler or linker diagnostic is returned.
    pub fn set_source(&mut self, source: &str) -> Result<(), PlaygroundError> {
        self.state.set_source(source)
    }

    /// Sets the clear color applied ahead of each draw.
    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.state.set_clear_color(r, g, b, a);
    }

    /// Writes a custom uniform declared in the active fragment program.
    ///
    /// The value tag must match the declared type; values persist until the
    /// program is replaced by another `set_source` call.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), PlaygroundError> {
        self.state.set_uniform(name, &value)
    }

    /// Draws one frame.
    ///
    /// Fails with [`PlaygroundError::NoProgram`] until a `set_source` call
    /// has succeeded.
    pub fn render(&mut self) -> Result<(), PlaygroundError> {
        self.state.render(Instant::now())
    }

    /// Sender half of the pointer channel; clone it into the event loop.
    pub fn pointer_feed(&self) -> PointerFeed {
        self.state.pointer_feed()
    }
}
