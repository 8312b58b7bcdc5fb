use thiserror::Error;

use crate::types::UniformType;

/// Failures surfaced by the playground.
///
/// Every failure is synchronous and reported to the immediate caller; there
/// is no internal retry. Compile and link failures leave the previously
/// active program (if any) in place.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// No usable acceleration context could be acquired. Fatal at
    /// construction.
    #[error("no graphics environment available: {0}")]
    EnvironmentUnavailable(String),

    /// The fragment source was rejected by the shader compiler. The log
    /// carries the compiler diagnostic verbatim.
    #[error("can not compile fragment shader source [{log}]")]
    CompileFailure { log: String },

    /// The program failed to link after the fragment stage compiled.
    #[error("can not link shader program [{log}]")]
    LinkFailure { log: String },

    /// `render()` or `set_uniform()` was invoked before any `set_source()`
    /// call succeeded.
    #[error("no active shader program; call set_source() first")]
    NoProgram,

    /// The named uniform does not exist in the active program.
    #[error("unknown uniform `{0}` in the active program")]
    UniformNotFound(String),

    /// The supplied value tag does not match the uniform's declared type.
    #[error("uniform `{name}` is declared `{declared}` but a `{supplied}` value was supplied")]
    UniformTypeMismatch {
        name: String,
        declared: UniformType,
        supplied: UniformType,
    },

    /// Frame acquisition failed; the embedder decides the recovery policy.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
