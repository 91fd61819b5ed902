use thiserror::Error;

/// Failure taxonomy for effect realization and program compilation.
///
/// Every variant is returned to the immediate caller; nothing here is
/// retried automatically. Retrying after a context reset is the
/// surrounding renderer's responsibility.
#[derive(Debug, Error)]
pub enum EffectError {
    /// A stored or supplied transform is singular and cannot be
    /// inverted. The draw must be skipped.
    #[error("transform is singular and cannot be inverted")]
    InvalidTransform,

    /// No GPU adapter or device is available. The caller must fall
    /// back to a non-GPU compositing path.
    #[error("no GPU device context available: {0}")]
    NoDeviceContext(String),

    /// The backend rejected generated shader source. Fatal for the
    /// draw; the backend diagnostics are preserved verbatim.
    #[error("shader compilation failed: {diagnostics}")]
    ShaderCompile { diagnostics: String },
}
