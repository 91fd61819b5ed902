//! GPU side of the plasma effect pipeline.
//!
//! The crate turns a realized [`plasma::PlasmaEffect`] into pixels:
//!
//! ```text
//!   PlasmaEffect ─ program_key() ─▶ ProgramCache ─ miss ─▶ program::*_source()
//!        │                              │                        │ GLSL
//!        │ upload_uniforms()            │ hit                    ▼
//!        ▼                              ▼                  GpuContext::compile_*
//!   UniformBlock (std140) ────────▶ EffectPipeline ──▶ offscreen pass ──▶ RGBA8
//! ```
//!
//! Program source is a pure function of nothing: every effect instance
//! compiles to byte-identical GLSL, and per-draw state (coordinate
//! transform, input color, alpha, time) travels through the uniform
//! block instead. Shader compilation failures surface as
//! [`plasma::EffectError::ShaderCompile`] with the backend diagnostics
//! attached; they are never silently swallowed.
//!
//! Everything here is single-threaded per [`GpuContext`]: the cache,
//! the pipeline, and the command stream all live on the thread that
//! owns the device.

mod cache;
mod context;
mod pipeline;
pub mod program;
mod uniforms;

pub use cache::ProgramCache;
pub use context::GpuContext;
pub use pipeline::{EffectPipeline, TARGET_FORMAT};
pub use uniforms::{PlasmaUniforms, UniformBlock};
