//! CPU-side model of the plasma fragment effect.
//!
//! A [`PlasmaConfig`] describes a tileable procedural effect: the tile
//! dimensions that normalize geometry into noise space and an optional
//! local transform. Realizing a config against a [`Paint`] and an
//! [`AnimationClock`] composes the coordinate transform and yields an
//! immutable [`PlasmaEffect`] the GPU layer can key, deduplicate, and
//! draw:
//!
//! ```text
//!   PlasmaConfig ──realize(paint, external, clock)──▶ PlasmaEffect
//!        │                                               │ program_key()
//!        │ serde / effect.toml                           ▼
//!        ▼                                        ProgramCache (renderer)
//!   persisted config (no animation phase)
//! ```
//!
//! The crate is deliberately GPU-free: the renderer crate reaches back
//! through the [`UniformBinder`] capability trait, so the effect's
//! uniform contract (`alpha` normalized to `[0, 1]`, `time` verbatim)
//! can be exercised without a device.

mod binder;
mod config;
mod effect;
mod error;
mod manifest;

pub use binder::{UniformBinder, UniformHandle};
pub use config::{AnimationClock, Paint, PlasmaConfig, PHASE_STEP};
pub use effect::{ConstantColor, PlasmaEffect, ProgramKey, ProgramUniforms};
pub use error::EffectError;
pub use manifest::{EffectManifest, ManifestError};
