use kurbo::Affine;

use crate::binder::{UniformBinder, UniformHandle};

/// Program-cache key for compiled plasma programs.
///
/// Derived solely from the paint alpha: the generated fragment source
/// is identical for every effect instance, so alpha is retained only
/// for parity with the cache's keying scheme. Any future parameter
/// that affects emitted source must be folded in here, or the cache
/// will hand back stale programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramKey(u8);

impl ProgramKey {
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Constant-color report consumed by upstream constant-folding
/// optimizers. A zero `valid_mask` means no output channel is a
/// compile-time constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantColor {
    pub color: Option<[f32; 4]>,
    pub valid_mask: u32,
}

/// Handles for the two scalar uniforms a compiled plasma program
/// declares, as returned by the program generator.
#[derive(Clone, Copy, Debug)]
pub struct ProgramUniforms {
    pub alpha: UniformHandle,
    pub time: UniformHandle,
}

/// Per-draw resolved effect: the fully composed transform from
/// geometry-local coordinates into normalized tile space, the paint
/// alpha at realization, and the captured animation phase.
///
/// Immutable once constructed. A draw with a different alpha or
/// transform needs a new effect; `time` is excluded from identity and
/// is uploaded per draw instead.
#[derive(Clone, Copy, Debug)]
pub struct PlasmaEffect {
    coord_transform: Affine,
    alpha: u8,
    time: f32,
}

impl PlasmaEffect {
    pub fn new(coord_transform: Affine, alpha: u8, time: f32) -> Self {
        Self {
            coord_transform,
            alpha,
            time,
        }
    }

    pub fn coord_transform(&self) -> Affine {
        self.coord_transform
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn program_key(&self) -> ProgramKey {
        ProgramKey(self.alpha)
    }

    /// Pushes the per-draw uniform values: `alpha` normalized to
    /// `[0, 1]` and `time` verbatim. Call once per draw, after program
    /// binding, before issuing the draw command.
    pub fn upload_uniforms(&self, binder: &mut dyn UniformBinder, uniforms: &ProgramUniforms) {
        binder.set_float(uniforms.alpha, f32::from(self.alpha) / 255.0);
        binder.set_float(uniforms.time, self.time);
    }

    /// This is noise; nothing is constant.
    pub fn constant_color_components(&self) -> ConstantColor {
        ConstantColor {
            color: None,
            valid_mask: 0,
        }
    }
}

/// Identity is exact equality of the paint alpha and of every
/// coordinate-transform coefficient. Equal effects may share one
/// compiled program instance.
impl PartialEq for PlasmaEffect {
    fn eq(&self, other: &Self) -> bool {
        self.alpha == other.alpha
            && self.coord_transform.as_coeffs() == other.coord_transform.as_coeffs()
    }
}
