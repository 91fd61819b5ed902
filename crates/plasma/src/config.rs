use kurbo::Affine;
use serde::{Deserialize, Serialize};

use crate::effect::PlasmaEffect;
use crate::error::EffectError;

/// Phase increment applied to an [`AnimationClock`] per realization.
pub const PHASE_STEP: f32 = 0.1;

/// Paint state sampled once per realization. The effect reads the
/// alpha channel for its program key; the full color feeds the
/// fragment program's input color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paint {
    color: [u8; 4],
}

impl Paint {
    /// Creates a paint from an RGBA color with 8-bit channels.
    pub fn new(color: [u8; 4]) -> Self {
        Self { color }
    }

    /// Opaque white, the default paint for standalone rendering.
    pub fn opaque() -> Self {
        Self::new([255, 255, 255, 255])
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    pub fn alpha(&self) -> u8 {
        self.color[3]
    }

    /// Premultiplied RGBA in `[0, 1]`, as seen by the fragment program
    /// as its upstream input color.
    pub fn input_color(&self) -> [f32; 4] {
        let alpha = f32::from(self.color[3]) / 255.0;
        [
            f32::from(self.color[0]) / 255.0 * alpha,
            f32::from(self.color[1]) / 255.0 * alpha,
            f32::from(self.color[2]) / 255.0 * alpha,
            alpha,
        ]
    }
}

/// Owns the evolving plasma phase. Advances by [`PHASE_STEP`] on every
/// successful realization, so realization is not idempotent: realizing
/// the same config twice for one logical draw (per tile, per batch)
/// advances the animation twice.
///
/// Not thread-safe. Concurrent realization against a shared clock is a
/// data race; callers sharing a clock across threads must serialize
/// access themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationClock {
    phase: f32,
}

impl AnimationClock {
    /// Fresh clock starting at phase `0.0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from a previously observed phase.
    pub fn from_phase(phase: f32) -> Self {
        Self { phase }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Returns the current phase and steps forward by [`PHASE_STEP`].
    pub fn advance(&mut self) -> f32 {
        let phase = self.phase;
        self.phase += PHASE_STEP;
        phase
    }
}

/// Immutable description of a tileable plasma effect: the tile extent
/// that normalizes geometry into noise space plus an optional local
/// transform mapping user space into tile space.
///
/// The animation phase is deliberately not part of the config, so
/// serialized configs never carry it; a deserialized config animates
/// from whatever [`AnimationClock`] the caller supplies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlasmaConfig {
    pub tile_width: f64,
    pub tile_height: f64,
    #[serde(default = "identity_transform")]
    pub local_transform: Affine,
}

fn identity_transform() -> Affine {
    Affine::IDENTITY
}

impl PlasmaConfig {
    /// Config with an identity local transform. Tile dimensions must be
    /// non-zero on both axes; zero axes surface as
    /// [`EffectError::InvalidTransform`] at realization.
    pub fn new(tile_width: f64, tile_height: f64) -> Self {
        Self {
            tile_width,
            tile_height,
            local_transform: Affine::IDENTITY,
        }
    }

    pub fn with_local_transform(mut self, transform: Affine) -> Self {
        self.local_transform = transform;
        self
    }

    /// Realizes the config into a drawable [`PlasmaEffect`] for the
    /// current paint and transform state.
    ///
    /// Composes `tile_scale * inverse(external) * inverse(local)` so a
    /// geometry-local point is first mapped back out of the caller's
    /// paint-local spaces and then normalized by the tile extent. On
    /// success the clock steps forward by [`PHASE_STEP`]; on failure
    /// the clock is untouched and no effect is constructed.
    pub fn realize(
        &self,
        paint: &Paint,
        external_transform: Option<Affine>,
        clock: &mut AnimationClock,
    ) -> Result<PlasmaEffect, EffectError> {
        if self.tile_width == 0.0 || self.tile_height == 0.0 {
            return Err(EffectError::InvalidTransform);
        }
        let tile_scale = Affine::scale_non_uniform(1.0 / self.tile_width, 1.0 / self.tile_height);

        let mut inverse = invert(self.local_transform)?;
        if let Some(external) = external_transform {
            inverse = invert(external)? * inverse;
        }
        let coord_transform = tile_scale * inverse;

        let effect = PlasmaEffect::new(coord_transform, paint.alpha(), clock.phase());
        clock.advance();
        Ok(effect)
    }
}

fn invert(transform: Affine) -> Result<Affine, EffectError> {
    let det = transform.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(EffectError::InvalidTransform);
    }
    Ok(transform.inverse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn composed_transform_undoes_external_translation() {
        let config = PlasmaConfig::new(100.0, 100.0);
        let mut clock = AnimationClock::new();
        let effect = config
            .realize(
                &Paint::opaque(),
                Some(Affine::translate((50.0, 50.0))),
                &mut clock,
            )
            .expect("realize should succeed");

        let mapped = effect.coord_transform() * Point::new(50.0, 50.0);
        assert!(mapped.x.abs() < 1e-12 && mapped.y.abs() < 1e-12);
    }

    #[test]
    fn tile_extent_normalizes_coordinates() {
        let config = PlasmaConfig::new(100.0, 50.0);
        let mut clock = AnimationClock::new();
        let effect = config
            .realize(&Paint::opaque(), None, &mut clock)
            .expect("realize should succeed");

        let mapped = effect.coord_transform() * Point::new(100.0, 50.0);
        assert!((mapped.x - 1.0).abs() < 1e-12);
        assert!((mapped.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clock_advances_by_step_per_realization() {
        let config = PlasmaConfig::new(100.0, 100.0);
        let mut clock = AnimationClock::new();
        for _ in 0..5 {
            config
                .realize(&Paint::opaque(), None, &mut clock)
                .expect("realize should succeed");
        }
        assert!((clock.phase() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn effect_captures_phase_before_advancing() {
        let config = PlasmaConfig::new(100.0, 100.0);
        let mut clock = AnimationClock::from_phase(1.5);
        let effect = config
            .realize(&Paint::opaque(), None, &mut clock)
            .expect("realize should succeed");
        assert_eq!(effect.time(), 1.5);
        assert!((clock.phase() - 1.6).abs() < 1e-6);
    }

    #[test]
    fn singular_local_transform_is_rejected() {
        let config = PlasmaConfig::new(100.0, 100.0)
            .with_local_transform(Affine::scale_non_uniform(0.0, 1.0));
        let mut clock = AnimationClock::new();
        let result = config.realize(&Paint::opaque(), None, &mut clock);
        assert!(matches!(result, Err(EffectError::InvalidTransform)));
        assert_eq!(clock.phase(), 0.0, "failed realization must not advance the clock");
    }

    #[test]
    fn singular_external_transform_is_rejected() {
        let config = PlasmaConfig::new(100.0, 100.0);
        let mut clock = AnimationClock::new();
        let result = config.realize(
            &Paint::opaque(),
            Some(Affine::scale(0.0)),
            &mut clock,
        );
        assert!(matches!(result, Err(EffectError::InvalidTransform)));
        assert_eq!(clock.phase(), 0.0);
    }

    #[test]
    fn zero_tile_axis_is_rejected() {
        let config = PlasmaConfig::new(0.0, 100.0);
        let mut clock = AnimationClock::new();
        let result = config.realize(&Paint::opaque(), None, &mut clock);
        assert!(matches!(result, Err(EffectError::InvalidTransform)));
    }

    #[test]
    fn config_round_trips_without_animation_state() {
        let config = PlasmaConfig::new(128.0, 64.0)
            .with_local_transform(Affine::translate((3.0, -4.0)));
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("phase"), "animation state must not be persisted");
        let restored: PlasmaConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, config);
    }

    #[test]
    fn paint_input_color_is_premultiplied() {
        let paint = Paint::new([255, 0, 255, 128]);
        let [r, g, b, a] = paint.input_color();
        assert!((a - 128.0 / 255.0).abs() < 1e-6);
        assert!((r - a).abs() < 1e-6);
        assert_eq!(g, 0.0);
        assert!((b - a).abs() < 1e-6);
    }
}
