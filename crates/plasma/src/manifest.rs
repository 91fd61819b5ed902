//! On-disk manifest (`effect.toml`) describing a plasma effect: tile
//! dimensions, an optional affine transform given as six coefficients,
//! and the paint color. `EffectManifest::validate` returns
//! human-readable issues so callers can surface misconfigurations
//! without panicking; `config`/`paint` convert a validated manifest
//! into the runtime types.

use std::fs;
use std::path::{Path, PathBuf};

use kurbo::Affine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Paint, PlasmaConfig};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at {0}")]
    Missing(PathBuf),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("manifest validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EffectManifest {
    #[serde(default)]
    pub name: Option<String>,
    /// Tile dimensions `[width, height]` in user-space units.
    pub tile: [f64; 2],
    /// Local transform coefficients `[a, b, c, d, e, f]` mapping
    /// `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`; identity when
    /// omitted.
    #[serde(default)]
    pub transform: Option<[f64; 6]>,
    /// Paint color as RGBA bytes.
    #[serde(default = "default_color")]
    pub color: [u8; 4],
    #[serde(default)]
    pub description: Option<String>,
}

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl EffectManifest {
    /// Reads and validates `effect.toml` at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ManifestError::Missing(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let manifest: Self = toml::from_str(&raw)?;
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(ManifestError::Validation(issues));
        }
        tracing::debug!(path = %path.display(), name = ?manifest.name, "loaded effect manifest");
        Ok(manifest)
    }

    /// Collects every problem with the manifest instead of stopping at
    /// the first, so callers can report all of them at once.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.tile[0] == 0.0 || !self.tile[0].is_finite() {
            issues.push(format!("tile width must be non-zero and finite, got {}", self.tile[0]));
        }
        if self.tile[1] == 0.0 || !self.tile[1].is_finite() {
            issues.push(format!(
                "tile height must be non-zero and finite, got {}",
                self.tile[1]
            ));
        }
        if let Some(coeffs) = self.transform {
            let det = Affine::new(coeffs).determinant();
            if det == 0.0 || !det.is_finite() {
                issues.push("transform is singular and cannot be inverted".to_string());
            }
        }
        issues
    }

    pub fn config(&self) -> PlasmaConfig {
        let mut config = PlasmaConfig::new(self.tile[0], self.tile[1]);
        if let Some(coeffs) = self.transform {
            config = config.with_local_transform(Affine::new(coeffs));
        }
        config
    }

    pub fn paint(&self) -> Paint {
        Paint::new(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("effect.toml");
        let mut file = fs::File::create(&path).expect("create manifest");
        file.write_all(contents.as_bytes()).expect("write manifest");
        (dir, path)
    }

    #[test]
    fn loads_minimal_manifest() {
        let (_dir, path) = write_manifest("tile = [100.0, 100.0]\n");
        let manifest = EffectManifest::load(&path).expect("load");
        assert_eq!(manifest.tile, [100.0, 100.0]);
        assert_eq!(manifest.color, [255, 255, 255, 255]);
        assert_eq!(manifest.config().local_transform, Affine::IDENTITY);
    }

    #[test]
    fn loads_transform_and_color() {
        let (_dir, path) = write_manifest(
            "name = \"demo\"\ntile = [64.0, 32.0]\ntransform = [1.0, 0.0, 0.0, 1.0, 50.0, 50.0]\ncolor = [255, 0, 0, 128]\n",
        );
        let manifest = EffectManifest::load(&path).expect("load");
        assert_eq!(manifest.paint().alpha(), 128);
        assert_eq!(
            manifest.config().local_transform,
            Affine::translate((50.0, 50.0))
        );
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = EffectManifest::load(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ManifestError::Missing(_))));
    }

    #[test]
    fn zero_tile_axis_fails_validation() {
        let (_dir, path) = write_manifest("tile = [0.0, 100.0]\n");
        match EffectManifest::load(&path) {
            Err(ManifestError::Validation(issues)) => {
                assert!(issues[0].contains("tile width"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn singular_transform_fails_validation() {
        let (_dir, path) = write_manifest(
            "tile = [100.0, 100.0]\ntransform = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0]\n",
        );
        match EffectManifest::load(&path) {
            Err(ManifestError::Validation(issues)) => {
                assert!(issues[0].contains("singular"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
