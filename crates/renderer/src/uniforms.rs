use bytemuck::{Pod, Zeroable};
use kurbo::Affine;
use plasma::{UniformBinder, UniformHandle};

/// std140 mirror of the `EffectParams` block in `program.rs`.
///
/// The affine coordinate transform is split over two vec4 rows:
/// `transform0 = [a, b, c, d]`, `transform1 = [e, f, 0, 0]`, matching
/// `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlasmaUniforms {
    pub resolution: [f32; 4],
    pub transform0: [f32; 4],
    pub transform1: [f32; 4],
    pub input_color: [f32; 4],
    pub alpha: f32,
    pub time: f32,
    pub padding: [f32; 2],
}

unsafe impl Zeroable for PlasmaUniforms {}
unsafe impl Pod for PlasmaUniforms {}

impl PlasmaUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            resolution: [width as f32, height as f32, 0.0, 0.0],
            transform0: [0.0; 4],
            transform1: [0.0; 4],
            input_color: [1.0, 1.0, 1.0, 1.0],
            alpha: 1.0,
            time: 0.0,
            padding: [0.0, 0.0],
        };
        uniforms.set_coord_transform(Affine::IDENTITY);
        uniforms
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution[0] = width;
        self.resolution[1] = height;
    }

    pub fn set_coord_transform(&mut self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        self.transform0 = [a as f32, b as f32, c as f32, d as f32];
        self.transform1 = [e as f32, f as f32, 0.0, 0.0];
    }

    pub fn set_input_color(&mut self, color: [f32; 4]) {
        self.input_color = color;
    }
}

/// Backend implementation of the [`UniformBinder`] capability: routes
/// declared scalar uniforms into their std140 slots by name.
#[derive(Debug)]
pub struct UniformBlock {
    values: PlasmaUniforms,
    slots: Vec<&'static str>,
}

impl UniformBlock {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            values: PlasmaUniforms::new(width, height),
            slots: Vec::new(),
        }
    }

    pub fn values(&self) -> &PlasmaUniforms {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut PlasmaUniforms {
        &mut self.values
    }
}

impl UniformBinder for UniformBlock {
    fn declare_float(&mut self, name: &'static str) -> UniformHandle {
        let handle = UniformHandle::from_index(self.slots.len());
        self.slots.push(name);
        handle
    }

    fn set_float(&mut self, handle: UniformHandle, value: f32) {
        match self.slots.get(handle.index()).copied() {
            Some("alpha") => self.values.alpha = value,
            Some("time") => self.values.time = value,
            Some(other) => {
                tracing::warn!(uniform = other, "no std140 slot for declared uniform");
            }
            None => {
                tracing::warn!(index = handle.index(), "uniform handle was never declared");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program;
    use plasma::PlasmaEffect;

    #[test]
    fn block_size_and_alignment_match_std140() {
        assert_eq!(std::mem::size_of::<PlasmaUniforms>(), 80);
        assert_eq!(std::mem::size_of::<PlasmaUniforms>() % 16, 0);
    }

    #[test]
    fn transform_rows_follow_coefficient_order() {
        let mut uniforms = PlasmaUniforms::new(4, 4);
        uniforms.set_coord_transform(Affine::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert_eq!(uniforms.transform0, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(uniforms.transform1, [5.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn effect_upload_lands_in_std140_slots() {
        let mut block = UniformBlock::new(8, 8);
        let uniforms = program::declare_uniforms(&mut block);
        let effect = PlasmaEffect::new(Affine::IDENTITY, 255, 3.25);
        effect.upload_uniforms(&mut block, &uniforms);
        assert_eq!(block.values().alpha, 1.0);
        assert_eq!(block.values().time, 3.25);
    }

    #[test]
    fn zero_alpha_uploads_zero() {
        let mut block = UniformBlock::new(8, 8);
        let uniforms = program::declare_uniforms(&mut block);
        let effect = PlasmaEffect::new(Affine::IDENTITY, 0, 0.0);
        effect.upload_uniforms(&mut block, &uniforms);
        assert_eq!(block.values().alpha, 0.0);
    }
}
