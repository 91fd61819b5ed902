/// Opaque handle to a scalar uniform declared through a [`UniformBinder`].
///
/// Handles are only meaningful to the binder that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformHandle(usize);

impl UniformHandle {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Capability interface a rendering backend offers for scalar uniforms.
///
/// The program generator declares its uniforms through this trait once
/// per compiled program; effects push per-draw values through the same
/// trait. Backends implement it against whatever storage they upload
/// (a std140 block in the wgpu renderer); tests implement it with a
/// recording stub.
pub trait UniformBinder {
    /// Declares a float uniform and returns the handle later passed to
    /// [`UniformBinder::set_float`].
    fn declare_float(&mut self, name: &'static str) -> UniformHandle;

    /// Writes a per-draw value for a previously declared uniform.
    fn set_float(&mut self, handle: UniformHandle, value: f32);
}
