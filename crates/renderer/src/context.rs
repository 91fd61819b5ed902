use std::borrow::Cow;

use plasma::EffectError;
use wgpu::naga::ShaderStage;

use crate::program;

/// Offscreen GPU context: instance, device, and queue without any
/// window surface. One context owns one command stream; everything
/// built from it must stay on the acquiring thread.
pub struct GpuContext {
    pub _instance: wgpu::Instance,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_name: String,
}

impl GpuContext {
    /// Acquires an adapter and device. A software-only or headless
    /// machine with no usable adapter surfaces as
    /// [`EffectError::NoDeviceContext`], signalling the caller to pick
    /// a non-GPU compositing path.
    pub fn acquire() -> Result<Self, EffectError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|err| EffectError::NoDeviceContext(err.to_string()))?;

        let adapter_info = adapter.get_info();
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("plasma device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| EffectError::NoDeviceContext(err.to_string()))?;

        Ok(Self {
            _instance: instance,
            device,
            queue,
            adapter_name: adapter_info.name,
        })
    }

    /// Compiles the generated vertex stage.
    pub fn compile_vertex_shader(&self) -> Result<wgpu::ShaderModule, EffectError> {
        self.compile("plasma vertex", program::vertex_source(), ShaderStage::Vertex)
    }

    /// Compiles the generated fragment stage.
    pub fn compile_fragment_shader(&self) -> Result<wgpu::ShaderModule, EffectError> {
        self.compile(
            "plasma fragment",
            program::fragment_source(),
            ShaderStage::Fragment,
        )
    }

    /// Runs the compile inside a validation error scope so backend
    /// diagnostics come back as [`EffectError::ShaderCompile`] instead
    /// of a device-lost callback somewhere downstream.
    fn compile(
        &self,
        label: &str,
        source: String,
        stage: ShaderStage,
    ) -> Result<wgpu::ShaderModule, EffectError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Owned(source),
                stage,
                defines: &[],
            },
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            let diagnostics = error.to_string();
            tracing::error!(label, %diagnostics, "shader compilation rejected");
            return Err(EffectError::ShaderCompile { diagnostics });
        }
        Ok(module)
    }
}
