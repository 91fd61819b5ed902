use anyhow::{Context as AnyhowContext, Result};
use plasma::{EffectError, Paint, PlasmaEffect};

use crate::context::GpuContext;
use crate::program;
use crate::uniforms::{PlasmaUniforms, UniformBlock};

/// Render target format for the offscreen pass.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Compiled plasma program plus the GPU resources needed to draw it:
/// render pipeline, uniform buffer, and bind group. One instance per
/// distinct [`plasma::ProgramKey`], shared across draws via the
/// program cache.
pub struct EffectPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl EffectPipeline {
    pub fn new(context: &GpuContext) -> Result<Self, EffectError> {
        let vertex_module = context.compile_vertex_shader()?;
        let fragment_module = context.compile_fragment_shader()?;
        let device = &context.device;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plasma uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plasma uniform buffer"),
            size: std::mem::size_of::<PlasmaUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plasma uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plasma pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plasma pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    /// Draws one frame of the effect into an offscreen target and
    /// reads it back as tightly packed RGBA8 rows.
    pub fn render(
        &self,
        context: &GpuContext,
        effect: &PlasmaEffect,
        paint: &Paint,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let block = per_draw_uniforms(effect, paint, width, height);
        context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(block.values()));

        let device = &context.device;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("plasma target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bytes_per_row = width * 4;
        let padded_bytes_per_row =
            bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plasma readback"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("plasma encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plasma pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        context.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::Wait)
            .context("device poll failed while waiting for readback")?;
        receiver
            .recv()
            .context("readback mapping callback dropped")?
            .context("failed to map readback buffer")?;

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((bytes_per_row * height) as usize);
        for row in mapped.chunks_exact(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..bytes_per_row as usize]);
        }
        drop(mapped);
        readback.unmap();

        Ok(pixels)
    }
}

/// Assembles the per-draw uniform block: resolution, coordinate
/// transform, input color, and the effect's scalar uploads.
fn per_draw_uniforms(effect: &PlasmaEffect, paint: &Paint, width: u32, height: u32) -> UniformBlock {
    let mut block = UniformBlock::new(width, height);
    block.values_mut().set_coord_transform(effect.coord_transform());
    block.values_mut().set_input_color(paint.input_color());
    let uniforms = program::declare_uniforms(&mut block);
    effect.upload_uniforms(&mut block, &uniforms);
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Affine;
    use plasma::{AnimationClock, PlasmaConfig};

    #[test]
    fn per_draw_uniforms_capture_effect_state() {
        // Uniform assembly is pure CPU work, so it is testable without
        // acquiring a device; only `render` needs one.
        let config = PlasmaConfig::new(100.0, 100.0);
        let paint = Paint::new([255, 255, 255, 128]);
        let mut clock = AnimationClock::from_phase(2.0);
        let effect = config
            .realize(&paint, Some(Affine::translate((50.0, 50.0))), &mut clock)
            .expect("realize");

        let block = per_draw_uniforms(&effect, &paint, 64, 64);

        let values = block.values();
        assert_eq!(values.resolution[0], 64.0);
        assert_eq!(values.time, 2.0);
        assert!((values.alpha - 128.0 / 255.0).abs() < 1e-6);
        assert!((values.transform0[0] - 0.01).abs() < 1e-7);
        assert_eq!(values.transform0[1], 0.0);
        assert_eq!(values.transform0[2], 0.0);
        assert!((values.transform0[3] - 0.01).abs() < 1e-7);
        assert_eq!(values.transform1, [-0.5, -0.5, 0.0, 0.0]);
        assert!((values.input_color[3] - 128.0 / 255.0).abs() < 1e-6);
    }
}
