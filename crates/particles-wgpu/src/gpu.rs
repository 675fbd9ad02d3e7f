use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lazyview_particles::{Blending, ParticleScene, PointsMaterial};
use wgpu::util::DeviceExt;

use crate::shaders;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Corner {
    corner: [f32; 2],
}

/// Quad corners for a triangle strip.
const CORNERS: [Corner; 4] = [
    Corner { corner: [-1.0, -1.0] },
    Corner { corner: [1.0, -1.0] },
    Corner { corner: [-1.0, 1.0] },
    Corner { corner: [1.0, 1.0] },
];

fn blend_state(blending: Blending) -> wgpu::BlendState {
    match blending {
        Blending::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
        Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
    }
}

fn uniforms_for(scene: &ParticleScene) -> Uniforms {
    let m = &scene.cloud.material;
    Uniforms {
        view: scene.camera.view_matrix().to_cols_array_2d(),
        proj: scene.camera.projection_matrix(scene.aspect()).to_cols_array_2d(),
        model: scene.cloud.model_matrix().to_cols_array_2d(),
        color: [m.color[0], m.color[1], m.color[2], m.opacity],
        params: [
            m.size,
            if m.size_attenuation { 1.0 } else { 0.0 },
            scene.width as f32,
            scene.height as f32,
        ],
    }
}

/// wgpu-based point cloud renderer.
pub struct PointCloudRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    corner_buffer: wgpu::Buffer,
    instance_buffer: Option<wgpu::Buffer>,
    instance_count: u32,
    uploaded: Option<Arc<[f32]>>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl PointCloudRenderer {
    /// Build the pipeline for one material. Blending and depth writes are
    /// baked in here; the remaining material fields are uniforms.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        material: &PointsMaterial,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("points_uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view: Mat4::IDENTITY.to_cols_array_2d(),
                proj: Mat4::IDENTITY.to_cols_array_2d(),
                model: Mat4::IDENTITY.to_cols_array_2d(),
                color: [1.0; 4],
                params: [1.0, 0.0, 1.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("points_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("points_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("points_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::POINTS_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_points"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Corner>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: (3 * std::mem::size_of::<f32>()) as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x3],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_points"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend_state(material.blending)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: material.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let corner_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("points_corner_buffer"),
            contents: bytemuck::cast_slice(&CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(
            blending = ?material.blending,
            depth_write = material.depth_write,
            "point cloud pipeline created"
        );

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            corner_buffer,
            instance_buffer: None,
            instance_count: 0,
            uploaded: None,
            depth_texture,
            surface_format,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.02,
                a: 1.0,
            },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Upload positions if the scene carries a different array than last
    /// time. Returns whether an upload happened.
    fn sync_positions(&mut self, device: &wgpu::Device, positions: &Arc<[f32]>) -> bool {
        if let Some(current) = &self.uploaded {
            if Arc::ptr_eq(current, positions) {
                return false;
            }
        }

        self.instance_count = (positions.len() / 3) as u32;
        self.instance_buffer = if self.instance_count == 0 {
            None
        } else {
            Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("points_instance_buffer"),
                contents: bytemuck::cast_slice(&positions[..self.instance_count as usize * 3]),
                usage: wgpu::BufferUsages::VERTEX,
            }))
        };
        self.uploaded = Some(Arc::clone(positions));
        tracing::debug!(points = self.instance_count, "uploaded point positions");
        true
    }

    /// Render one frame of the scene into `view`, clearing it first.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &ParticleScene,
    ) {
        self.sync_positions(device, &scene.cloud.positions);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&uniforms_for(scene)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("points_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("points_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(instances) = &self.instance_buffer {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.corner_buffer.slice(..));
                pass.set_vertex_buffer(1, instances.slice(..));
                pass.draw(0..CORNERS.len() as u32, 0..self.instance_count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("points_depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
