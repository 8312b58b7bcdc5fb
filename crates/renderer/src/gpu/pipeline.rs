use wgpu::util::DeviceExt;

use crate::compile::{compile_fragment_module, compile_vertex_module, wrap_fragment};
use crate::error::PlaygroundError;
use crate::gpu::uniforms::{UserUniformBlock, UserUniformLayout};
use crate::types::UniformValue;

/// The full-screen quad: four clip-space vertices forming two triangles when
/// drawn as a strip. Uploaded once at construction and never mutated.
pub(crate) const QUAD_POSITIONS: [f32; 12] = [
    -1.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0, //
    1.0, -1.0, 0.0,
];

pub(crate) const QUAD_VERTEX_COUNT: u32 = 4;

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// Resources shared by every program: the fixed vertex stage and the quad
/// position buffer. Building these succeeds once at construction or the
/// playground is unusable.
pub(crate) struct PipelineLayouts {
    pub vertex_module: wgpu::ShaderModule,
    pub position_buffer: wgpu::Buffer,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Result<Self, PlaygroundError> {
        let vertex_module = compile_vertex_module(device)?;

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad position buffer"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            vertex_module,
            position_buffer,
        })
    }
}

fn uniform_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// A fully linked shader program: the render pipeline plus the custom
/// uniform block backing it. Replaced wholesale on every successful
/// `set_source`; dropping the previous instance releases its GPU objects.
pub(crate) struct ShaderProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
    user_block: UserUniformBlock,
    user_buffer: Option<wgpu::Buffer>,
    user_dirty: bool,
}

impl ShaderProgram {
    /// Compiles and links a user fragment source against the fixed vertex
    /// stage.
    ///
    /// Compilation failures surface as [`PlaygroundError::CompileFailure`]
    /// with the front-end diagnostic; pipeline-creation failures surface as
    /// [`PlaygroundError::LinkFailure`]. On any failure no program is
    /// produced and the caller keeps whatever program was active before.
    pub fn build(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        frame_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
        source: &str,
    ) -> Result<Self, PlaygroundError> {
        let wrapped = wrap_fragment(source);
        let fragment_module = compile_fragment_module(device, &wrapped)?;

        let user_layout = UserUniformLayout::from_declarations(&wrapped.user_uniforms);
        let user_block = UserUniformBlock::new(user_layout);

        let user_buffer = if user_block.is_empty() {
            None
        } else {
            Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("user uniform buffer"),
                size: user_block.bytes().len() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }))
        };

        let mut layout_entries = vec![uniform_layout_entry(0)];
        if user_buffer.is_some() {
            layout_entries.push(uniform_layout_entry(1));
        }
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("program uniform layout"),
            entries: &layout_entries,
        });

        let mut bind_entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: frame_buffer.as_entire_binding(),
        }];
        if let Some(buffer) = &user_buffer {
            bind_entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: buffer.as_entire_binding(),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("program uniform bind group"),
            layout: &bind_group_layout,
            entries: &bind_entries,
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shader pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shader pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &layouts.vertex_module,
                entry_point: Some("main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (std::mem::size_of::<f32>() * 3) as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &QUAD_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(PlaygroundError::LinkFailure {
                log: err.to_string(),
            });
        }

        Ok(Self {
            pipeline,
            bind_group,
            user_block,
            user_buffer,
            user_dirty: false,
        })
    }

    /// Writes a custom uniform value, deferring the GPU upload to the next
    /// frame.
    pub fn set_uniform(&mut self, name: &str, value: &UniformValue) -> Result<(), PlaygroundError> {
        self.user_block.set(name, value)?;
        self.user_dirty = true;
        Ok(())
    }

    /// Uploads pending custom uniform values.
    pub fn flush_user_uniforms(&mut self, queue: &wgpu::Queue) {
        if !self.user_dirty {
            return;
        }
        if let Some(buffer) = &self.user_buffer {
            queue.write_buffer(buffer, 0, self.user_block.bytes());
        }
        self.user_dirty = false;
    }
}
