use crate::constants::QUAD_CORNERS;
use fx_core::{EffectUniforms, FxError};
use wgpu::util::DeviceExt;

pub(crate) struct EffectResources {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) quad: wgpu::Buffer,
}

impl EffectResources {
    pub(crate) fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.quad.destroy();
    }
}

/// Compile the effect shader and build its pipeline. Validation failures are
/// caught in error scopes so they surface as values instead of device loss.
pub(crate) async fn create_effect_resources(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> Result<EffectResources, FxError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("effects_shader"),
        source: wgpu::ShaderSource::Wgsl(fx_core::EFFECTS_WGSL.into()),
    });
    if let Some(err) = device.pop_error_scope().await {
        return Err(FxError::ShaderCompile(err.to_string()));
    }

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("effects_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("effects_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("effects_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    if let Some(err) = device.pop_error_scope().await {
        return Err(FxError::ProgramLink(err.to_string()));
    }

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("effects_uniforms"),
        size: std::mem::size_of::<EffectUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("effects_bg"),
        layout: &bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });
    let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("effects_quad"),
        contents: bytemuck::cast_slice(&QUAD_CORNERS),
        usage: wgpu::BufferUsages::VERTEX,
    });

    Ok(EffectResources {
        pipeline,
        uniform_buffer,
        bind_group,
        quad,
    })
}
