use crate::{convert, dom};
use fx_core::{EffectUniforms, FxError, ShaderSurface, UniformSet};
use web_sys as web;

mod pipeline;
use pipeline::{create_effect_resources, EffectResources};

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    effects: EffectResources,
    max_dim: u32,
}

/// Full-screen effect pass on a canvas. After `dispose` every call is a
/// no-op.
pub struct GpuSurface {
    canvas: web::HtmlCanvasElement,
    gpu: Option<GpuState>,
    staged: bool,
}

fn unavailable(what: &str, e: impl std::fmt::Debug) -> FxError {
    FxError::ContextUnavailable(format!("{what}: {e:?}"))
}

impl GpuSurface {
    pub async fn initialize(canvas: web::HtmlCanvasElement) -> Result<Self, FxError> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| unavailable("create_surface", e))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| FxError::ContextUnavailable("no WebGPU or WebGL2 adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("fx_device"),
                    required_features: wgpu::Features::empty(),
                    // WebGL2 fallback cannot satisfy the WebGPU defaults
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(|e| unavailable("request_device", e))?;
        let max_dim = device.limits().max_texture_dimension_2d;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| FxError::ContextUnavailable("surface reports no formats".into()))?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.min(max_dim),
            height: height.min(max_dim),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let effects = create_effect_resources(&device, format).await?;
        log::info!(
            "[gpu] ready backend={:?} format={:?} alpha={:?} {}x{}",
            adapter.get_info().backend,
            format,
            alpha_mode,
            config.width,
            config.height
        );

        Ok(Self {
            canvas,
            gpu: Some(GpuState {
                surface,
                device,
                queue,
                config,
                effects,
                max_dim,
            }),
            staged: false,
        })
    }
}

impl ShaderSurface for GpuSurface {
    fn resize(&mut self, width: f32, height: f32) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let (w, h) = convert::backing_size(width, height, dom::device_pixel_ratio(), gpu.max_dim);
        if w == gpu.config.width && h == gpu.config.height {
            return;
        }
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        gpu.config.width = w;
        gpu.config.height = h;
        gpu.surface.configure(&gpu.device, &gpu.config);
        log::debug!("[gpu] backing {}x{}", w, h);
    }

    fn set_uniforms(&mut self, uniforms: &UniformSet) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        let packed = EffectUniforms::pack(
            uniforms,
            [gpu.config.width as f32, gpu.config.height as f32],
        );
        gpu.queue
            .write_buffer(&gpu.effects.uniform_buffer, 0, bytemuck::bytes_of(&packed));
        self.staged = true;
    }

    fn draw_frame(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::warn!("[gpu] frame skipped: {:?}", e);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("effects_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("effects_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if self.staged {
                rpass.set_pipeline(&gpu.effects.pipeline);
                rpass.set_bind_group(0, &gpu.effects.bind_group, &[]);
                rpass.set_vertex_buffer(0, gpu.effects.quad.slice(..));
                rpass.draw(0..4, 0..1);
            }
        }
        gpu.queue.submit(Some(encoder.finish()));
        frame.present();
    }

    fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.effects.destroy();
            log::info!("[gpu] disposed");
        }
        self.staged = false;
    }
}
