use crate::constants::TRAIL_COLOR;
use crate::{convert, dom};
use fx_core::{FxError, ParticleCanvas};
use glam::{Vec2, Vec3};
use std::f64::consts::TAU;
use web_sys as web;

/// Canvas 2D layer the particle field paints onto. Drawing happens in CSS
/// pixels; the context transform absorbs the device pixel ratio.
pub struct ParticleLayer {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl ParticleLayer {
    pub fn new(canvas: web::HtmlCanvasElement) -> Result<Self, FxError> {
        let ctx = dom::context_2d(&canvas).map_err(|e| {
            log::error!("[fx] particle layer: {:?}", e);
            FxError::SurfaceMissing("particle canvas 2d context")
        })?;
        Ok(Self {
            canvas,
            ctx,
            width: 0.0,
            height: 0.0,
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let dpr = dom::device_pixel_ratio();
        let (w_px, h_px) = convert::backing_size(width, height, dpr, u32::MAX);
        if self.canvas.width() != w_px || self.canvas.height() != h_px {
            self.canvas.set_width(w_px);
            self.canvas.set_height(h_px);
        }
        // resizing the backing store resets the transform
        _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        self.width = width.max(0.0) as f64;
        self.height = height.max(0.0) as f64;
    }

    pub fn clear(&self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }
}

impl ParticleCanvas for ParticleLayer {
    fn fill_trail(&mut self, alpha: f32) {
        self.ctx
            .set_fill_style_str(&convert::css_rgba(TRAIL_COLOR, alpha));
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .is_err()
        {
            return;
        }
        self.ctx
            .set_fill_style_str(&convert::css_rgba(color.to_array(), alpha));
        self.ctx.fill();
    }
}
