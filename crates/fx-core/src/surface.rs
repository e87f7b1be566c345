//! Seams between the engine and the two drawables it renders onto.
//!
//! The browser front-end implements these over wgpu and a canvas 2D
//! context; tests implement them with recorders.

use crate::uniforms::UniformSet;
use glam::{Vec2, Vec3};

/// The full-screen shader target.
pub trait ShaderSurface {
    /// Logical size in CSS pixels; implementations derive their backing size.
    /// Must be idempotent.
    fn resize(&mut self, width: f32, height: f32);
    /// Stage uniform values for the next `draw_frame`. Submits nothing.
    fn set_uniforms(&mut self, uniforms: &UniformSet);
    /// Clear, then issue the single full-screen draw.
    fn draw_frame(&mut self);
    /// Release GPU resources. Later calls on the surface are no-ops.
    fn dispose(&mut self);
}

/// The 2D layer particles are painted onto.
pub trait ParticleCanvas {
    /// Translucent fill over the whole layer, leaving motion trails.
    fn fill_trail(&mut self, alpha: f32);
    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32);
}
