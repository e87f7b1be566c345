use crate::constants::DEFAULT_POINTER;
use glam::Vec2;

/// Parameters handed to the effect shader for one draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSet {
    /// Seconds of simulation time since the engine started.
    pub time: f32,
    pub aberration: f32,
    pub flicker: f32,
    pub intensity: f32,
    /// Normalized, Y-up pointer position.
    pub pointer: Vec2,
    pub distortion: f32,
    /// Logical viewport size in CSS pixels.
    pub resolution: Vec2,
}

impl Default for UniformSet {
    fn default() -> Self {
        Self {
            time: 0.0,
            aberration: 0.0,
            flicker: 0.0,
            intensity: 1.0,
            pointer: Vec2::from(DEFAULT_POINTER),
            distortion: 0.0,
            resolution: Vec2::ZERO,
        }
    }
}

/// GPU layout of `UniformSet`, matching `struct Effects` in effects.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    pub aberration: f32,
    pub flicker: f32,
    pub intensity: f32,
    pub distortion: f32,
    _pad: [f32; 3],
}

impl EffectUniforms {
    /// Pack `set`, replacing its logical resolution with the backing size the
    /// surface actually renders at.
    pub fn pack(set: &UniformSet, backing: [f32; 2]) -> Self {
        Self {
            resolution: backing,
            pointer: set.pointer.to_array(),
            time: set.time,
            aberration: set.aberration,
            flicker: set.flicker,
            intensity: set.intensity,
            distortion: set.distortion,
            _pad: [0.0; 3],
        }
    }
}

impl From<&UniformSet> for EffectUniforms {
    fn from(set: &UniformSet) -> Self {
        Self::pack(set, set.resolution.to_array())
    }
}

/// Convert a pointer in viewport pixels (origin top-left) to the shader's
/// normalized, Y-flipped space. Degenerate viewports map to the centre.
pub fn normalize_pointer(x_px: f32, y_px: f32, viewport: Vec2) -> Vec2 {
    if !(viewport.x > 0.0 && viewport.y > 0.0) || !x_px.is_finite() || !y_px.is_finite() {
        return Vec2::from(DEFAULT_POINTER);
    }
    Vec2::new(
        (x_px / viewport.x).clamp(0.0, 1.0),
        (1.0 - y_px / viewport.y).clamp(0.0, 1.0),
    )
}
