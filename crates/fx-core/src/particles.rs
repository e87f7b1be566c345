use crate::constants::*;
use crate::surface::ParticleCanvas;
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Layer-space pixels.
    pub position: Vec2,
    /// Pixels per tick.
    pub velocity: Vec2,
    pub size: f32,
    pub color: Vec3,
    pub life: f32,
}

impl Particle {
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life <= LIFE_EPSILON || self.size < MIN_PARTICLE_SIZE
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.life * PARTICLE_ALPHA_SCALE).clamp(0.0, 1.0)
    }
}

/// Spawn request. Values are sanitized on the way into the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSpec {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: Vec3,
    pub life: f32,
}

impl Default for ParticleSpec {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: BURST_SIZE_MIN,
            color: Vec3::ONE,
            life: 1.0,
        }
    }
}

impl ParticleSpec {
    fn into_particle(self) -> Option<Particle> {
        if self.life.is_nan() || self.life <= 0.0 {
            return None;
        }
        let finite_or_zero = |v: Vec2| if v.is_finite() { v } else { Vec2::ZERO };
        let color = if self.color.is_finite() {
            self.color.clamp(Vec3::ZERO, Vec3::ONE)
        } else {
            Vec3::ONE
        };
        Some(Particle {
            position: finite_or_zero(self.position),
            velocity: finite_or_zero(self.velocity),
            size: if self.size.is_finite() { self.size.max(0.0) } else { 0.0 },
            color,
            life: self.life.min(1.0),
        })
    }
}

/// Live particle population with a hard ceiling.
#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    cap: usize,
    enabled: bool,
    layer: Vec2,
}

impl ParticleField {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(PARTICLE_CAP)),
            cap,
            enabled: true,
            layer: Vec2::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Last size passed to `advance` or `set_layer_size`.
    pub fn layer_size(&self) -> Vec2 {
        self.layer
    }

    pub fn set_layer_size(&mut self, width: f32, height: f32) {
        self.layer = Vec2::new(width.max(0.0), height.max(0.0));
    }

    /// Add one particle. Returns false when the field is disabled, full, or
    /// the request describes a particle that is already dead.
    pub fn spawn(&mut self, spec: ParticleSpec) -> bool {
        if !self.enabled || self.particles.len() >= self.cap {
            return false;
        }
        match spec.into_particle() {
            Some(p) => {
                self.particles.push(p);
                true
            }
            None => false,
        }
    }

    /// One simulation tick: integrate, decay, and drop the dead in a single
    /// order-preserving pass.
    pub fn advance(&mut self, layer_width: f32, layer_height: f32) {
        self.set_layer_size(layer_width, layer_height);
        self.particles.retain_mut(|p| {
            p.position += p.velocity;
            p.life -= LIFE_DECAY_PER_TICK;
            p.size *= SIZE_DECAY_PER_TICK;
            !p.is_dead()
        });
    }

    pub fn render_onto<C: ParticleCanvas + ?Sized>(&self, canvas: &mut C) {
        canvas.fill_trail(TRAIL_FILL_ALPHA);
        for p in &self.particles {
            canvas.fill_disc(p.position, p.size, p.color, p.alpha());
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
