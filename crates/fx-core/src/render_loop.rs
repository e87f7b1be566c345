//! Per-frame coordinator. The host calls `frame` once per displayed frame;
//! this type only decides whether a frame should draw and in what order.

use crate::engine::EffectsEngine;
use crate::surface::{ParticleCanvas, ShaderSurface};
use crate::timeline::elapsed_between;
use instant::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
    last_tick: Option<Instant>,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames drawn since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Stopped -> Running when effects are enabled. Returns true only on
    /// that transition; the caller schedules the first frame.
    pub fn start(&mut self, engine: &EffectsEngine) -> bool {
        if self.is_running() || engine.is_disposed() || !engine.settings().enabled {
            return false;
        }
        self.state = LoopState::Running;
        self.last_tick = None;
        log::info!("[loop] running");
        true
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::info!("[loop] stopped after {} frames", self.frames);
        }
        self.state = LoopState::Stopped;
        self.last_tick = None;
    }

    /// Draw one frame. Returns whether the host should request another.
    pub fn frame<S, C>(
        &mut self,
        now: Instant,
        engine: &mut EffectsEngine,
        surface: &mut S,
        canvas: &mut C,
    ) -> bool
    where
        S: ShaderSurface + ?Sized,
        C: ParticleCanvas + ?Sized,
    {
        if !self.is_running() {
            return false;
        }
        if engine.is_disposed() || !engine.settings().enabled {
            self.stop();
            return false;
        }
        // wall clock, unbounded: a stall is one large step
        let dt = self
            .last_tick
            .map(|prev| elapsed_between(prev, now))
            .unwrap_or_default();
        self.last_tick = Some(now);
        engine.advance_time(dt);

        surface.set_uniforms(&engine.uniforms());
        surface.draw_frame();

        let layer = engine.viewport();
        let particles = engine.particles_mut();
        particles.advance(layer.x, layer.y);
        particles.render_onto(canvas);

        self.frames += 1;
        true
    }
}
