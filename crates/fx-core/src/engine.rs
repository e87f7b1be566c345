//! The effect scheduler: settings, pulses, particles and timed work for one
//! page, owned by whichever controller created it.

use crate::constants::*;
use crate::particles::{ParticleField, ParticleSpec};
use crate::pulse::{Perturbation, PulseChannel, PulseId};
use crate::settings::{unit, Settings, SettingsPatch};
use crate::timeline::{TaskHandle, Timeline};
use crate::uniforms::{normalize_pointer, UniformSet};
use glam::{Vec2, Vec3};
use instant::Instant;
use rand::prelude::*;
use std::f32::consts::TAU;
use std::time::Duration;

/// Callback run once a transition has finished.
pub type OnComplete = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    pub particle_cap: usize,
    pub seed: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            particle_cap: PARTICLE_CAP,
            seed: 42,
        }
    }
}

/// Fields a pulse can perturb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PulseTarget {
    Distortion,
    Aberration,
    Flicker,
    Intensity,
}

enum Task {
    EndPulse { target: PulseTarget, id: PulseId },
    Burst,
    Ambient,
    Complete(OnComplete),
}

pub struct EffectsEngine {
    settings: Settings,
    particles: ParticleField,
    timeline: Timeline<Task>,
    distortion: f32,
    pointer: Vec2,
    viewport: Vec2,
    time: f32,
    distortion_pulse: PulseChannel,
    aberration_pulse: PulseChannel,
    flicker_pulse: PulseChannel,
    intensity_pulse: PulseChannel,
    next_pulse: u64,
    ambient: Option<TaskHandle>,
    rng: StdRng,
    disposed: bool,
}

impl EffectsEngine {
    pub fn new(settings: Settings, options: EngineOptions, now: Instant) -> Self {
        let mut particles = ParticleField::new(options.particle_cap);
        particles.set_enabled(settings.enabled);
        let mut timeline = Timeline::new();
        let ambient = timeline.schedule(now, Task::Ambient);
        log::info!(
            "[fx] engine up enabled={} intensity={:.2} aberration={:.2} flicker={:.2} density={:.2}",
            settings.enabled,
            settings.intensity,
            settings.aberration,
            settings.flicker,
            settings.particle_density
        );
        Self {
            settings,
            particles,
            timeline,
            distortion: 0.0,
            pointer: Vec2::from(DEFAULT_POINTER),
            viewport: Vec2::ZERO,
            time: 0.0,
            distortion_pulse: PulseChannel::anchored(0.0),
            aberration_pulse: PulseChannel::default(),
            flicker_pulse: PulseChannel::default(),
            intensity_pulse: PulseChannel::default(),
            next_pulse: 0,
            ambient: Some(ambient),
            rng: StdRng::seed_from_u64(options.seed),
            disposed: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleField {
        &mut self.particles
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn distortion(&self) -> f32 {
        self.distortion
    }

    /// Snapshot of everything the shader needs for the next draw.
    pub fn uniforms(&self) -> UniformSet {
        UniformSet {
            time: self.time,
            aberration: self.settings.aberration,
            flicker: self.settings.flicker,
            intensity: self.settings.intensity,
            pointer: self.pointer,
            distortion: self.distortion,
            resolution: self.viewport,
        }
    }

    /// Shallow-merge recognized keys. Fields currently under a pulse take
    /// the new value as their baseline.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        if self.disposed || patch.is_empty() {
            return;
        }
        if let Some(enabled) = patch.enabled {
            self.settings.enabled = enabled;
            self.particles.set_enabled(enabled);
            if !enabled {
                self.particles.clear();
            }
        }
        if let Some(v) = patch.particle_density.and_then(unit) {
            self.settings.particle_density = v;
        }
        if let Some(v) = patch.intensity.and_then(unit) {
            self.settings.intensity = rebase(&mut self.intensity_pulse, v);
        }
        if let Some(v) = patch.aberration.and_then(unit) {
            self.settings.aberration = rebase(&mut self.aberration_pulse, v);
        }
        if let Some(v) = patch.flicker.and_then(unit) {
            self.settings.flicker = rebase(&mut self.flicker_pulse, v);
        }
        log::debug!("[fx] settings now {:?}", self.settings);
    }

    /// Pointer in viewport pixels, origin top-left.
    pub fn update_pointer_position(&mut self, x_px: f32, y_px: f32) {
        self.pointer = normalize_pointer(x_px, y_px, self.viewport);
    }

    /// Logical viewport size shared by the pointer mapping and the particle
    /// layer.
    pub fn resize(&mut self, width: f32, height: f32) {
        let sane = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.viewport = Vec2::new(sane(width), sane(height));
        self.particles
            .set_layer_size(self.viewport.x, self.viewport.y);
    }

    pub fn advance_time(&mut self, dt: Duration) {
        self.time += dt.as_secs_f32();
    }

    fn accepts_triggers(&self) -> bool {
        self.settings.enabled && !self.disposed
    }

    pub fn trigger_distortion(&mut self, now: Instant, intensity: f32, duration: Duration) {
        if !self.accepts_triggers() || !intensity.is_finite() {
            return;
        }
        self.begin_pulse(
            PulseTarget::Distortion,
            now,
            Perturbation::Set(intensity.max(0.0)),
            duration,
        );
    }

    pub fn trigger_glitch(&mut self, now: Instant, amount: f32, duration: Duration) {
        if !self.accepts_triggers() {
            return;
        }
        let amount = if amount.is_finite() {
            amount.max(0.0)
        } else {
            DEFAULT_GLITCH_AMOUNT
        };
        self.begin_pulse(
            PulseTarget::Aberration,
            now,
            Perturbation::Raise {
                by: amount,
                ceiling: GLITCH_CEILING,
            },
            duration,
        );
        self.begin_pulse(
            PulseTarget::Flicker,
            now,
            Perturbation::Raise {
                by: GLITCH_FLICKER_BOOST,
                ceiling: GLITCH_CEILING,
            },
            duration,
        );
    }

    /// Radiate particles from `at` (normalized layer coordinates). Returns
    /// how many the field accepted.
    pub fn trigger_burst(
        &mut self,
        now: Instant,
        at: Vec2,
        color: Option<Vec3>,
        radius: Option<f32>,
    ) -> usize {
        if !self.accepts_triggers() {
            return 0;
        }
        let count = scaled_count(BURST_PARTICLES_PER_DENSITY, self.settings.particle_density);
        let origin = if at.is_finite() {
            at * self.viewport
        } else {
            self.viewport * 0.5
        };
        let reach = radius
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_BURST_RADIUS)
            / DEFAULT_BURST_RADIUS;
        let color = color.filter(|c| c.is_finite());

        let mut spawned = 0;
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let speed = self.rng.gen_range(BURST_SPEED_MIN..BURST_SPEED_MAX) * reach;
            let spec = ParticleSpec {
                position: origin,
                velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                size: self.rng.gen_range(BURST_SIZE_MIN..BURST_SIZE_MAX),
                color: color.unwrap_or_else(|| random_pastel(&mut self.rng)),
                life: 1.0,
            };
            if self.particles.spawn(spec) {
                spawned += 1;
            }
        }
        log::debug!("[fx] burst {}/{} at ({:.2},{:.2})", spawned, count, at.x, at.y);
        self.trigger_distortion(
            now,
            BURST_DISTORTION,
            Duration::from_millis(BURST_DISTORTION_MS),
        );
        spawned
    }

    /// Page-transition flourish. `on_complete` is handed back from `run_due`
    /// (or `dispose`) exactly once. On a disposed engine it is returned here
    /// for the caller to invoke at once.
    #[must_use]
    pub fn trigger_transition(
        &mut self,
        now: Instant,
        on_complete: OnComplete,
    ) -> Option<OnComplete> {
        if self.disposed {
            return Some(on_complete);
        }
        if !self.settings.enabled {
            self.timeline.schedule(
                now + Duration::from_millis(DISABLED_TRANSITION_MS),
                Task::Complete(on_complete),
            );
            return None;
        }
        let span = Duration::from_millis(TRANSITION_MS);
        self.begin_pulse(
            PulseTarget::Intensity,
            now,
            Perturbation::Scale(TRANSITION_INTENSITY_SCALE),
            span,
        );
        self.trigger_glitch(now, TRANSITION_GLITCH_AMOUNT, span);
        for i in 0..TRANSITION_BURSTS {
            let offset = Duration::from_millis(TRANSITION_BURST_STAGGER_MS * u64::from(i));
            self.timeline.schedule(now + offset, Task::Burst);
        }
        // scheduled after the intensity pulse end, so it runs after the restore
        self.timeline.schedule(now + span, Task::Complete(on_complete));
        log::info!("[fx] transition started");
        None
    }

    /// When the next timed task wants to run.
    pub fn next_due(&mut self) -> Option<Instant> {
        self.timeline.next_due()
    }

    /// Fire every task due at or before `now`. Completion callbacks are
    /// returned rather than invoked so the caller can release its borrow of
    /// the engine first.
    #[must_use]
    pub fn run_due(&mut self, now: Instant) -> Vec<OnComplete> {
        let mut finished = Vec::new();
        while let Some((due, task)) = self.timeline.pop_due(now) {
            match task {
                Task::Complete(done) => finished.push(done),
                _ if self.disposed => {}
                Task::EndPulse { target, id } => self.end_pulse(target, id),
                Task::Burst => {
                    let at = Vec2::new(self.rng.gen(), self.rng.gen());
                    let color = Vec3::new(self.rng.gen(), self.rng.gen(), self.rng.gen());
                    self.trigger_burst(due, at, Some(color), None);
                }
                Task::Ambient => {
                    self.ambient = None;
                    self.ambient_step(now);
                }
            }
        }
        finished
    }

    /// Stop ambient leveling for good, e.g. when nothing can ever be drawn.
    /// Returns whether a pending step was cancelled.
    pub fn halt_ambient(&mut self) -> bool {
        match self.ambient.take() {
            Some(handle) => self.timeline.cancel(handle),
            None => false,
        }
    }

    /// Tear down: clear particles, drop every pending task and put each
    /// perturbed field back on its baseline. Pending transition callbacks
    /// are returned so they still fire exactly once.
    #[must_use]
    pub fn dispose(&mut self) -> Vec<OnComplete> {
        if self.disposed {
            return Vec::new();
        }
        self.disposed = true;
        self.particles.clear();
        self.particles.set_enabled(false);
        for target in [
            PulseTarget::Distortion,
            PulseTarget::Aberration,
            PulseTarget::Flicker,
            PulseTarget::Intensity,
        ] {
            let (channel, field) = self.slot(target);
            if let Some(baseline) = channel.clear() {
                *field = baseline;
            }
        }
        self.ambient = None;
        let finished: Vec<OnComplete> = self
            .timeline
            .drain()
            .into_iter()
            .filter_map(|task| match task {
                Task::Complete(done) => Some(done),
                _ => None,
            })
            .collect();
        log::info!("[fx] engine disposed ({} completions pending)", finished.len());
        finished
    }

    fn slot(&mut self, target: PulseTarget) -> (&mut PulseChannel, &mut f32) {
        match target {
            PulseTarget::Distortion => (&mut self.distortion_pulse, &mut self.distortion),
            PulseTarget::Aberration => (&mut self.aberration_pulse, &mut self.settings.aberration),
            PulseTarget::Flicker => (&mut self.flicker_pulse, &mut self.settings.flicker),
            PulseTarget::Intensity => (&mut self.intensity_pulse, &mut self.settings.intensity),
        }
    }

    fn begin_pulse(
        &mut self,
        target: PulseTarget,
        now: Instant,
        perturbation: Perturbation,
        duration: Duration,
    ) -> PulseId {
        let id = PulseId(self.next_pulse);
        self.next_pulse += 1;
        let duration = duration.min(Duration::from_millis(MAX_PULSE_MS));
        let (channel, field) = self.slot(target);
        *field = channel.begin(id, *field, perturbation);
        log::debug!("[pulse] {:?} -> {:.3} for {:?}", target, *field, duration);
        self.timeline
            .schedule(now + duration, Task::EndPulse { target, id });
        id
    }

    fn end_pulse(&mut self, target: PulseTarget, id: PulseId) {
        let (channel, field) = self.slot(target);
        if let Some(value) = channel.end(id) {
            *field = value;
        }
    }

    /// Level the ambient population towards `100 × density`, one particle
    /// per frame interval, then back off.
    fn ambient_step(&mut self, now: Instant) {
        let target = scaled_count(AMBIENT_PARTICLES_PER_DENSITY, self.settings.particle_density);
        let wait = if self.settings.enabled && self.particles.len() < target {
            self.spawn_ambient();
            AMBIENT_SPAWN_INTERVAL_MS
        } else {
            AMBIENT_RECHECK_MS
        };
        self.ambient = Some(
            self.timeline
                .schedule(now + Duration::from_millis(wait), Task::Ambient),
        );
    }

    fn spawn_ambient(&mut self) {
        let layer = self.particles.layer_size();
        let spec = ParticleSpec {
            position: Vec2::new(
                self.rng.gen::<f32>() * layer.x,
                self.rng.gen::<f32>() * layer.y,
            ),
            velocity: Vec2::new(
                self.rng.gen_range(-AMBIENT_SPEED_MAX..AMBIENT_SPEED_MAX),
                self.rng.gen_range(-AMBIENT_SPEED_MAX..AMBIENT_SPEED_MAX),
            ),
            size: self.rng.gen_range(AMBIENT_SIZE_MIN..AMBIENT_SIZE_MAX),
            color: Vec3::new(self.rng.gen(), self.rng.gen(), self.rng.gen()),
            life: self.rng.gen_range(AMBIENT_LIFE_MIN..=1.0),
        };
        self.particles.spawn(spec);
    }
}

fn rebase(channel: &mut PulseChannel, value: f32) -> f32 {
    if channel.is_active() {
        channel.rebase(value)
    } else {
        value
    }
}

/// `floor(per_unit × density)`. Densities such as 0.7 are not exact in
/// binary, so a hair of slack keeps 50 × 0.7 at 35.
pub fn scaled_count(per_unit: f32, density: f32) -> usize {
    (per_unit * density + 1e-3).floor().max(0.0) as usize
}

fn random_pastel(rng: &mut StdRng) -> Vec3 {
    Vec3::new(
        0.5 + rng.gen::<f32>() * 0.5,
        0.5 + rng.gen::<f32>() * 0.5,
        0.5 + rng.gen::<f32>() * 0.5,
    )
}
