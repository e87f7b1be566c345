// Effect tuning constants shared by the engine and the web front-end.
// Durations are milliseconds, sizes and speeds are particle-layer pixels.

// Particle population
pub const PARTICLE_CAP: usize = 1000;
pub const LIFE_DECAY_PER_TICK: f32 = 0.01;
pub const SIZE_DECAY_PER_TICK: f32 = 0.99; // multiplicative
pub const MIN_PARTICLE_SIZE: f32 = 0.1;
pub const LIFE_EPSILON: f32 = 1e-4; // absorbs f32 drift from repeated decay
pub const PARTICLE_ALPHA_SCALE: f32 = 0.7;
pub const TRAIL_FILL_ALPHA: f32 = 0.1;

// Ambient leveling
pub const AMBIENT_PARTICLES_PER_DENSITY: f32 = 100.0;
pub const AMBIENT_SPAWN_INTERVAL_MS: u64 = 16; // roughly one displayed frame
pub const AMBIENT_RECHECK_MS: u64 = 100;
pub const AMBIENT_SPEED_MAX: f32 = 0.5;
pub const AMBIENT_SIZE_MIN: f32 = 1.0;
pub const AMBIENT_SIZE_MAX: f32 = 3.0;
pub const AMBIENT_LIFE_MIN: f32 = 0.5;

// Bursts
pub const BURST_PARTICLES_PER_DENSITY: f32 = 50.0;
pub const BURST_SPEED_MIN: f32 = 2.0;
pub const BURST_SPEED_MAX: f32 = 7.0;
pub const BURST_SIZE_MIN: f32 = 2.0;
pub const BURST_SIZE_MAX: f32 = 6.0;
pub const DEFAULT_BURST_RADIUS: f32 = 100.0; // radius at which speeds are unscaled
pub const BURST_DISTORTION: f32 = 0.8;
pub const BURST_DISTORTION_MS: u64 = 300;

// Pulses
pub const DEFAULT_DISTORTION_MS: u64 = 500;
pub const MAX_PULSE_MS: u64 = 60_000; // longer requests are shortened to this
pub const DEFAULT_GLITCH_AMOUNT: f32 = 0.2;
pub const DEFAULT_GLITCH_MS: u64 = 200;
pub const GLITCH_FLICKER_BOOST: f32 = 0.3;
pub const GLITCH_CEILING: f32 = 1.0;

// Transitions
pub const TRANSITION_INTENSITY_SCALE: f32 = 2.0;
pub const TRANSITION_GLITCH_AMOUNT: f32 = 0.5;
pub const TRANSITION_MS: u64 = 1000;
pub const TRANSITION_BURSTS: u32 = 200;
pub const TRANSITION_BURST_STAGGER_MS: u64 = 10;
pub const DISABLED_TRANSITION_MS: u64 = 500;

// Uniform defaults
pub const DEFAULT_POINTER: [f32; 2] = [0.5, 0.5]; // normalized, screen centre
