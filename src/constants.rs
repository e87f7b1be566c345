/// Browser-side tuning for the two effect surfaces.
///
/// Engine timings and particle tuning live in `fx_core::constants`; this
/// file only holds what the DOM and GPU glue need.
// Backing-store scale cap
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Trail fill colour for the particle layer (alpha comes from the core)
pub const TRAIL_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

// Class toggled on both canvases when effects are off
pub const HIDDEN_CLASS: &str = "hidden";

// Full-screen quad, triangle strip order
pub const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

// Longest single setTimeout; later deadlines re-arm on wake
pub const MAX_TIMER_DELAY_MS: i32 = 60_000;

// Upper bound for caller-supplied effect durations
pub const MAX_EFFECT_DURATION_MS: f64 = 60_000.0;
