pub mod constants;
pub mod engine;
pub mod error;
pub mod particles;
pub mod pulse;
pub mod render_loop;
pub mod settings;
pub mod surface;
pub mod timeline;
pub mod uniforms;
pub static EFFECTS_WGSL: &str = include_str!("../shaders/effects.wgsl");

pub use engine::*;
pub use error::*;
pub use particles::*;
pub use pulse::{Perturbation, PulseChannel, PulseId};
pub use render_loop::*;
pub use settings::*;
pub use surface::*;
pub use timeline::*;
pub use uniforms::*;
