#![cfg(target_arch = "wasm32")]
use fx_core::constants::*;
use fx_core::{EffectsEngine, EngineOptions, FxError, Settings, SettingsPatch};
use glam::{Vec2, Vec3};
use instant::Instant;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod constants;
mod convert;
mod dom;
mod frame;
mod layer;
mod overlay;
mod render;
mod timers;

use constants::MAX_EFFECT_DURATION_MS;
use frame::{Driver, Runtime};
use layer::ParticleLayer;
use render::GpuSurface;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fx-web loaded");
    Ok(())
}

/// Read a partial settings object. Anything unparsable is logged and treated
/// as an empty update.
fn parse_patch(value: &JsValue) -> SettingsPatch {
    if value.is_undefined() || value.is_null() {
        return SettingsPatch::default();
    }
    let json = match js_sys::JSON::stringify(value) {
        Ok(s) => String::from(s),
        Err(e) => {
            log::warn!("[fx] settings not serializable: {:?}", e);
            return SettingsPatch::default();
        }
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("[fx] settings ignored: {}", e);
        SettingsPatch::default()
    })
}

async fn init_surfaces(
    gpu_canvas: Option<web::HtmlCanvasElement>,
    particle_canvas: Option<web::HtmlCanvasElement>,
) -> Result<(GpuSurface, ParticleLayer), FxError> {
    let gpu_canvas = gpu_canvas.ok_or(FxError::SurfaceMissing("gpuCanvas"))?;
    let particle_canvas = particle_canvas.ok_or(FxError::SurfaceMissing("particleCanvas"))?;
    let layer = ParticleLayer::new(particle_canvas)?;
    let gpu = GpuSurface::initialize(gpu_canvas).await?;
    Ok((gpu, layer))
}

/// Handle owned by the page controller. Every method is safe to call in any
/// state; after `dispose` they do nothing.
#[wasm_bindgen]
pub struct ShaderEffects {
    driver: Rc<Driver>,
}

#[wasm_bindgen]
impl ShaderEffects {
    /// Build both surfaces and the engine. Initialization failures are
    /// logged, leave effects disabled with the canvases hidden, and still
    /// resolve to a usable handle.
    pub async fn create(
        gpu_canvas: Option<web::HtmlCanvasElement>,
        particle_canvas: Option<web::HtmlCanvasElement>,
        settings: JsValue,
    ) -> ShaderEffects {
        let canvases: Vec<web::HtmlCanvasElement> = gpu_canvas
            .iter()
            .chain(particle_canvas.iter())
            .cloned()
            .collect();
        let settings = Settings::default().merged(&parse_patch(&settings));
        let options = EngineOptions {
            seed: rand::random(),
            ..Default::default()
        };
        let mut engine = EffectsEngine::new(settings, options, Instant::now());

        let (gpu, layer, available) = match init_surfaces(gpu_canvas, particle_canvas).await {
            Ok((gpu, layer)) => (Some(gpu), Some(layer), true),
            Err(e) => {
                log::error!("[fx] effects unavailable: {}", e);
                engine.update_settings(&SettingsPatch {
                    enabled: Some(false),
                    ..Default::default()
                });
                engine.halt_ambient();
                (None, None, false)
            }
        };

        let mut runtime = Runtime {
            engine,
            render_loop: Default::default(),
            gpu,
            layer,
            canvases,
            available,
        };
        match dom::viewport_size() {
            Ok((w, h)) => runtime.resize(w, h),
            Err(e) => log::warn!("[fx] initial size unknown: {:?}", e),
        }
        let enabled = runtime.engine.settings().enabled;
        runtime.set_visible(enabled);

        let driver = Driver::new(runtime);
        if available {
            driver.schedule_timers();
        }
        if enabled {
            driver.start();
        }
        ShaderEffects { driver }
    }

    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&self, partial: JsValue) {
        let mut patch = parse_patch(&partial);
        let (was, now) = {
            let mut rt = self.driver.runtime.borrow_mut();
            if !rt.available {
                // no retry after a failed init
                patch.enabled = None;
            }
            let was = rt.engine.settings().enabled;
            rt.engine.update_settings(&patch);
            (was, rt.engine.settings().enabled)
        };
        if was != now {
            if now {
                self.driver.runtime.borrow().set_visible(true);
                self.driver.start();
            } else {
                self.driver.stop();
                self.driver.runtime.borrow().set_visible(false);
            }
        }
        self.driver.schedule_timers();
    }

    #[wasm_bindgen(js_name = updatePointerPosition)]
    pub fn update_pointer_position(&self, x: f32, y: f32) {
        self.driver
            .runtime
            .borrow_mut()
            .engine
            .update_pointer_position(x, y);
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.driver.runtime.borrow_mut().resize(width, height);
    }

    #[wasm_bindgen(js_name = triggerDistortion)]
    pub fn trigger_distortion(&self, intensity: f32, duration_ms: Option<f64>) {
        let duration =
            convert::duration_from_ms(duration_ms, DEFAULT_DISTORTION_MS, MAX_EFFECT_DURATION_MS);
        self.driver
            .runtime
            .borrow_mut()
            .engine
            .trigger_distortion(Instant::now(), intensity, duration);
        self.driver.schedule_timers();
    }

    #[wasm_bindgen(js_name = triggerGlitch)]
    pub fn trigger_glitch(&self, amount: Option<f32>, duration_ms: Option<f64>) {
        let duration =
            convert::duration_from_ms(duration_ms, DEFAULT_GLITCH_MS, MAX_EFFECT_DURATION_MS);
        self.driver.runtime.borrow_mut().engine.trigger_glitch(
            Instant::now(),
            amount.unwrap_or(DEFAULT_GLITCH_AMOUNT),
            duration,
        );
        self.driver.schedule_timers();
    }

    /// `x`, `y` are normalized layer coordinates. Returns how many particles
    /// were spawned.
    #[wasm_bindgen(js_name = triggerBurst)]
    pub fn trigger_burst(
        &self,
        x: f32,
        y: f32,
        color: Option<Vec<f32>>,
        radius: Option<f32>,
    ) -> u32 {
        let color = color
            .as_deref()
            .and_then(convert::parse_color)
            .map(Vec3::from);
        let spawned = self.driver.runtime.borrow_mut().engine.trigger_burst(
            Instant::now(),
            Vec2::new(x, y),
            color,
            radius,
        );
        self.driver.schedule_timers();
        spawned as u32
    }

    #[wasm_bindgen(js_name = triggerTransition)]
    pub fn trigger_transition(&self, on_complete: js_sys::Function) {
        let done = Box::new(move || {
            if let Err(e) = on_complete.call0(&JsValue::NULL) {
                log::warn!("[fx] transition callback threw: {:?}", e);
            }
        });
        let immediate = self
            .driver
            .runtime
            .borrow_mut()
            .engine
            .trigger_transition(Instant::now(), done);
        // the runtime borrow is released: the callback may call back in
        if let Some(done) = immediate {
            done();
        }
        self.driver.schedule_timers();
    }

    pub fn start(&self) -> bool {
        self.driver.start()
    }

    pub fn stop(&self) {
        self.driver.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> u32 {
        self.driver.runtime.borrow().engine.particles().len() as u32
    }

    pub fn dispose(&self) {
        self.driver.dispose();
    }
}
