use crate::constants::MAX_DEVICE_PIXEL_RATIO;
use crate::convert;
use anyhow::anyhow;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window() -> anyhow::Result<web::Window> {
    web::window().ok_or_else(|| anyhow!("no window"))
}

/// Device pixel ratio, capped for the backing stores.
pub fn device_pixel_ratio() -> f64 {
    let raw = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    convert::clamp_pixel_ratio(raw, MAX_DEVICE_PIXEL_RATIO)
}

/// Inner size of the window in CSS pixels.
pub fn viewport_size() -> anyhow::Result<(f32, f32)> {
    let w = window()?;
    let width = w
        .inner_width()
        .map_err(|e| anyhow!("inner_width: {:?}", e))?
        .as_f64()
        .ok_or_else(|| anyhow!("inner_width is not a number"))?;
    let height = w
        .inner_height()
        .map_err(|e| anyhow!("inner_height: {:?}", e))?
        .as_f64()
        .ok_or_else(|| anyhow!("inner_height is not a number"))?;
    Ok((width as f32, height as f32))
}

pub fn context_2d(canvas: &web::HtmlCanvasElement) -> anyhow::Result<web::CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|e| anyhow!("get_context: {:?}", e))?
        .ok_or_else(|| anyhow!("canvas has no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow!("{:?}", e))
}

pub fn set_timeout(callback: &js_sys::Function, delay_ms: i32) -> anyhow::Result<i32> {
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay_ms)
        .map_err(|e| anyhow!("setTimeout: {:?}", e))
}

pub fn clear_timeout(handle: i32) {
    if let Some(w) = web::window() {
        w.clear_timeout_with_handle(handle);
    }
}

pub fn request_animation_frame(callback: &js_sys::Function) -> anyhow::Result<i32> {
    window()?
        .request_animation_frame(callback)
        .map_err(|e| anyhow!("requestAnimationFrame: {:?}", e))
}

pub fn cancel_animation_frame(handle: i32) {
    if let Some(w) = web::window() {
        _ = w.cancel_animation_frame(handle);
    }
}
