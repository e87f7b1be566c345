//! Pure conversions between JS-facing values and engine types. Kept free of
//! `web_sys` so host tests can include this file directly.

use std::time::Duration;

/// Caller-supplied milliseconds to a `Duration`. Missing or NaN falls back
/// to `default_ms`; negatives become zero.
pub fn duration_from_ms(ms: Option<f64>, default_ms: u64, max_ms: f64) -> Duration {
    match ms {
        Some(v) if !v.is_nan() => Duration::from_secs_f64(v.clamp(0.0, max_ms) / 1000.0),
        _ => Duration::from_millis(default_ms),
    }
}

/// First three channels of `values` as a 0..1 RGB triple. Short or
/// non-finite input yields `None` so the engine picks its default colour.
pub fn parse_color(values: &[f32]) -> Option<[f32; 3]> {
    match values {
        [r, g, b, ..] if r.is_finite() && g.is_finite() && b.is_finite() => {
            Some([r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)])
        }
        _ => None,
    }
}

/// Device pixel ratio limited to `[1, max]`; nonsense reads as 1.
pub fn clamp_pixel_ratio(dpr: f64, max: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr.clamp(1.0, max.max(1.0))
    } else {
        1.0
    }
}

/// Backing-store size for a logical (CSS) size. Each side is at least 1 and
/// at most `max_dim`.
pub fn backing_size(css_width: f32, css_height: f32, dpr: f64, max_dim: u32) -> (u32, u32) {
    let side = |css: f32| {
        let css = if css.is_finite() { css.max(0.0) as f64 } else { 0.0 };
        ((css * dpr).round() as u32).clamp(1, max_dim.max(1))
    };
    (side(css_width), side(css_height))
}

/// CSS colour string for a canvas fill.
pub fn css_rgba(color: [f32; 3], alpha: f32) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    format!(
        "rgba({},{},{},{:.3})",
        byte(color[0]),
        byte(color[1]),
        byte(color[2]),
        alpha
    )
}

/// Whole milliseconds to wait for `wait`, rounded up so a timer never fires
/// before its deadline.
pub fn delay_ms(wait: Duration, max_ms: i32) -> i32 {
    let ms = wait.as_micros().div_ceil(1000);
    ms.min(max_ms.max(0) as u128) as i32
}
