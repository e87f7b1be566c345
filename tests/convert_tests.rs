// Host-side tests for the JS-facing conversions.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
#[path = "../src/convert.rs"]
mod convert;

use convert::*;
use std::time::Duration;

#[test]
fn duration_defaults_and_clamps() {
    assert_eq!(duration_from_ms(None, 500, 60_000.0), Duration::from_millis(500));
    assert_eq!(duration_from_ms(Some(f64::NAN), 200, 60_000.0), Duration::from_millis(200));
    assert_eq!(duration_from_ms(Some(-40.0), 200, 60_000.0), Duration::ZERO);
    assert_eq!(duration_from_ms(Some(250.0), 200, 60_000.0), Duration::from_millis(250));
    assert_eq!(
        duration_from_ms(Some(f64::INFINITY), 200, 60_000.0),
        Duration::from_secs(60)
    );
}

#[test]
fn color_needs_three_finite_channels() {
    assert_eq!(parse_color(&[1.0, 0.5, 0.0]), Some([1.0, 0.5, 0.0]));
    assert_eq!(parse_color(&[2.0, -1.0, 0.25, 9.0]), Some([1.0, 0.0, 0.25]));
    assert_eq!(parse_color(&[1.0, 0.5]), None);
    assert_eq!(parse_color(&[f32::NAN, 0.5, 0.5]), None);
    assert_eq!(parse_color(&[]), None);
}

#[test]
fn pixel_ratio_is_capped() {
    assert_eq!(clamp_pixel_ratio(3.0, 2.0), 2.0);
    assert_eq!(clamp_pixel_ratio(1.5, 2.0), 1.5);
    assert_eq!(clamp_pixel_ratio(0.5, 2.0), 1.0);
    assert_eq!(clamp_pixel_ratio(f64::NAN, 2.0), 1.0);
}

#[test]
fn backing_size_scales_and_bounds() {
    assert_eq!(backing_size(800.0, 600.0, 2.0, 8192), (1600, 1200));
    assert_eq!(backing_size(0.0, -5.0, 2.0, 8192), (1, 1));
    assert_eq!(backing_size(10_000.0, 600.0, 1.0, 4096), (4096, 600));
    assert_eq!(backing_size(f32::NAN, 600.0, 1.0, 4096), (1, 600));
}

#[test]
fn css_rgba_formats_bytes_and_alpha() {
    assert_eq!(css_rgba([0.0, 0.0, 0.0], 0.1), "rgba(0,0,0,0.100)");
    assert_eq!(css_rgba([1.0, 0.5, 2.0], 0.7), "rgba(255,128,255,0.700)");
    assert_eq!(css_rgba([0.0, 0.0, 0.0], f32::NAN), "rgba(0,0,0,0.000)");
}

#[test]
fn delay_rounds_up_and_caps() {
    assert_eq!(delay_ms(Duration::ZERO, 60_000), 0);
    assert_eq!(delay_ms(Duration::from_micros(10_001), 60_000), 11);
    assert_eq!(delay_ms(Duration::from_millis(16), 60_000), 16);
    assert_eq!(delay_ms(Duration::from_secs(600), 60_000), 60_000);
}
