// Host-side tests for the effect scheduler. Time is virtual: every call
// takes an explicit instant offset from a fixed origin.

use fx_core::constants::*;
use fx_core::*;
use glam::{Vec2, Vec3};
use instant::Instant;
use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn scenario_settings() -> Settings {
    Settings {
        enabled: true,
        aberration: 0.5,
        flicker: 0.3,
        intensity: 1.0,
        particle_density: 0.7,
    }
}

fn make_engine(settings: Settings) -> (EffectsEngine, Instant) {
    let t0 = Instant::now();
    let mut engine = EffectsEngine::new(settings, EngineOptions::default(), t0);
    engine.resize(800.0, 600.0);
    (engine, t0)
}

/// Run due work and invoke completions; returns how many completed.
fn pump(engine: &mut EffectsEngine, now: Instant) -> usize {
    let done = engine.run_due(now);
    let n = done.len();
    for f in done {
        f();
    }
    n
}

fn counter() -> (Rc<Cell<u32>>, OnComplete) {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    (hits, Box::new(move || h.set(h.get() + 1)))
}

#[test]
fn glitch_raises_then_restores_exact_baseline() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_glitch(t0, 0.2, ms(200));
    assert_eq!(engine.settings().aberration, (0.5f32 + 0.2).min(1.0));
    assert_eq!(engine.settings().flicker, (0.3f32 + 0.3).min(1.0));

    pump(&mut engine, t0 + ms(199));
    assert!(engine.settings().aberration > 0.5);

    pump(&mut engine, t0 + ms(200));
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.settings().flicker, 0.3);
}

#[test]
fn glitch_is_clamped_at_one() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_glitch(t0, 0.9, ms(50));
    assert_eq!(engine.settings().aberration, 1.0);
    pump(&mut engine, t0 + ms(50));
    assert_eq!(engine.settings().aberration, 0.5);
}

#[test]
fn short_glitch_inside_long_glitch_does_not_cut_it_short() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_glitch(t0, 0.2, ms(500));
    let outer = engine.settings().aberration;
    engine.trigger_glitch(t0 + ms(50), 0.4, ms(100));
    assert_eq!(engine.settings().aberration, (0.5f32 + 0.4).min(1.0));

    pump(&mut engine, t0 + ms(150));
    assert_eq!(engine.settings().aberration, outer);

    pump(&mut engine, t0 + ms(500));
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.settings().flicker, 0.3);
}

#[test]
fn settings_update_during_glitch_becomes_new_baseline() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_glitch(t0, 0.2, ms(200));
    engine.update_settings(&SettingsPatch {
        aberration: Some(0.1),
        ..Default::default()
    });
    assert!((engine.settings().aberration - 0.3).abs() < 1e-6);
    pump(&mut engine, t0 + ms(200));
    assert_eq!(engine.settings().aberration, 0.1);
}

#[test]
fn distortion_returns_to_zero() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_distortion(t0, 3.0, ms(DEFAULT_DISTORTION_MS));
    assert_eq!(engine.distortion(), 3.0);
    pump(&mut engine, t0 + ms(499));
    assert_eq!(engine.distortion(), 3.0);
    pump(&mut engine, t0 + ms(500));
    assert_eq!(engine.distortion(), 0.0);

    engine.trigger_distortion(t0 + ms(600), -2.0, ms(100));
    assert_eq!(engine.distortion(), 0.0);
    engine.trigger_distortion(t0 + ms(600), f32::NAN, ms(100));
    assert_eq!(engine.distortion(), 0.0);
}

#[test]
fn burst_scenario_spawns_35_and_pulses_distortion() {
    let (mut engine, t0) = make_engine(scenario_settings());
    let spawned = engine.trigger_burst(t0, Vec2::new(0.5, 0.5), None, None);
    assert_eq!(spawned, 35);
    assert_eq!(engine.particles().len(), 35);
    assert!(engine
        .particles()
        .iter()
        .all(|p| p.position == Vec2::new(400.0, 300.0)));
    assert_eq!(engine.uniforms().distortion, 0.8);

    pump(&mut engine, t0 + ms(299));
    assert_eq!(engine.uniforms().distortion, 0.8);
    pump(&mut engine, t0 + ms(300));
    assert_eq!(engine.uniforms().distortion, 0.0);
}

#[test]
fn full_density_burst_covers_the_circle_evenly() {
    let settings = Settings {
        particle_density: 1.0,
        ..scenario_settings()
    };
    let (mut engine, t0) = make_engine(settings);
    assert_eq!(engine.trigger_burst(t0, Vec2::new(0.25, 0.75), None, None), 50);

    for (i, p) in engine.particles().iter().enumerate() {
        let expected = TAU * i as f32 / 50.0;
        let angle = p.velocity.y.atan2(p.velocity.x).rem_euclid(TAU);
        let diff = (angle - expected).abs();
        assert!(diff.min(TAU - diff) < 1e-4, "particle {i}: {angle} vs {expected}");
        let speed = p.velocity.length();
        assert!((BURST_SPEED_MIN..BURST_SPEED_MAX + 1e-4).contains(&speed));
        // default colours are pastel
        assert!(p.color.min_element() >= 0.5);
    }
}

#[test]
fn burst_radius_scales_speed_and_colour_is_kept() {
    let (mut engine, t0) = make_engine(scenario_settings());
    let color = Vec3::new(1.0, 0.0, 0.5);
    engine.trigger_burst(t0, Vec2::ZERO, Some(color), Some(200.0));
    for p in engine.particles().iter() {
        let speed = p.velocity.length();
        assert!(speed >= 2.0 * BURST_SPEED_MIN - 1e-4);
        assert!(speed < 2.0 * BURST_SPEED_MAX + 1e-4);
        assert_eq!(p.color, color);
    }
}

#[test]
fn triggers_are_ignored_while_disabled() {
    let settings = Settings {
        enabled: false,
        ..scenario_settings()
    };
    let (mut engine, t0) = make_engine(settings);
    assert_eq!(engine.trigger_burst(t0, Vec2::new(0.5, 0.5), None, None), 0);
    engine.trigger_glitch(t0, 0.2, ms(200));
    engine.trigger_distortion(t0, 0.5, ms(200));
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.distortion(), 0.0);
    assert!(engine.particles().is_empty());
}

#[test]
fn huge_durations_are_capped_instead_of_overflowing() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_distortion(t0, 0.5, Duration::MAX);
    engine.trigger_glitch(t0, 0.2, Duration::from_secs(u64::MAX / 2));
    assert_eq!(engine.distortion(), 0.5);
    assert!(engine.settings().aberration > 0.5);

    pump(&mut engine, t0 + ms(MAX_PULSE_MS - 1));
    assert_eq!(engine.distortion(), 0.5);
    pump(&mut engine, t0 + ms(MAX_PULSE_MS));
    assert_eq!(engine.distortion(), 0.0);
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.settings().flicker, 0.3);
}

#[test]
fn zero_duration_pulses_restore_in_the_same_pass() {
    let (mut engine, t0) = make_engine(scenario_settings());
    engine.trigger_distortion(t0, 0.7, Duration::ZERO);
    engine.trigger_glitch(t0, 0.4, Duration::ZERO);
    assert_eq!(engine.distortion(), 0.7);

    pump(&mut engine, t0);
    assert_eq!(engine.distortion(), 0.0);
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.settings().flicker, 0.3);
}

#[test]
fn transition_completes_once_after_one_second() {
    let (mut engine, t0) = make_engine(scenario_settings());
    let (hits, done) = counter();
    assert!(engine.trigger_transition(t0, done).is_none());
    assert_eq!(engine.settings().intensity, 2.0);
    assert_eq!(engine.settings().aberration, 1.0);

    let mut t = 0;
    while t < 1000 {
        pump(&mut engine, t0 + ms(t));
        t += 16;
    }
    assert_eq!(hits.get(), 0);
    assert_eq!(engine.settings().intensity, 2.0);

    pump(&mut engine, t0 + ms(1000));
    assert_eq!(hits.get(), 1);
    assert_eq!(engine.settings().intensity, 1.0);
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.settings().flicker, 0.3);

    pump(&mut engine, t0 + ms(5000));
    assert_eq!(hits.get(), 1);
    assert_eq!(engine.distortion(), 0.0);
    assert!(!engine.particles().is_empty());
}

#[test]
fn transition_bursts_are_staggered() {
    let (mut engine, t0) = make_engine(Settings {
        particle_density: 0.1,
        ..scenario_settings()
    });
    let (_hits, done) = counter();
    assert!(engine.trigger_transition(t0, done).is_none());
    // ambient task plus the first burst at t0
    pump(&mut engine, t0);
    let after_first = engine.particles().len();
    pump(&mut engine, t0 + ms(9));
    assert_eq!(engine.particles().len(), after_first);
    pump(&mut engine, t0 + ms(10));
    assert_eq!(engine.particles().len(), after_first + 5);
}

#[test]
fn disabled_transition_completes_at_half_second() {
    let settings = Settings {
        enabled: false,
        ..scenario_settings()
    };
    let (mut engine, t0) = make_engine(settings);
    let (hits, done) = counter();
    assert!(engine.trigger_transition(t0, done).is_none());
    assert_eq!(engine.settings().intensity, 1.0);
    pump(&mut engine, t0 + ms(499));
    assert_eq!(hits.get(), 0);
    pump(&mut engine, t0 + ms(500));
    assert_eq!(hits.get(), 1);
    pump(&mut engine, t0 + ms(2000));
    assert_eq!(hits.get(), 1);
}

#[test]
fn transition_still_completes_when_disabled_midway() {
    let (mut engine, t0) = make_engine(scenario_settings());
    let (hits, done) = counter();
    assert!(engine.trigger_transition(t0, done).is_none());
    pump(&mut engine, t0 + ms(300));
    engine.update_settings(&SettingsPatch {
        enabled: Some(false),
        ..Default::default()
    });
    pump(&mut engine, t0 + ms(1000));
    assert_eq!(hits.get(), 1);
    assert_eq!(engine.settings().intensity, 1.0);
    assert!(engine.particles().is_empty());
}

#[test]
fn dispose_restores_baselines_and_hands_back_completions() {
    let (mut engine, t0) = make_engine(scenario_settings());
    let (hits, done) = counter();
    assert!(engine.trigger_transition(t0, done).is_none());
    engine.trigger_burst(t0, Vec2::new(0.5, 0.5), None, None);

    let pending = engine.dispose();
    assert_eq!(pending.len(), 1);
    for f in pending {
        f();
    }
    assert_eq!(hits.get(), 1);
    assert!(engine.is_disposed());
    assert_eq!(engine.settings().intensity, 1.0);
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.settings().flicker, 0.3);
    assert_eq!(engine.distortion(), 0.0);
    assert!(engine.particles().is_empty());
    assert_eq!(engine.next_due(), None);

    // nothing left to fire, and later triggers are inert
    assert_eq!(pump(&mut engine, t0 + ms(5000)), 0);
    assert_eq!(engine.trigger_burst(t0, Vec2::ZERO, None, None), 0);
    assert!(engine.dispose().is_empty());
    assert_eq!(hits.get(), 1);
}

#[test]
fn transition_after_dispose_hands_the_callback_back() {
    let (mut engine, t0) = make_engine(scenario_settings());
    assert!(engine.dispose().is_empty());

    let (hits, done) = counter();
    let immediate = engine.trigger_transition(t0, done);
    assert_eq!(engine.next_due(), None);
    let Some(done) = immediate else {
        panic!("disposed engine kept the transition callback");
    };
    done();
    assert_eq!(hits.get(), 1);
    assert_eq!(pump(&mut engine, t0 + ms(5000)), 0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn halted_ambient_leaves_nothing_scheduled() {
    let (mut engine, t0) = make_engine(scenario_settings());
    pump(&mut engine, t0);
    assert!(engine.next_due().is_some());

    assert!(engine.halt_ambient());
    assert!(!engine.halt_ambient());
    assert_eq!(engine.next_due(), None);
    let before = engine.particles().len();
    for step in 1..50u64 {
        pump(&mut engine, t0 + ms(step * 16));
    }
    assert_eq!(engine.particles().len(), before);

    // other work still runs
    engine.trigger_glitch(t0 + ms(800), 0.2, ms(100));
    pump(&mut engine, t0 + ms(900));
    assert_eq!(engine.settings().aberration, 0.5);
    assert_eq!(engine.next_due(), None);
}

#[test]
fn ambient_spawning_levels_to_density() {
    let (mut engine, t0) = make_engine(Settings {
        particle_density: 0.1,
        ..scenario_settings()
    });
    for step in 0..200u64 {
        pump(&mut engine, t0 + ms(step * 16));
    }
    assert_eq!(engine.particles().len(), 10);
    assert!(engine.particles().iter().all(|p| {
        p.velocity.abs().max_element() <= AMBIENT_SPEED_MAX
            && p.position.x <= 800.0
            && p.position.y <= 600.0
    }));
}

#[test]
fn ambient_spawning_pauses_while_disabled() {
    let (mut engine, t0) = make_engine(Settings {
        enabled: false,
        ..scenario_settings()
    });
    for step in 0..50u64 {
        pump(&mut engine, t0 + ms(step * 16));
    }
    assert!(engine.particles().is_empty());
    assert!(engine.next_due().is_some());
}

#[test]
fn pointer_is_normalized_and_flipped() {
    let (mut engine, _t0) = make_engine(scenario_settings());
    assert_eq!(engine.uniforms().pointer, Vec2::new(0.5, 0.5));
    engine.update_pointer_position(200.0, 150.0);
    assert_eq!(engine.uniforms().pointer, Vec2::new(0.25, 0.75));
    engine.update_pointer_position(-50.0, 9000.0);
    assert_eq!(engine.uniforms().pointer, Vec2::new(0.0, 0.0));
}

#[test]
fn settings_patch_parses_camel_case_and_ignores_unknown_keys() {
    let patch: SettingsPatch = serde_json::from_str(
        r#"{"intensity":0.4,"particleDensity":2.0,"flicker":null,"sparkle":true}"#,
    )
    .unwrap();
    assert_eq!(patch.intensity, Some(0.4));
    assert_eq!(patch.particle_density, Some(2.0));
    assert_eq!(patch.flicker, None);

    let merged = scenario_settings().merged(&patch);
    assert_eq!(merged.intensity, 0.4);
    assert_eq!(merged.particle_density, 1.0);
    assert_eq!(merged.flicker, 0.3);

    let empty: SettingsPatch = serde_json::from_str("{}").unwrap();
    assert!(empty.is_empty());
}

#[test]
fn scaled_count_floors_without_float_drift() {
    assert_eq!(scaled_count(50.0, 0.7), 35);
    assert_eq!(scaled_count(50.0, 1.0), 50);
    assert_eq!(scaled_count(100.0, 0.07), 7);
    assert_eq!(scaled_count(50.0, 0.0), 0);
}
