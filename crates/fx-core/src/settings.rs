//! User-facing effect settings and the partial-update channel.
//!
//! `Settings` is a plain value snapshot. Front-ends never mutate it directly;
//! they send a `SettingsPatch` which names exactly the recognized keys. Any
//! other key in an incoming JSON object is ignored by serde.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    pub intensity: f32,
    pub aberration: f32,
    pub flicker: f32,
    pub particle_density: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 1.0,
            aberration: 0.5,
            flicker: 0.3,
            particle_density: 0.7,
        }
    }
}

impl Settings {
    /// Copy of `self` with every key present in `patch` applied.
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(v) = patch.intensity.and_then(unit) {
            self.intensity = v;
        }
        if let Some(v) = patch.aberration.and_then(unit) {
            self.aberration = v;
        }
        if let Some(v) = patch.flicker.and_then(unit) {
            self.flicker = v;
        }
        if let Some(v) = patch.particle_density.and_then(unit) {
            self.particle_density = v;
        }
        self
    }
}

/// Shallow partial update; `None` leaves the current value alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub enabled: Option<bool>,
    pub intensity: Option<f32>,
    pub aberration: Option<f32>,
    pub flicker: Option<f32>,
    pub particle_density: Option<f32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Clamp to [0, 1]; non-finite input is rejected so the old value survives.
#[inline]
pub fn unit(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}
