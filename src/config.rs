use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwipePolicy {
    /// Straight-line displacement from the down point.
    #[default]
    Omnidirectional,
    /// Radial distance from the viewport centre gained since the down point.
    AwayFromCenter,
    /// Horizontal displacement to the right.
    Rightward,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentConfig {
    pub delay_ms: u64,
    pub drag_touch_threshold: u8,
    pub center_radius: f32,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            delay_ms: 50,
            drag_touch_threshold: 3,
            center_radius: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwipeConfig {
    pub policy: SwipePolicy,
    pub start_distance: f32,
    pub end_distance: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            policy: SwipePolicy::Omnidirectional,
            start_distance: 5.0,
            end_distance: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoldConfig {
    pub min_duration_ms: u64,
    /// Hold timer armed on every new touch; `None` leaves arming to the host.
    pub interval_ms: Option<u64>,
    pub min_tap_length_ms: u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 1_200,
            interval_ms: Some(100),
            min_tap_length_ms: 50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationConfig {
    pub tolerance: f32,
    pub significant_tally: u32,
    pub inner_radius: Option<f32>,
    pub outer_radius: Option<f32>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.2,
            significant_tally: 1,
            inner_radius: None,
            outer_radius: None,
        }
    }
}

impl RotationConfig {
    pub fn annulus(&self) -> Option<(f32, f32)> {
        self.inner_radius.zip(self.outer_radius)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub assessment: AssessmentConfig,
    pub swipe: SwipeConfig,
    pub hold: HoldConfig,
    pub rotation: RotationConfig,
}

impl GestureConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.assessment.delay_ms == 0 {
            return Err(invalid("assessment.delay_ms", "must be positive"));
        }
        if self.assessment.drag_touch_threshold < 2 {
            return Err(invalid("assessment.drag_touch_threshold", "must be at least 2"));
        }
        if !(self.assessment.center_radius >= 0.0) {
            return Err(invalid("assessment.center_radius", "must be non-negative"));
        }
        if !(self.swipe.start_distance >= 0.0) {
            return Err(invalid("swipe.start_distance", "must be non-negative"));
        }
        if !(self.swipe.end_distance >= 0.0) {
            return Err(invalid("swipe.end_distance", "must be non-negative"));
        }
        if self.hold.interval_ms == Some(0) {
            return Err(invalid("hold.interval_ms", "must be positive"));
        }
        if !(self.rotation.tolerance > 0.0 && self.rotation.tolerance < 1.0) {
            return Err(invalid("rotation.tolerance", "must lie in (0, 1)"));
        }
        match (self.rotation.inner_radius, self.rotation.outer_radius) {
            (None, None) => Ok(()),
            (Some(inner), Some(outer)) => validate_annulus(inner, outer),
            _ => Err(invalid(
                "rotation.inner_radius",
                "and rotation.outer_radius must be set together",
            )),
        }
    }
}

pub(crate) fn validate_annulus(inner: f32, outer: f32) -> Result<()> {
    if !(inner >= 0.0) {
        return Err(invalid("rotation.inner_radius", "must be non-negative"));
    }
    if !(outer > inner) {
        return Err(invalid("rotation.outer_radius", "must exceed the inner radius"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests;
