mod curve;

use serde::{Deserialize, Serialize};

use crate::control::DesktopKey;

pub use curve::{CurveKey, InputCurve};

pub const TOGGLE_THRESHOLD_RANGE_SECONDS: (f32, f32) = (0.1, 5.0);
pub const MAX_SPEED_RANGE: (f32, f32) = (1.0, 50.0);
pub const DESKTOP_SPEED_FRACTION_RANGE: (f32, f32) = (0.1, 1.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMethod {
    /// Two activation presses within the toggle threshold.
    #[default]
    DoubleActivation,
    /// Five activation presses, each within the toggle threshold of the last.
    QuintupleActivation,
}

/// Serialized noclip settings, loaded by the host application.
///
/// Missing fields take their defaults; values outside the supported ranges are
/// clamped by [`NoclipConfig::normalized`] when a controller is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoclipConfig {
    pub trigger_method: TriggerMethod,
    pub toggle_threshold_seconds: f32,
    /// Maximum speed in world units per second.
    pub max_speed: f32,
    pub vr_input_curve: InputCurve,
    /// Speed multiplier applied on desktop while the sprint key is not held.
    pub desktop_speed_fraction: f32,
    pub desktop_vertical_input: bool,
    pub up_key: DesktopKey,
    pub down_key: DesktopKey,
    pub sprint_key: DesktopKey,
    pub restrict_to_allowlist: bool,
    pub allowed_identities: Vec<String>,
    /// Skips the allowlist check entirely. Meant for development builds.
    pub debug_bypass_access_control: bool,
}

impl Default for NoclipConfig {
    fn default() -> Self {
        Self {
            trigger_method: TriggerMethod::DoubleActivation,
            toggle_threshold_seconds: 0.25,
            max_speed: 15.0,
            vr_input_curve: InputCurve::identity(),
            desktop_speed_fraction: 0.25,
            desktop_vertical_input: true,
            up_key: DesktopKey::E,
            down_key: DesktopKey::Q,
            sprint_key: DesktopKey::LeftShift,
            restrict_to_allowlist: false,
            allowed_identities: Vec::new(),
            debug_bypass_access_control: false,
        }
    }
}

impl NoclipConfig {
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.toggle_threshold_seconds = clamp_or_default(
            self.toggle_threshold_seconds,
            TOGGLE_THRESHOLD_RANGE_SECONDS,
            defaults.toggle_threshold_seconds,
        );
        self.max_speed = clamp_or_default(self.max_speed, MAX_SPEED_RANGE, defaults.max_speed);
        self.desktop_speed_fraction = clamp_or_default(
            self.desktop_speed_fraction,
            DESKTOP_SPEED_FRACTION_RANGE,
            defaults.desktop_speed_fraction,
        );
        self
    }
}

fn clamp_or_default(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let config: NoclipConfig =
            serde_json::from_value(json!({ "max_speed": 20.0 })).expect("config");
        assert_eq!(config.max_speed, 20.0);
        assert_eq!(config.trigger_method, TriggerMethod::DoubleActivation);
        assert_eq!(config.toggle_threshold_seconds, 0.25);
        assert_eq!(config.vr_input_curve, InputCurve::identity());
        assert_eq!(config.up_key, DesktopKey::E);
        assert_eq!(config.down_key, DesktopKey::Q);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_value::<NoclipConfig>(json!({ "max_sped": 20.0 }));
        assert!(result.is_err());
    }

    #[test]
    fn full_config_parses_every_field() {
        let config: NoclipConfig = serde_json::from_value(json!({
            "trigger_method": "quintuple_activation",
            "toggle_threshold_seconds": 1.0,
            "max_speed": 30.0,
            "vr_input_curve": [
                { "input": 0.0, "output": 0.0 },
                { "input": 1.0, "output": 0.5 }
            ],
            "desktop_speed_fraction": 0.5,
            "desktop_vertical_input": false,
            "up_key": "space",
            "down_key": "left_control",
            "sprint_key": "right_shift",
            "restrict_to_allowlist": true,
            "allowed_identities": ["alice", "bob"],
            "debug_bypass_access_control": true
        }))
        .expect("config");

        assert_eq!(config.trigger_method, TriggerMethod::QuintupleActivation);
        assert_eq!(config.up_key, DesktopKey::Space);
        assert_eq!(config.sprint_key, DesktopKey::RightShift);
        assert!(config.restrict_to_allowlist);
        assert_eq!(config.allowed_identities, vec!["alice", "bob"]);
        assert!((config.vr_input_curve.evaluate(1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let config = NoclipConfig {
            toggle_threshold_seconds: 0.0,
            max_speed: 500.0,
            desktop_speed_fraction: f32::NAN,
            ..NoclipConfig::default()
        }
        .normalized();

        assert_eq!(config.toggle_threshold_seconds, 0.1);
        assert_eq!(config.max_speed, 50.0);
        assert_eq!(config.desktop_speed_fraction, 0.25);
    }
}
