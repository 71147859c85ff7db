use std::path::Path;

use noclip::{DesktopKey, InputEvent};
use serde::Deserialize;

use super::loading::{load_json_file, LoadError};

const DEFAULT_DURATION_SECONDS: f32 = 10.0;

/// Timed input for a headless run. Steps are applied in `at` order, before the
/// tick that reaches their timestamp.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct InputScript {
    #[serde(default = "default_duration_seconds")]
    pub(crate) duration_seconds: f32,
    pub(crate) steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptStep {
    pub(crate) at: f32,
    #[serde(default)]
    pub(crate) input: Option<InputEvent>,
    #[serde(default)]
    pub(crate) command: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepAction {
    Input(InputEvent),
    Command(String),
}

fn default_duration_seconds() -> f32 {
    DEFAULT_DURATION_SECONDS
}

impl ScriptStep {
    fn input(at: f32, event: InputEvent) -> Self {
        Self {
            at,
            input: Some(event),
            command: None,
        }
    }

    fn command(at: f32, line: &str) -> Self {
        Self {
            at,
            input: None,
            command: Some(line.to_string()),
        }
    }

    pub(crate) fn action(&self) -> Option<StepAction> {
        match (&self.input, &self.command) {
            (Some(event), None) => Some(StepAction::Input(*event)),
            (None, Some(line)) => Some(StepAction::Command(line.clone())),
            _ => None,
        }
    }
}

impl InputScript {
    pub(crate) fn load(path: &Path) -> Result<Self, LoadError> {
        let script: Self = load_json_file(path)?;
        script.validated()
    }

    pub(crate) fn validated(mut self) -> Result<Self, LoadError> {
        if !self.duration_seconds.is_finite() || self.duration_seconds < 0.0 {
            self.duration_seconds = DEFAULT_DURATION_SECONDS;
        }
        for (index, step) in self.steps.iter().enumerate() {
            if !step.at.is_finite() || step.at < 0.0 {
                return Err(LoadError::InvalidStep {
                    index,
                    message: format!("'at' must be a non-negative time, got {}", step.at),
                });
            }
            if step.action().is_none() {
                return Err(LoadError::InvalidStep {
                    index,
                    message: "expected exactly one of 'input' or 'command'".to_string(),
                });
            }
        }
        self.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(self)
    }

    /// Desktop flight walkthrough used when no script path is configured.
    pub(crate) fn demo() -> Self {
        let press = |at| ScriptStep::input(at, InputEvent::Activation { pressed: true });
        let release = |at| ScriptStep::input(at, InputEvent::Activation { pressed: false });
        let key_step = |at, key, pressed| ScriptStep::input(at, InputEvent::Key { key, pressed });

        Self {
            duration_seconds: 9.0,
            steps: vec![
                press(0.5),
                release(0.55),
                press(0.65),
                release(0.7),
                ScriptStep::command(0.75, "look 30 10"),
                ScriptStep::input(0.8, InputEvent::MoveVertical { value: 1.0 }),
                key_step(1.0, DesktopKey::E, true),
                key_step(1.5, DesktopKey::E, false),
                key_step(2.0, DesktopKey::LeftShift, true),
                ScriptStep::command(2.5, "noclip_speed 25"),
                key_step(3.0, DesktopKey::LeftShift, false),
                ScriptStep::command(3.5, "status"),
                press(4.0),
                release(4.05),
                press(4.15),
                ScriptStep::input(4.2, InputEvent::MoveVertical { value: 0.0 }),
                ScriptStep::command(5.5, "restrict on"),
                ScriptStep::command(5.6, "noclip on"),
                ScriptStep::command(6.0, "allow_self"),
                ScriptStep::command(6.1, "noclip on"),
                ScriptStep::command(7.0, "sit"),
                ScriptStep::command(7.5, "stand"),
                ScriptStep::command(8.0, "respawn"),
                ScriptStep::command(8.5, "status"),
            ],
        }
    }
}
