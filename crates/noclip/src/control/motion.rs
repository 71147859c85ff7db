use glam::{Quat, Vec3};

use crate::config::{InputCurve, NoclipConfig};

use super::input::{DesktopKey, InputState};

/// Runtime-mutable motion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSettings {
    pub speed: f32,
    pub vr_input_curve: InputCurve,
    pub desktop_speed_fraction: f32,
    pub desktop_vertical_input: bool,
    pub up_key: DesktopKey,
    pub down_key: DesktopKey,
    pub sprint_key: DesktopKey,
}

impl MotionSettings {
    pub fn from_config(config: &NoclipConfig) -> Self {
        Self {
            speed: config.max_speed,
            vr_input_curve: config.vr_input_curve.clone(),
            desktop_speed_fraction: config.desktop_speed_fraction,
            desktop_vertical_input: config.desktop_vertical_input,
            up_key: config.up_key,
            down_key: config.down_key,
            sprint_key: config.sprint_key,
        }
    }
}

/// Position state for one noclip session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct MotionIntegrator {
    position: Vec3,
    previous_position: Vec3,
    last_delta_time: f32,
}

impl MotionIntegrator {
    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    /// Re-anchors on the avatar's real position and forgets any stale motion.
    pub(crate) fn anchor(&mut self, position: Vec3) {
        self.position = position;
        self.previous_position = position;
        self.last_delta_time = 0.0;
    }

    pub(crate) fn begin_tick(&mut self, delta_time: f32) {
        self.previous_position = self.position;
        self.last_delta_time = delta_time;
    }

    pub(crate) fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub(crate) fn exit_velocity(&self) -> Vec3 {
        exit_velocity(self.position, self.previous_position, self.last_delta_time)
    }
}

/// Velocity carried out of noclip so the avatar keeps flying instead of stopping dead.
pub fn exit_velocity(position: Vec3, previous_position: Vec3, delta_time: f32) -> Vec3 {
    if !delta_time.is_finite() || delta_time <= f32::EPSILON {
        return Vec3::ZERO;
    }
    (position - previous_position) / delta_time
}

pub(crate) fn vr_delta(
    input: &InputState,
    head_rotation: Quat,
    settings: &MotionSettings,
    delta_time: f32,
) -> Vec3 {
    let delta_time_speed = delta_time * settings.speed;
    let move_input = Vec3::new(
        InputState::axis_or_zero(input.move_horizontal),
        0.0,
        InputState::axis_or_zero(input.move_vertical),
    );
    let planar = move_input.normalize_or_zero()
        * settings.vr_input_curve.evaluate(move_input.length())
        * delta_time_speed;

    let look = InputState::axis_or_zero(input.look_vertical);
    let vertical = settings.vr_input_curve.evaluate(look.abs()) * look.signum() * delta_time_speed;

    head_rotation * planar + Vec3::new(0.0, vertical, 0.0)
}

pub(crate) fn desktop_delta(
    input: &InputState,
    head_rotation: Quat,
    settings: &MotionSettings,
    delta_time: f32,
) -> Vec3 {
    let speed_fraction = if input.keys.is_down(settings.sprint_key) {
        1.0
    } else {
        settings.desktop_speed_fraction
    };
    let delta_time_speed = delta_time * settings.speed * speed_fraction;

    let move_input = Vec3::new(
        InputState::axis_or_zero(input.move_horizontal),
        0.0,
        InputState::axis_or_zero(input.move_vertical),
    );
    let mut delta = head_rotation * (move_input.normalize_or_zero() * delta_time_speed);

    if settings.desktop_vertical_input {
        let mut world_vertical = 0.0;
        if input.keys.is_down(settings.up_key) {
            world_vertical += 1.0;
        }
        if input.keys.is_down(settings.down_key) {
            world_vertical -= 1.0;
        }
        delta.y += world_vertical * delta_time_speed;
    }

    delta
}
