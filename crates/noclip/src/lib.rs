//! Togglable free-flight ("noclip") movement for a locally controlled avatar.
//!
//! [`NoclipController`] owns one avatar's session. The embedding application
//! implements [`AvatarHost`] for its avatar handle, forwards raw input through
//! [`NoclipController::on_input_event`] and drives time with
//! [`NoclipController::on_tick`].

pub mod config;
pub mod control;
pub mod host;
#[cfg(test)]
mod test_support;

pub use config::{CurveKey, InputCurve, NoclipConfig, TriggerMethod};
pub use control::{
    exit_velocity, AccessGate, AccessPolicy, ActivationSource, DeactivationReason, DesktopKey,
    DeviceMode, InputEvent, MotionSettings, NoclipController, NoclipSnapshot, ToggleOutcome,
};
pub use host::{
    AvatarHost, SpawnAlignment, TrackingPose, LOCAL_PLAYER_LAYER_MASK, PRESENCE_PROBE_RADIUS,
};
