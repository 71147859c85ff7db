mod access;
mod controller;
mod input;
mod motion;
mod timers;
mod trigger;

pub use access::{AccessGate, AccessPolicy};
pub use controller::{
    ActivationSource, DeactivationReason, DeviceMode, NoclipController, NoclipSnapshot,
    ToggleOutcome,
};
pub use input::{DesktopKey, InputEvent};
pub use motion::{exit_velocity, MotionSettings};
