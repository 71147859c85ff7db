use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::{InputCurve, NoclipConfig, TriggerMethod};
use crate::host::{AvatarHost, SpawnAlignment, LOCAL_PLAYER_LAYER_MASK, PRESENCE_PROBE_RADIUS};

use super::access::{AccessGate, AccessPolicy};
use super::input::{InputEvent, InputState};
use super::motion::{desktop_delta, vr_delta, MotionIntegrator, MotionSettings};
use super::trigger::TriggerMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    Vr,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationSource {
    Gesture,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivationReason {
    Gesture,
    Api,
    /// The presence probe lost the avatar's collider, usually because it sat down.
    Seated,
    Respawned,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Activated,
    Deactivated,
    Unchanged,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoclipSnapshot {
    pub active: bool,
    pub primed: bool,
    pub consecutive_count: u32,
    pub trigger_method: TriggerMethod,
    pub device_mode: DeviceMode,
    pub position: Vec3,
    pub speed: f32,
    pub access_policy: AccessPolicy,
    pub local_identity_allowed: bool,
    pub clock_seconds: f64,
}

/// Noclip session for one locally controlled avatar.
///
/// The host application feeds input with [`NoclipController::on_input_event`] and
/// advances time with [`NoclipController::on_tick`]. Events delivered before a
/// tick are applied at the clock of the previous tick.
pub struct NoclipController<H: AvatarHost> {
    host: H,
    device_mode: DeviceMode,
    trigger: TriggerMachine,
    gate: AccessGate,
    settings: MotionSettings,
    integrator: MotionIntegrator,
    input: InputState,
    active: bool,
    clock_seconds: f64,
}

impl<H: AvatarHost> NoclipController<H> {
    pub fn new(config: NoclipConfig, host: H) -> Self {
        let config = config.normalized();
        let device_mode = if host.is_in_vr() {
            DeviceMode::Vr
        } else {
            DeviceMode::Desktop
        };
        let policy = if config.restrict_to_allowlist {
            AccessPolicy::Allowlisted
        } else {
            AccessPolicy::Unrestricted
        };
        let local_identity = host.local_identity();
        let gate = AccessGate::new(
            policy,
            config.allowed_identities.iter().cloned(),
            config.debug_bypass_access_control,
            &local_identity,
        );
        info!(
            trigger_method = ?config.trigger_method,
            threshold_seconds = config.toggle_threshold_seconds,
            device_mode = ?device_mode,
            access_policy = ?policy,
            local_identity_allowed = gate.local_identity_allowed(),
            debug_bypass = gate.debug_bypass(),
            "noclip_session_created"
        );

        Self {
            trigger: TriggerMachine::new(config.trigger_method, config.toggle_threshold_seconds),
            settings: MotionSettings::from_config(&config),
            host,
            device_mode,
            gate,
            integrator: MotionIntegrator::default(),
            input: InputState::default(),
            active: false,
            clock_seconds: 0.0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn device_mode(&self) -> DeviceMode {
        self.device_mode
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    pub fn access_gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn position(&self) -> Vec3 {
        self.integrator.position()
    }

    pub fn snapshot(&self) -> NoclipSnapshot {
        NoclipSnapshot {
            active: self.active,
            primed: self.trigger.is_primed(),
            consecutive_count: self.trigger.consecutive_count(),
            trigger_method: self.trigger.method(),
            device_mode: self.device_mode,
            position: self.integrator.position(),
            speed: self.settings.speed,
            access_policy: self.gate.policy(),
            local_identity_allowed: self.gate.local_identity_allowed(),
            clock_seconds: self.clock_seconds,
        }
    }

    pub fn on_input_event(&mut self, event: InputEvent) -> ToggleOutcome {
        match event {
            InputEvent::Activation { pressed } => {
                let rising = pressed && !self.input.activation_held;
                self.input.activation_held = pressed;
                if rising {
                    return self.on_activation_edge();
                }
            }
            InputEvent::MoveHorizontal { value } => self.input.move_horizontal = value,
            InputEvent::MoveVertical { value } => self.input.move_vertical = value,
            InputEvent::LookVertical { value } => {
                if self.active && self.device_mode == DeviceMode::Vr {
                    self.input.look_vertical = value;
                }
            }
            InputEvent::Key { key, pressed } => self.input.keys.set(key, pressed),
        }
        ToggleOutcome::Unchanged
    }

    /// Feeds one rising edge of the activation control to the trigger machine.
    pub fn on_activation_edge(&mut self) -> ToggleOutcome {
        if !self.trigger.on_activation_edge(self.clock_seconds) {
            return ToggleOutcome::Unchanged;
        }
        if self.active {
            self.deactivate(DeactivationReason::Gesture)
        } else {
            self.activate(ActivationSource::Gesture)
        }
    }

    pub fn on_tick(&mut self, delta_time: f32) {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        self.clock_seconds += f64::from(delta_time);
        self.trigger.advance_to(self.clock_seconds);

        if !self.active {
            return;
        }

        self.integrator.begin_tick(delta_time);
        let avatar_position = self.host.position();

        if self
            .host
            .probe_presence(avatar_position, PRESENCE_PROBE_RADIUS, LOCAL_PLAYER_LAYER_MASK)
            < 1
        {
            self.deactivate(DeactivationReason::Seated);
            return;
        }

        let head_rotation = self.host.head_pose().rotation;

        match self.device_mode {
            DeviceMode::Vr => {
                self.integrator.translate(vr_delta(
                    &self.input,
                    head_rotation,
                    &self.settings,
                    delta_time,
                ));
                let origin = self.host.play_space_origin_pose();
                let origin_offset = origin.position - avatar_position;
                self.host.teleport_to(
                    self.integrator.position() + origin_offset,
                    origin.rotation,
                    SpawnAlignment::AlignRoomWithSpawnPoint,
                    true,
                );
            }
            DeviceMode::Desktop => {
                self.integrator.translate(desktop_delta(
                    &self.input,
                    head_rotation,
                    &self.settings,
                    delta_time,
                ));
                let rotation = self.host.rotation();
                self.host.teleport_to(
                    self.integrator.position(),
                    rotation,
                    SpawnAlignment::Default,
                    true,
                );
            }
        }

        // Suppresses the host's falling state after the teleport.
        self.host.set_velocity(Vec3::ZERO);
    }

    pub fn enable(&mut self) -> ToggleOutcome {
        self.activate(ActivationSource::Api)
    }

    pub fn disable(&mut self) -> ToggleOutcome {
        self.deactivate(DeactivationReason::Api)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> ToggleOutcome {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }

    pub fn on_avatar_respawned(&mut self) -> ToggleOutcome {
        self.deactivate(DeactivationReason::Respawned)
    }

    pub fn on_avatar_left(&mut self) -> ToggleOutcome {
        self.deactivate(DeactivationReason::Left)
    }

    pub fn set_max_speed(&mut self, max_speed: f32) {
        if !max_speed.is_finite() {
            warn!(max_speed, "noclip_speed_rejected");
            return;
        }
        self.settings.speed = max_speed.max(0.0);
        debug!(speed = self.settings.speed, "noclip_speed_changed");
    }

    pub fn set_vr_input_curve(&mut self, curve: InputCurve) {
        self.settings.vr_input_curve = curve;
    }

    pub fn set_desktop_speed_fraction(&mut self, fraction: f32) {
        if fraction.is_finite() {
            self.settings.desktop_speed_fraction = fraction.max(0.0);
        }
    }

    pub fn set_desktop_vertical_input(&mut self, allowed: bool) {
        self.settings.desktop_vertical_input = allowed;
    }

    pub fn add_allowed_identity(&mut self, identity: &str) -> bool {
        let local_identity = self.host.local_identity();
        let added = self.gate.add(identity, &local_identity);
        if added {
            debug!(identity, "allowlist_added");
        }
        added
    }

    pub fn remove_allowed_identity(&mut self, identity: &str) -> bool {
        let local_identity = self.host.local_identity();
        let removed = self.gate.remove(identity, &local_identity);
        if removed {
            debug!(identity, "allowlist_removed");
        }
        removed
    }

    pub fn clear_allowed_identities(&mut self) {
        let local_identity = self.host.local_identity();
        self.gate.clear(&local_identity);
        debug!("allowlist_cleared");
    }

    pub fn add_current_identity_to_allowed_list(&mut self) -> bool {
        let local_identity = self.host.local_identity();
        self.add_allowed_identity(&local_identity)
    }

    pub fn set_access_restricted(&mut self, restricted: bool) {
        let policy = if restricted {
            AccessPolicy::Allowlisted
        } else {
            AccessPolicy::Unrestricted
        };
        let local_identity = self.host.local_identity();
        self.gate.set_policy(policy, &local_identity);
        debug!(access_policy = ?policy, "access_policy_changed");
    }

    fn activate(&mut self, source: ActivationSource) -> ToggleOutcome {
        if !self.gate.permits_activation() {
            debug!(source = ?source, "noclip_activation_denied");
            return ToggleOutcome::Denied;
        }
        if self.active {
            return ToggleOutcome::Unchanged;
        }

        self.active = true;
        self.host.immobilize(true);
        let anchor = self.host.position();
        self.integrator.anchor(anchor);
        info!(source = ?source, position = ?anchor, "noclip_activated");
        ToggleOutcome::Activated
    }

    fn deactivate(&mut self, reason: DeactivationReason) -> ToggleOutcome {
        if !self.active {
            return ToggleOutcome::Unchanged;
        }

        self.active = false;
        self.input.look_vertical = 0.0;
        self.host.immobilize(false);
        let velocity = self.integrator.exit_velocity();
        self.host.set_velocity(velocity);
        info!(reason = ?reason, velocity = ?velocity, "noclip_deactivated");
        ToggleOutcome::Deactivated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::DesktopKey;
    use crate::host::TrackingPose;
    use crate::test_support::MockHost;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    const LOCAL: &str = "local-user";

    fn config(method: TriggerMethod) -> NoclipConfig {
        NoclipConfig {
            trigger_method: method,
            toggle_threshold_seconds: 0.5,
            max_speed: 10.0,
            ..NoclipConfig::default()
        }
    }

    fn desktop(method: TriggerMethod) -> NoclipController<MockHost> {
        NoclipController::new(config(method), MockHost::desktop(LOCAL))
    }

    fn restricted(identities: &[&str]) -> NoclipController<MockHost> {
        let config = NoclipConfig {
            restrict_to_allowlist: true,
            allowed_identities: identities.iter().map(ToString::to_string).collect(),
            ..config(TriggerMethod::DoubleActivation)
        };
        NoclipController::new(config, MockHost::desktop(LOCAL))
    }

    fn double_activate(controller: &mut NoclipController<MockHost>) -> ToggleOutcome {
        controller.on_activation_edge();
        controller.on_tick(0.125);
        controller.on_activation_edge()
    }

    fn assert_vec3_close(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-4),
            "{actual:?} vs {expected:?}"
        );
    }

    #[test]
    fn device_mode_is_sampled_from_host_at_creation() {
        let vr = NoclipController::new(NoclipConfig::default(), MockHost::vr(LOCAL));
        assert_eq!(vr.device_mode(), DeviceMode::Vr);
        assert_eq!(
            desktop(TriggerMethod::DoubleActivation).device_mode(),
            DeviceMode::Desktop
        );
    }

    #[test]
    fn device_mode_is_not_resampled_after_creation() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.host_mut().in_vr = true;

        assert_eq!(controller.enable(), ToggleOutcome::Activated);
        controller.on_tick(0.125);

        assert_eq!(controller.device_mode(), DeviceMode::Desktop);
        assert_eq!(controller.snapshot().device_mode, DeviceMode::Desktop);
        let teleport = *controller.host().teleports.last().expect("teleport");
        assert_eq!(teleport.alignment, SpawnAlignment::Default);
    }

    #[test]
    fn double_activation_inside_threshold_toggles_on_and_off() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        assert_eq!(controller.on_activation_edge(), ToggleOutcome::Unchanged);
        assert!(controller.snapshot().primed);

        controller.on_tick(0.25);
        assert_eq!(controller.on_activation_edge(), ToggleOutcome::Activated);
        assert!(controller.is_active());
        assert!(!controller.snapshot().primed);

        assert_eq!(double_activate(&mut controller), ToggleOutcome::Deactivated);
        assert!(!controller.is_active());
        assert_eq!(controller.host().immobilize_calls, vec![true, false]);
    }

    #[test]
    fn double_activation_at_threshold_only_reprimes() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.on_activation_edge();
        controller.on_tick(0.25);
        controller.on_tick(0.25);
        assert!(!controller.snapshot().primed);

        assert_eq!(controller.on_activation_edge(), ToggleOutcome::Unchanged);
        assert!(!controller.is_active());
        assert!(controller.snapshot().primed);
    }

    #[test]
    fn activation_release_is_not_an_edge() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.on_input_event(InputEvent::Activation { pressed: true });
        controller.on_input_event(InputEvent::Activation { pressed: false });
        assert!(controller.snapshot().primed);

        let outcome = controller.on_input_event(InputEvent::Activation { pressed: true });
        assert_eq!(outcome, ToggleOutcome::Activated);
    }

    #[test]
    fn held_activation_is_a_single_edge() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        let first = controller.on_input_event(InputEvent::Activation { pressed: true });
        controller.on_tick(0.125);
        let repeat = controller.on_input_event(InputEvent::Activation { pressed: true });

        assert_eq!(first, ToggleOutcome::Unchanged);
        assert_eq!(repeat, ToggleOutcome::Unchanged);
        assert!(!controller.is_active());
        assert!(controller.snapshot().primed);

        controller.on_input_event(InputEvent::Activation { pressed: false });
        let outcome = controller.on_input_event(InputEvent::Activation { pressed: true });
        assert_eq!(outcome, ToggleOutcome::Activated);
    }

    #[test]
    fn quintuple_activation_toggles_once_on_fifth_edge() {
        let mut controller = desktop(TriggerMethod::QuintupleActivation);
        let mut outcomes = Vec::new();
        for _ in 0..5 {
            outcomes.push(controller.on_activation_edge());
            controller.on_tick(0.375);
        }

        assert_eq!(
            outcomes,
            vec![
                ToggleOutcome::Unchanged,
                ToggleOutcome::Unchanged,
                ToggleOutcome::Unchanged,
                ToggleOutcome::Unchanged,
                ToggleOutcome::Activated,
            ]
        );
        assert!(controller.is_active());
        assert_eq!(controller.snapshot().consecutive_count, 0);
        assert!(!controller.snapshot().primed);
    }

    #[test]
    fn quintuple_activation_gap_resets_without_toggle() {
        let mut controller = desktop(TriggerMethod::QuintupleActivation);
        for _ in 0..4 {
            controller.on_activation_edge();
            controller.on_tick(0.25);
        }
        controller.on_tick(0.25);
        assert_eq!(controller.snapshot().consecutive_count, 0);

        assert_eq!(controller.on_activation_edge(), ToggleOutcome::Unchanged);
        assert!(!controller.is_active());
        assert_eq!(controller.snapshot().consecutive_count, 1);
    }

    #[test]
    fn gate_denies_unlisted_identity_until_added() {
        let mut controller = restricted(&["someone-else"]);
        for _ in 0..3 {
            assert_eq!(double_activate(&mut controller), ToggleOutcome::Denied);
            controller.on_tick(1.0);
        }
        assert_eq!(controller.enable(), ToggleOutcome::Denied);
        assert!(!controller.is_active());
        assert!(controller.host().immobilize_calls.is_empty());

        assert!(controller.add_current_identity_to_allowed_list());
        assert_eq!(double_activate(&mut controller), ToggleOutcome::Activated);
    }

    #[test]
    fn clearing_allowlist_denies_until_repopulated() {
        let mut controller = restricted(&[LOCAL]);
        controller.clear_allowed_identities();
        assert!(controller.access_gate().allowed_identities().is_empty());
        assert_eq!(controller.enable(), ToggleOutcome::Denied);

        controller.add_allowed_identity(LOCAL);
        assert_eq!(controller.enable(), ToggleOutcome::Activated);
    }

    #[test]
    fn lifting_restriction_allows_activation() {
        let mut controller = restricted(&[]);
        assert_eq!(controller.enable(), ToggleOutcome::Denied);
        controller.set_access_restricted(false);
        assert_eq!(controller.enable(), ToggleOutcome::Activated);
    }

    #[test]
    fn debug_bypass_skips_allowlist() {
        let config = NoclipConfig {
            restrict_to_allowlist: true,
            debug_bypass_access_control: true,
            ..NoclipConfig::default()
        };
        let mut controller = NoclipController::new(config, MockHost::desktop(LOCAL));
        assert!(!controller.access_gate().local_identity_allowed());
        assert_eq!(controller.enable(), ToggleOutcome::Activated);
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let mut controller = NoclipController::new(
            config(TriggerMethod::DoubleActivation),
            MockHost::desktop(LOCAL).at(Vec3::new(1.0, 2.0, 3.0)),
        );
        assert_eq!(controller.enable(), ToggleOutcome::Activated);
        controller.host_mut().position = Vec3::new(9.0, 9.0, 9.0);
        assert_eq!(controller.enable(), ToggleOutcome::Unchanged);
        assert_eq!(controller.position(), Vec3::new(1.0, 2.0, 3.0));

        assert_eq!(controller.disable(), ToggleOutcome::Deactivated);
        assert_eq!(controller.set_enabled(false), ToggleOutcome::Unchanged);
        assert_eq!(controller.host().immobilize_calls, vec![true, false]);
        assert_eq!(controller.host().velocity_calls.len(), 1);
    }

    #[test]
    fn enabling_reanchors_on_current_avatar_position() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.enable();
        controller.on_input_event(InputEvent::MoveVertical { value: 1.0 });
        controller.on_tick(0.5);
        controller.disable();

        controller.host_mut().position = Vec3::new(-4.0, 0.0, 0.0);
        controller.enable();
        assert_eq!(controller.position(), Vec3::new(-4.0, 0.0, 0.0));
        controller.disable();
        assert_eq!(controller.host().velocity, Vec3::ZERO);
    }

    #[test]
    fn disabling_applies_velocity_of_last_tick() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.on_input_event(InputEvent::Key {
            key: DesktopKey::LeftShift,
            pressed: true,
        });
        controller.on_input_event(InputEvent::MoveVertical { value: 1.0 });
        controller.enable();
        controller.on_tick(0.5);
        assert_vec3_close(controller.position(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(controller.host().velocity, Vec3::ZERO);

        assert_eq!(controller.disable(), ToggleOutcome::Deactivated);
        assert_vec3_close(controller.host().velocity, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn zero_length_tick_exits_with_zero_velocity() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.on_input_event(InputEvent::MoveVertical { value: 1.0 });
        controller.enable();
        controller.on_tick(0.0);
        controller.disable();
        assert_eq!(controller.host().velocity, Vec3::ZERO);
    }

    #[test]
    fn desktop_tick_teleports_with_avatar_rotation_and_zeroes_velocity() {
        let mut host = MockHost::desktop(LOCAL);
        host.rotation = Quat::from_rotation_y(1.0);
        host.head_rotation = Quat::from_rotation_y(FRAC_PI_2);
        let mut controller = NoclipController::new(config(TriggerMethod::DoubleActivation), host);
        controller.enable();
        controller.on_input_event(InputEvent::MoveVertical { value: 1.0 });
        controller.on_tick(1.0);

        let teleport = *controller.host().teleports.last().expect("teleport");
        assert_eq!(teleport.alignment, SpawnAlignment::Default);
        assert!(teleport.keep_velocity);
        assert_eq!(teleport.rotation, Quat::from_rotation_y(1.0));
        assert_vec3_close(teleport.position, Vec3::new(2.5, 0.0, 0.0));
        assert_eq!(controller.host().velocity_calls.last(), Some(&Vec3::ZERO));
    }

    #[test]
    fn vr_tick_teleports_relative_to_play_space_origin() {
        let mut host = MockHost::vr(LOCAL).at(Vec3::new(1.0, 0.0, 1.0));
        host.origin = TrackingPose {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(FRAC_PI_2),
        };
        let mut controller = NoclipController::new(config(TriggerMethod::DoubleActivation), host);
        controller.enable();
        controller.on_input_event(InputEvent::MoveVertical { value: 1.0 });
        controller.on_tick(0.125);

        let teleport = *controller.host().teleports.last().expect("teleport");
        assert_eq!(teleport.alignment, SpawnAlignment::AlignRoomWithSpawnPoint);
        assert_eq!(teleport.rotation, Quat::from_rotation_y(FRAC_PI_2));
        assert_vec3_close(teleport.position, Vec3::new(0.0, 0.0, 1.25));
        assert_vec3_close(controller.host().position, Vec3::new(1.0, 0.0, 2.25));
    }

    #[test]
    fn look_vertical_is_only_latched_while_active_in_vr() {
        let mut controller = NoclipController::new(
            config(TriggerMethod::DoubleActivation),
            MockHost::vr(LOCAL),
        );
        controller.on_input_event(InputEvent::LookVertical { value: 1.0 });
        controller.enable();
        controller.on_tick(0.5);
        assert_vec3_close(controller.position(), Vec3::ZERO);

        controller.on_input_event(InputEvent::LookVertical { value: 1.0 });
        controller.on_tick(0.5);
        assert_vec3_close(controller.position(), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn vr_motion_is_frame_rate_independent() {
        let run = |ticks: &[f32]| {
            let mut controller = NoclipController::new(
                config(TriggerMethod::DoubleActivation),
                MockHost::vr(LOCAL),
            );
            controller.enable();
            controller.on_input_event(InputEvent::MoveHorizontal { value: 0.3 });
            controller.on_input_event(InputEvent::MoveVertical { value: 0.4 });
            for dt in ticks {
                controller.on_tick(*dt);
            }
            controller.position()
        };

        let whole = run(&[0.5]);
        let halves = run(&[0.25, 0.25]);
        assert_vec3_close(whole, halves);
        assert!((whole.length() - 2.5).abs() < 1e-4);
    }

    #[test]
    fn losing_presence_forces_exit_before_moving() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.enable();
        controller.on_input_event(InputEvent::MoveVertical { value: 1.0 });
        controller.on_tick(0.25);
        let teleports_before = controller.host().teleports.len();

        controller.host_mut().present = false;
        controller.on_tick(0.25);

        assert!(!controller.is_active());
        assert_eq!(controller.host().teleports.len(), teleports_before);
        assert_eq!(controller.host().immobilize_calls, vec![true, false]);
        assert_eq!(controller.host().velocity, Vec3::ZERO);
    }

    #[test]
    fn respawn_and_leave_force_exit_regardless_of_gate() {
        let mut controller = restricted(&[LOCAL]);
        controller.enable();
        controller.remove_allowed_identity(LOCAL);
        assert_eq!(controller.on_avatar_respawned(), ToggleOutcome::Deactivated);
        assert_eq!(controller.on_avatar_left(), ToggleOutcome::Unchanged);

        controller.add_allowed_identity(LOCAL);
        controller.enable();
        assert_eq!(controller.on_avatar_left(), ToggleOutcome::Deactivated);
        assert!(!controller.is_active());
    }

    #[test]
    fn set_max_speed_ignores_non_finite_values() {
        let mut controller = desktop(TriggerMethod::DoubleActivation);
        controller.set_max_speed(42.0);
        assert_eq!(controller.settings().speed, 42.0);
        controller.set_max_speed(f32::NAN);
        assert_eq!(controller.settings().speed, 42.0);
    }
}
