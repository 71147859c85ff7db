use glam::{EulerRot, Quat, Vec3};
use noclip::{AvatarHost, SpawnAlignment, TrackingPose, LOCAL_PLAYER_LAYER_MASK};

const GRAVITY: f32 = 9.81;
const GROUND_HEIGHT: f32 = 0.0;
const GROUND_FRICTION_PER_SECOND: f32 = 6.0;
const EYE_HEIGHT: f32 = 1.6;

/// Headless stand-in for the simulation's avatar handle.
///
/// Falls under gravity onto a flat ground plane unless immobilized or seated.
/// Positive head pitch looks down.
#[derive(Debug, Clone)]
pub(crate) struct SimulatedAvatar {
    identity: String,
    in_vr: bool,
    spawn_point: Vec3,
    position: Vec3,
    velocity: Vec3,
    yaw_radians: f32,
    head_pitch_radians: f32,
    play_space_offset: Vec3,
    immobilized: bool,
    seated: bool,
    teleport_count: u64,
    immobilize_count: u64,
}

impl SimulatedAvatar {
    pub(crate) fn new(identity: impl Into<String>, in_vr: bool, spawn_point: Vec3) -> Self {
        Self {
            identity: identity.into(),
            in_vr,
            spawn_point,
            position: spawn_point,
            velocity: Vec3::ZERO,
            yaw_radians: 0.0,
            head_pitch_radians: 0.0,
            play_space_offset: Vec3::ZERO,
            immobilized: false,
            seated: false,
            teleport_count: 0,
            immobilize_count: 0,
        }
    }

    /// Offset from the avatar to the play-space origin, as if the player stood
    /// away from the center of their physical room.
    pub(crate) fn with_play_space_offset(mut self, offset: Vec3) -> Self {
        self.play_space_offset = offset;
        self
    }

    pub(crate) fn identity(&self) -> &str {
        &self.identity
    }

    pub(crate) fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub(crate) fn is_immobilized(&self) -> bool {
        self.immobilized
    }

    pub(crate) fn is_seated(&self) -> bool {
        self.seated
    }

    pub(crate) fn teleport_count(&self) -> u64 {
        self.teleport_count
    }

    pub(crate) fn immobilize_count(&self) -> u64 {
        self.immobilize_count
    }

    pub(crate) fn set_look(&mut self, yaw_radians: f32, head_pitch_radians: f32) {
        self.yaw_radians = yaw_radians;
        self.head_pitch_radians = head_pitch_radians;
    }

    pub(crate) fn sit(&mut self) {
        self.seated = true;
        self.velocity = Vec3::ZERO;
    }

    pub(crate) fn stand(&mut self) {
        self.seated = false;
    }

    pub(crate) fn respawn(&mut self) {
        self.seated = false;
        self.position = self.spawn_point;
        self.velocity = Vec3::ZERO;
    }

    pub(crate) fn step_physics(&mut self, dt_seconds: f32) {
        if self.immobilized || self.seated {
            return;
        }

        self.velocity.y -= GRAVITY * dt_seconds;
        self.position += self.velocity * dt_seconds;

        if self.position.y <= GROUND_HEIGHT {
            self.position.y = GROUND_HEIGHT;
            self.velocity.y = 0.0;
            let damping = (1.0 - GROUND_FRICTION_PER_SECOND * dt_seconds).max(0.0);
            self.velocity.x *= damping;
            self.velocity.z *= damping;
        }
    }

    fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw_radians)
    }
}

impl AvatarHost for SimulatedAvatar {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.yaw_rotation()
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn teleport_to(
        &mut self,
        position: Vec3,
        rotation: Quat,
        alignment: SpawnAlignment,
        keep_velocity: bool,
    ) {
        self.position = match alignment {
            SpawnAlignment::Default => position,
            SpawnAlignment::AlignRoomWithSpawnPoint => position - self.play_space_offset,
        };
        self.yaw_radians = rotation.to_euler(EulerRot::YXZ).0;
        if !keep_velocity {
            self.velocity = Vec3::ZERO;
        }
        self.teleport_count += 1;
    }

    fn head_pose(&self) -> TrackingPose {
        TrackingPose {
            position: self.position + Vec3::Y * EYE_HEIGHT,
            rotation: self.yaw_rotation() * Quat::from_rotation_x(self.head_pitch_radians),
        }
    }

    fn play_space_origin_pose(&self) -> TrackingPose {
        TrackingPose {
            position: self.position + self.play_space_offset,
            rotation: self.yaw_rotation(),
        }
    }

    fn is_in_vr(&self) -> bool {
        self.in_vr
    }

    fn immobilize(&mut self, immobilized: bool) {
        self.immobilized = immobilized;
        self.immobilize_count += 1;
    }

    fn probe_presence(&self, center: Vec3, radius: f32, layer_mask: u32) -> usize {
        let collider_enabled = !self.seated;
        let on_layer = layer_mask & LOCAL_PLAYER_LAYER_MASK != 0;
        let in_range = center.distance(self.position) <= radius;
        usize::from(collider_enabled && on_layer && in_range)
    }

    fn local_identity(&self) -> String {
        self.identity.clone()
    }
}
