use glam::{Quat, Vec3};

/// Probe radius used when checking that the local avatar still owns a collider.
///
/// A zero radius is the intended query, but hosts report false negatives for it
/// when the avatar stands inside other geometry.
pub const PRESENCE_PROBE_RADIUS: f32 = 100_000.0;

/// Collision layer mask that only contains the local avatar's own collider.
pub const LOCAL_PLAYER_LAYER_MASK: u32 = 1 << 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for TrackingPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnAlignment {
    /// Place the avatar at the target using the given rotation.
    Default,
    /// Treat the target as the play-space origin so the physical room stays aligned.
    AlignRoomWithSpawnPoint,
}

/// Capabilities the controller needs from the simulation's avatar handle.
///
/// Frame convention: +Y is world up, +Z is forward, +X is right.
pub trait AvatarHost {
    fn position(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_velocity(&mut self, velocity: Vec3);

    fn teleport_to(
        &mut self,
        position: Vec3,
        rotation: Quat,
        alignment: SpawnAlignment,
        keep_velocity: bool,
    );

    fn head_pose(&self) -> TrackingPose;

    /// Play-space origin pose. Only queried in VR.
    fn play_space_origin_pose(&self) -> TrackingPose;

    fn is_in_vr(&self) -> bool;

    fn immobilize(&mut self, immobilized: bool);

    /// Number of colliders on `layer_mask` overlapping the probe sphere.
    fn probe_presence(&self, center: Vec3, radius: f32, layer_mask: u32) -> usize;

    fn local_identity(&self) -> String;
}
