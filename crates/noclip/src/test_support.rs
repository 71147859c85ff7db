use glam::{Quat, Vec3};

use crate::host::{AvatarHost, SpawnAlignment, TrackingPose};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TeleportCall {
    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) alignment: SpawnAlignment,
    pub(crate) keep_velocity: bool,
}

/// Host double that records every command and follows teleports.
#[derive(Debug, Clone)]
pub(crate) struct MockHost {
    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) velocity: Vec3,
    pub(crate) head_rotation: Quat,
    pub(crate) origin: TrackingPose,
    pub(crate) in_vr: bool,
    pub(crate) present: bool,
    pub(crate) identity: String,
    pub(crate) immobilize_calls: Vec<bool>,
    pub(crate) velocity_calls: Vec<Vec3>,
    pub(crate) teleports: Vec<TeleportCall>,
}

impl MockHost {
    pub(crate) fn desktop(identity: &str) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            head_rotation: Quat::IDENTITY,
            origin: TrackingPose::default(),
            in_vr: false,
            present: true,
            identity: identity.to_string(),
            immobilize_calls: Vec::new(),
            velocity_calls: Vec::new(),
            teleports: Vec::new(),
        }
    }

    pub(crate) fn vr(identity: &str) -> Self {
        Self {
            in_vr: true,
            ..Self::desktop(identity)
        }
    }

    pub(crate) fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

impl AvatarHost for MockHost {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.velocity_calls.push(velocity);
    }

    fn teleport_to(
        &mut self,
        position: Vec3,
        rotation: Quat,
        alignment: SpawnAlignment,
        keep_velocity: bool,
    ) {
        self.teleports.push(TeleportCall {
            position,
            rotation,
            alignment,
            keep_velocity,
        });
        let next = match alignment {
            SpawnAlignment::Default => position,
            SpawnAlignment::AlignRoomWithSpawnPoint => {
                position - (self.origin.position - self.position)
            }
        };
        // The play space travels with the avatar.
        self.origin.position += next - self.position;
        self.position = next;
    }

    fn head_pose(&self) -> TrackingPose {
        TrackingPose {
            position: self.position,
            rotation: self.head_rotation,
        }
    }

    fn play_space_origin_pose(&self) -> TrackingPose {
        self.origin
    }

    fn is_in_vr(&self) -> bool {
        self.in_vr
    }

    fn immobilize(&mut self, immobilized: bool) {
        self.immobilize_calls.push(immobilized);
    }

    fn probe_presence(&self, _center: Vec3, _radius: f32, _layer_mask: u32) -> usize {
        usize::from(self.present)
    }

    fn local_identity(&self) -> String {
        self.identity.clone()
    }
}
