//! Animated bones: three keyframe tracks plus identity

use crate::track::KeyframeTrack;
use glam::{Mat4, Quat, Vec3};

/// A single bone's local-space pose (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BonePose {
    /// Compose `T * R * S`, so scale never distorts the translation.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(self.scale)
    }
}

/// Unindexed keyframe tracks for a named bone, as delivered by an importer.
///
/// Turned into a [`Bone`] once the clip assigns the bone its matrix slot.
#[derive(Debug, Clone)]
pub struct BoneTracks {
    pub name: String,
    pub positions: KeyframeTrack<Vec3>,
    pub rotations: KeyframeTrack<Quat>,
    pub scales: KeyframeTrack<Vec3>,
}

impl BoneTracks {
    /// Tracks holding the rest values (zero, identity, one)
    pub fn still(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: KeyframeTrack::constant(Vec3::ZERO),
            rotations: KeyframeTrack::constant(Quat::IDENTITY),
            scales: KeyframeTrack::constant(Vec3::ONE),
        }
    }

    pub fn into_bone(self, index: usize) -> Bone {
        Bone::new(self.name, index, self.positions, self.rotations, self.scales)
    }
}

/// Keyframe data for one named bone within one clip.
///
/// Bones are owned by a single clip; a bone with the same name in another
/// clip is a separate instance.
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    index: usize,
    positions: KeyframeTrack<Vec3>,
    rotations: KeyframeTrack<Quat>,
    scales: KeyframeTrack<Vec3>,
}

impl Bone {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        positions: KeyframeTrack<Vec3>,
        rotations: KeyframeTrack<Quat>,
        scales: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            positions,
            rotations,
            scales,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot in the final matrix array
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn positions(&self) -> &KeyframeTrack<Vec3> {
        &self.positions
    }

    pub fn rotations(&self) -> &KeyframeTrack<Quat> {
        &self.rotations
    }

    pub fn scales(&self) -> &KeyframeTrack<Vec3> {
        &self.scales
    }

    /// Sample all three tracks independently at `time` (ticks).
    pub fn sample_pose(&self, time: f32) -> BonePose {
        BonePose {
            translation: self.positions.sample(time),
            rotation: self.rotations.sample(time),
            scale: self.scales.sample(time),
        }
    }

    /// Local transform at `time`.
    pub fn animated_transform(&self, time: f32) -> Mat4 {
        self.sample_pose(time).to_mat4()
    }
}
