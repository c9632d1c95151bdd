//! Animation clips: timing, bones, and a snapshot of the skeleton they drive

use crate::bone::{Bone, BoneTracks};
use crate::skeleton::{validate_bone_info, BoneInfo, Skeleton, SkeletonNode};
use std::collections::HashMap;
use tendon_core::{Result, TendonError};

/// A complete skeletal animation clip.
///
/// Created once at load time and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    /// Length in ticks
    duration: f32,
    ticks_per_second: f32,
    root: SkeletonNode,
    bones: HashMap<String, Bone>,
    bone_info: HashMap<String, BoneInfo>,
}

impl AnimationClip {
    /// Assemble a clip from already-indexed parts.
    ///
    /// Fails if the timing is non-positive, the skin table is not dense and
    /// unique within `MAX_BONES`, or a bone's index disagrees with the table.
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        root: SkeletonNode,
        bones: Vec<Bone>,
        bone_info: HashMap<String, BoneInfo>,
    ) -> Result<Self> {
        let name = name.into();

        if !(duration.is_finite() && duration > 0.0) {
            return Err(TendonError::InvalidClip(format!(
                "'{}' has non-positive duration: {}",
                name, duration
            )));
        }
        if !(ticks_per_second.is_finite() && ticks_per_second > 0.0) {
            return Err(TendonError::InvalidClip(format!(
                "'{}' has non-positive ticks per second: {}",
                name, ticks_per_second
            )));
        }

        validate_bone_info(&name, &bone_info)?;

        let mut by_name = HashMap::with_capacity(bones.len());
        for bone in bones {
            match bone_info.get(bone.name()) {
                Some(info) if info.index == bone.index() => {}
                Some(info) => {
                    return Err(TendonError::InvalidClip(format!(
                        "'{}': bone '{}' has index {} but the skin table says {}",
                        name,
                        bone.name(),
                        bone.index(),
                        info.index
                    )))
                }
                None => {
                    return Err(TendonError::InvalidClip(format!(
                        "'{}': bone '{}' is missing from the skin table",
                        name,
                        bone.name()
                    )))
                }
            }
            if by_name.contains_key(bone.name()) {
                return Err(TendonError::InvalidClip(format!(
                    "'{}': bone '{}' is animated twice",
                    name,
                    bone.name()
                )));
            }
            by_name.insert(bone.name().to_string(), bone);
        }

        Ok(Self {
            name,
            duration,
            ticks_per_second,
            root,
            bones: by_name,
            bone_info,
        })
    }

    /// Build a clip that animates `skeleton`.
    ///
    /// Every animated bone must already be in the skeleton's skin table
    /// (see [`Skeleton::register_bones`]), so the clip shares its slots with
    /// every other clip built from the same skeleton.
    pub fn for_skeleton(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        skeleton: &Skeleton,
        tracks: Vec<BoneTracks>,
    ) -> Result<Self> {
        let name = name.into();
        let bone_info = skeleton.bone_info();

        let mut bones = Vec::with_capacity(tracks.len());
        for bone_tracks in tracks {
            let Some(info) = bone_info.get(&bone_tracks.name) else {
                return Err(TendonError::InvalidClip(format!(
                    "'{}': bone '{}' is not in the skin table of skeleton '{}'",
                    name, bone_tracks.name, skeleton.name
                )));
            };
            bones.push(bone_tracks.into_bone(info.index));
        }

        Self::new(
            name,
            duration,
            ticks_per_second,
            skeleton.root.clone(),
            bones,
            bone_info.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in ticks
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Length in seconds at the clip's native rate
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    pub fn root(&self) -> &SkeletonNode {
        &self.root
    }

    /// Look up the animated bone for a hierarchy node.
    ///
    /// `None` means the node is not animated by this clip.
    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bones.get(name)
    }

    pub fn bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.values()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bone_info(&self) -> &HashMap<String, BoneInfo> {
        &self.bone_info
    }
}
