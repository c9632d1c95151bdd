//! Per-character playback of up to two clips and the final skinning matrices
//!
//! The pipeline each frame:
//! 1. Advance the primary cursor (and the secondary one, if a secondary clip is set)
//! 2. Walk the primary clip's hierarchy root-to-leaf
//! 3. Per node: bind pose, or the primary bone's pose, or a blend of both clips' bones
//! 4. Accumulate `world = parent * local`
//! 5. Bones in the primary skin table get `final[index] = world * offset`

use crate::blend::blended_transform;
use crate::clip::AnimationClip;
use crate::library::{ClipId, ClipLibrary};
use crate::skeleton::{SkeletonNode, MAX_BONES};
use glam::Mat4;

/// Drives one animated character.
///
/// Holds clip ids, not clips; the [`ClipLibrary`] passed to `update` owns them.
#[derive(Debug, Clone)]
pub struct Animator {
    primary: Option<ClipId>,
    /// Ticks, wrapped into [0, duration)
    primary_time: f32,
    secondary: Option<ClipId>,
    /// Ticks; frozen while no secondary clip is set
    secondary_time: f32,
    /// 0 = fully primary, 1 = fully secondary
    blend: f32,
    final_matrices: Vec<Mat4>,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Animator {
    pub fn new(primary: Option<ClipId>) -> Self {
        Self {
            primary,
            primary_time: 0.0,
            secondary: None,
            secondary_time: 0.0,
            blend: 0.0,
            final_matrices: vec![Mat4::IDENTITY; MAX_BONES],
        }
    }

    /// Replace the whole playback state at once.
    ///
    /// Callers pass explicit cursors so a crossfade resumes each clip where
    /// it left off. `secondary = None` disables blending.
    pub fn play(
        &mut self,
        primary: ClipId,
        secondary: Option<ClipId>,
        primary_time: f32,
        secondary_time: f32,
        blend: f32,
    ) {
        self.primary = Some(primary);
        self.primary_time = primary_time;
        self.secondary = secondary;
        self.secondary_time = secondary_time;
        self.blend = blend.clamp(0.0, 1.0);
    }

    /// Advance cursors by `dt` seconds and recompute every bone matrix.
    ///
    /// No-op without a primary clip.
    pub fn update(&mut self, library: &ClipLibrary, dt: f32) {
        let Some(primary_id) = self.primary else {
            return;
        };
        let Some(primary) = library.get(primary_id) else {
            log::warn!("animator references {} which is not in the library", primary_id);
            return;
        };

        self.primary_time = wrap_ticks(
            self.primary_time + primary.ticks_per_second() * dt,
            primary.duration(),
        );

        let secondary = self.secondary.and_then(|id| {
            let clip = library.get(id);
            if clip.is_none() {
                log::warn!("animator references {} which is not in the library", id);
            }
            clip
        });
        if let Some(clip) = secondary {
            self.secondary_time = wrap_ticks(
                self.secondary_time + clip.ticks_per_second() * dt,
                clip.duration(),
            );
        }

        let walk = HierarchyWalk {
            primary,
            primary_time: self.primary_time,
            secondary: secondary
                .filter(|_| self.blend > 0.0)
                .map(|clip| (clip, self.secondary_time)),
            blend: self.blend,
        };
        walk.calculate_bone_transform(primary.root(), Mat4::IDENTITY, &mut self.final_matrices);
    }

    /// Skinning matrices indexed by bone slot; unused slots stay identity.
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_matrices
    }

    pub fn primary(&self) -> Option<ClipId> {
        self.primary
    }

    pub fn secondary(&self) -> Option<ClipId> {
        self.secondary
    }

    pub fn primary_time(&self) -> f32 {
        self.primary_time
    }

    pub fn secondary_time(&self) -> f32 {
        self.secondary_time
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }
}

fn wrap_ticks(time: f32, duration: f32) -> f32 {
    let wrapped = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if wrapped >= duration {
        0.0
    } else {
        wrapped
    }
}

/// Read-only inputs for one frame's hierarchy walk
struct HierarchyWalk<'a> {
    primary: &'a AnimationClip,
    primary_time: f32,
    /// Only set when a secondary clip is active and the blend weight is > 0
    secondary: Option<(&'a AnimationClip, f32)>,
    blend: f32,
}

impl HierarchyWalk<'_> {
    fn local_transform(&self, node: &SkeletonNode) -> Mat4 {
        let Some(bone1) = self.primary.find_bone(&node.name) else {
            // Not animated by the primary clip: keep the bind pose
            return node.transform;
        };

        let bone2 = self
            .secondary
            .and_then(|(clip, time)| clip.find_bone(&node.name).map(|bone| (bone, time)));

        match bone2 {
            Some((bone2, time2)) => {
                blended_transform(bone1, bone2, self.primary_time, time2, self.blend)
            }
            None => bone1.animated_transform(self.primary_time),
        }
    }

    fn calculate_bone_transform(&self, node: &SkeletonNode, parent: Mat4, out: &mut [Mat4]) {
        let world = parent * self.local_transform(node);

        // Slots and offsets always come from the primary clip
        if let Some(info) = self.primary.bone_info().get(&node.name) {
            if let Some(slot) = out.get_mut(info.index) {
                *slot = world * info.offset;
            }
        }

        for child in &node.children {
            self.calculate_bone_transform(child, world, out);
        }
    }
}
