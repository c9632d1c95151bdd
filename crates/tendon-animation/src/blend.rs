//! Pose blending for crossfades between two clips
//!
//! Translation and scale use component-wise lerp, rotation uses quaternion
//! slerp followed by a single normalization.

use crate::bone::{Bone, BonePose};
use glam::{Mat4, Quat};

/// Blend two poses. `weight` of 0.0 = fully `a`, 1.0 = fully `b`.
///
/// The endpoints return the matching input unchanged so a blend at 0 or 1
/// is bit-identical to sampling that bone alone.
pub fn blend_poses(a: &BonePose, b: &BonePose, weight: f32) -> BonePose {
    let w = weight.clamp(0.0, 1.0);
    if w <= 0.0 {
        return *a;
    }
    if w >= 1.0 {
        return *b;
    }

    BonePose {
        translation: a.translation.lerp(b.translation, w),
        rotation: quat_slerp(a.rotation, b.rotation, w).normalize(),
        scale: a.scale.lerp(b.scale, w),
    }
}

/// Local transform for a bone driven by two clips at once.
///
/// Each bone is sampled at its own clip time before blending.
pub fn blended_transform(bone1: &Bone, bone2: &Bone, time1: f32, time2: f32, blend: f32) -> Mat4 {
    let a = bone1.sample_pose(time1);
    let b = bone2.sample_pose(time2);
    blend_poses(&a, &b, blend).to_mat4()
}

/// Quaternion slerp with shortest-path correction.
///
/// The result is not renormalized.
pub fn quat_slerp(a: Quat, b: Quat, t: f32) -> Quat {
    let mut dot = a.dot(b);

    // Ensure shortest path
    let mut b_adj = b;
    if dot < 0.0 {
        b_adj = -b;
        dot = -dot;
    }

    // If very close, use lerp to avoid division by zero
    if dot > 0.9995 {
        return a + (b_adj - a) * t;
    }

    let theta = dot.acos();
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;

    a * wa + b_adj * wb
}
