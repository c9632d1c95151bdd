//! Keyframe tracks and per-type interpolation

use crate::blend::quat_slerp;
use glam::{Quat, Vec3};
use tendon_core::{Result, TendonError};

/// A value that can be interpolated between two keyframes.
///
/// `t` is always in [0, 1].
pub trait Interpolate: Copy {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl Interpolate for Quat {
    /// Slerp without renormalizing; callers that blend further normalize once at the end.
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        quat_slerp(a, b, t)
    }
}

/// A value at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    /// Time in clip ticks
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Ordered keyframes for one property of one bone.
///
/// Never empty; timestamps are finite and strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Build a track, rejecting empty or out-of-order keyframes.
    pub fn new(keys: Vec<Keyframe<T>>) -> Result<Self> {
        if keys.is_empty() {
            return Err(TendonError::InvalidTrack("track has no keyframes".into()));
        }
        if let Some(key) = keys.iter().find(|k| !k.time.is_finite()) {
            return Err(TendonError::InvalidTrack(format!(
                "keyframe time {} is not finite",
                key.time
            )));
        }
        if let Some(pair) = keys.windows(2).find(|w| w[1].time <= w[0].time) {
            return Err(TendonError::InvalidTrack(format!(
                "keyframe times must strictly increase, found {} then {}",
                pair[0].time, pair[1].time
            )));
        }
        Ok(Self { keys })
    }

    /// A single-key track that yields `value` at every time
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; tracks hold at least one key
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the key that starts the segment containing `time`.
    ///
    /// Linear scan from the start. Times before the first key land in the
    /// first segment and times past the last key land in the final one.
    fn segment_index(&self, time: f32) -> usize {
        self.keys
            .windows(2)
            .position(|w| time < w[1].time)
            .unwrap_or(self.keys.len() - 2)
    }

    /// Sample the track at `time` (in ticks).
    pub fn sample(&self, time: f32) -> T {
        if self.keys.len() == 1 {
            return self.keys[0].value;
        }

        let i = self.segment_index(time);
        let prev = &self.keys[i];
        let next = &self.keys[i + 1];

        let factor = ((time - prev.time) / (next.time - prev.time)).clamp(0.0, 1.0);
        T::interpolate(prev.value, next.value, factor)
    }
}
