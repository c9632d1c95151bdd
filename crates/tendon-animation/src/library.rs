//! Clip registry: owns every loaded clip and hands out stable ids

use crate::clip::AnimationClip;
use std::collections::HashMap;
use std::fmt;

/// Stable handle to a clip inside a [`ClipLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(usize);

impl ClipId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Holds all loaded clips for the lifetime of the program.
///
/// Clips are never removed or mutated, so a `ClipId` stays valid as long as
/// the library does and any number of animators can reference the same clip.
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: Vec<AnimationClip>,
    by_name: HashMap<String, ClipId>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip. A later clip with the same name shadows the earlier
    /// one for `find`, but both ids stay valid.
    pub fn add(&mut self, clip: AnimationClip) -> ClipId {
        let id = ClipId(self.clips.len());
        self.by_name.insert(clip.name().to_string(), id);
        self.clips.push(clip);
        id
    }

    pub fn get(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.get(id.0)
    }

    /// Look up a clip id by name.
    pub fn find(&self, name: &str) -> Option<ClipId> {
        self.by_name.get(name).copied()
    }

    /// Number of registered clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClipId, &AnimationClip)> {
        self.clips.iter().enumerate().map(|(i, clip)| (ClipId(i), clip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{Skeleton, SkeletonNode};
    use glam::Mat4;

    fn clip(name: &str) -> AnimationClip {
        let skeleton = Skeleton::new(
            "empty",
            SkeletonNode::new("root", Mat4::IDENTITY),
            HashMap::new(),
        )
        .unwrap();
        AnimationClip::for_skeleton(name, 1.0, 1.0, &skeleton, vec![]).unwrap()
    }

    #[test]
    fn ids_are_stable_and_sequential() {
        let mut library = ClipLibrary::new();
        assert!(library.is_empty());

        let idle = library.add(clip("idle"));
        let dance = library.add(clip("dance"));

        assert_ne!(idle, dance);
        assert_eq!(library.len(), 2);
        assert_eq!(library.get(idle).unwrap().name(), "idle");
        assert_eq!(library.get(dance).unwrap().name(), "dance");
        assert_eq!(library.find("dance"), Some(dance));
        assert_eq!(library.find("moonwalk"), None);
    }

    #[test]
    fn iter_yields_ids_in_order() {
        let mut library = ClipLibrary::new();
        library.add(clip("a"));
        library.add(clip("b"));
        let names: Vec<(usize, &str)> = library
            .iter()
            .map(|(id, clip)| (id.index(), clip.name()))
            .collect();
        assert_eq!(names, vec![(0, "a"), (1, "b")]);
    }
}
