//! Skeleton hierarchy and the bone-name -> matrix-slot mapping
//!
//! The hierarchy mirrors the imported model's node tree, including nodes
//! that carry no bone (attachment points). Those keep their bind transform.

use glam::Mat4;
use std::collections::HashMap;
use tendon_core::{Result, TendonError};

/// Number of bone matrices the animator can output
pub const MAX_BONES: usize = 100;

/// A node in the skeleton hierarchy with its parent-relative bind transform
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    pub name: String,
    pub transform: Mat4,
    pub children: Vec<SkeletonNode>,
}

impl SkeletonNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    /// Builder-style child attachment
    pub fn with_child(mut self, child: SkeletonNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first visit, parents before children. `f` receives the node depth.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SkeletonNode, usize)) {
        self.walk_at(0, f);
    }

    fn walk_at<'a>(&'a self, depth: usize, f: &mut impl FnMut(&'a SkeletonNode, usize)) {
        f(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, f);
        }
    }

    /// Total nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    /// Find a node by name anywhere in this subtree
    pub fn find(&self, name: &str) -> Option<&SkeletonNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Where a bone's skinning matrix goes and how to bring vertices into bone space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfo {
    /// Slot in the final matrix array
    pub index: usize,
    /// Inverse bind pose
    pub offset: Mat4,
}

/// A model's skeleton: node hierarchy plus its skin table.
///
/// Every clip loaded against the same `Skeleton` shares its bone indices,
/// which is what lets two clips be blended slot by slot.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    pub root: SkeletonNode,
    bone_info: HashMap<String, BoneInfo>,
}

impl Skeleton {
    /// Build a skeleton, checking the skin table fits the animator.
    pub fn new(
        name: impl Into<String>,
        root: SkeletonNode,
        bone_info: HashMap<String, BoneInfo>,
    ) -> Result<Self> {
        let name = name.into();
        validate_bone_info(&name, &bone_info)?;
        Ok(Self {
            name,
            root,
            bone_info,
        })
    }

    pub fn bone_info(&self) -> &HashMap<String, BoneInfo> {
        &self.bone_info
    }

    pub fn bone_count(&self) -> usize {
        self.bone_info.len()
    }

    /// Give every name not yet in the skin table the next free slot with an
    /// identity offset. Returns how many bones were appended.
    ///
    /// Register the animated bones of every clip before building any of them,
    /// so all clips of this skeleton agree on every slot. On error the table
    /// is left unchanged.
    pub fn register_bones<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let mut appended: Vec<&str> = Vec::new();
        for name in names {
            if !self.bone_info.contains_key(name) && !appended.contains(&name) {
                appended.push(name);
            }
        }

        let required = self.bone_info.len() + appended.len();
        if required > MAX_BONES {
            return Err(TendonError::CapacityExceeded {
                skeleton: self.name.clone(),
                required,
                capacity: MAX_BONES,
            });
        }

        for name in &appended {
            let index = self.bone_info.len();
            log::debug!(
                "skeleton '{}': bone '{}' not in the skin table, appending at slot {}",
                self.name,
                name,
                index
            );
            self.bone_info.insert(
                name.to_string(),
                BoneInfo {
                    index,
                    offset: Mat4::IDENTITY,
                },
            );
        }
        Ok(appended.len())
    }
}

/// Check that bone indices are unique, dense (`0..n`) and within `MAX_BONES`.
pub fn validate_bone_info(owner: &str, bone_info: &HashMap<String, BoneInfo>) -> Result<()> {
    let count = bone_info.len();
    if count > MAX_BONES {
        return Err(TendonError::CapacityExceeded {
            skeleton: owner.to_string(),
            required: count,
            capacity: MAX_BONES,
        });
    }

    let mut seen = vec![false; count];
    for (name, info) in bone_info {
        if info.index >= MAX_BONES {
            return Err(TendonError::CapacityExceeded {
                skeleton: owner.to_string(),
                required: info.index + 1,
                capacity: MAX_BONES,
            });
        }
        match seen.get_mut(info.index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(TendonError::InvalidClip(format!(
                    "'{}': bone '{}' reuses index {}",
                    owner, name, info.index
                )))
            }
            None => {
                return Err(TendonError::InvalidClip(format!(
                    "'{}': bone '{}' has index {} but only {} bones are defined",
                    owner, name, info.index, count
                )))
            }
        }
    }
    Ok(())
}
