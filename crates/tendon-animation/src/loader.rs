//! TOML-based skeleton and clip loading
//!
//! Two document kinds stand in for a model importer's output:
//! a `.skeleton.toml` with the node hierarchy and skin table, and one
//! `.anim.toml` per clip, loaded against a skeleton.

use crate::bone::BoneTracks;
use crate::clip::AnimationClip;
use crate::skeleton::{BoneInfo, Skeleton, SkeletonNode};
use crate::track::{Keyframe, KeyframeTrack};
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tendon_core::{Result, TendonError};

#[derive(Debug, Deserialize)]
struct SkeletonDocument {
    name: String,
    root: NodeDocument,
    #[serde(default)]
    bones: Vec<BoneSkinDocument>,
}

/// Either TRS fields or a full column-major `matrix`, never both
#[derive(Debug, Deserialize)]
struct NodeDocument {
    name: String,
    translation: Option<[f32; 3]>,
    /// x, y, z, w
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
    matrix: Option<[f32; 16]>,
    #[serde(default)]
    children: Vec<NodeDocument>,
}

#[derive(Debug, Deserialize)]
struct BoneSkinDocument {
    name: String,
    index: usize,
    /// Inverse bind matrix, column-major
    offset: Option<[f32; 16]>,
}

#[derive(Debug, Deserialize)]
struct ClipDocument {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    #[serde(default)]
    bones: Vec<BoneTrackDocument>,
}

#[derive(Debug, Deserialize)]
struct BoneTrackDocument {
    name: String,
    #[serde(default)]
    positions: Vec<KeyDocument<[f32; 3]>>,
    #[serde(default)]
    rotations: Vec<KeyDocument<[f32; 4]>>,
    #[serde(default)]
    scales: Vec<KeyDocument<[f32; 3]>>,
}

#[derive(Debug, Deserialize)]
struct KeyDocument<V> {
    time: f32,
    value: V,
}

/// Load a skeleton from a `.skeleton.toml` file.
///
/// ```toml
/// name = "dancer"
///
/// [root]
/// name = "Hips"
/// translation = [0.0, 1.0, 0.0]
///
/// [[root.children]]
/// name = "Spine"
/// rotation = [0.0, 0.0, 0.0, 1.0]
///
/// [[bones]]
/// name = "Hips"
/// index = 0
/// ```
pub fn load_skeleton_from_file(path: &Path) -> Result<Skeleton> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TendonError::AnimationError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    load_skeleton_from_str(&content, path)
}

/// Parse a skeleton from a TOML string. `path` is only used in messages.
pub fn load_skeleton_from_str(content: &str, path: &Path) -> Result<Skeleton> {
    let doc: SkeletonDocument = toml::from_str(content).map_err(|e| {
        TendonError::AnimationError(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    let root = build_node(doc.root)?;

    let mut bone_info = HashMap::with_capacity(doc.bones.len());
    for bone in doc.bones {
        if root.find(&bone.name).is_none() {
            log::warn!(
                "skeleton '{}': skinned bone '{}' has no hierarchy node",
                doc.name,
                bone.name
            );
        }
        let info = BoneInfo {
            index: bone.index,
            offset: bone.offset.map_or(Mat4::IDENTITY, |m| Mat4::from_cols_array(&m)),
        };
        if bone_info.insert(bone.name.clone(), info).is_some() {
            return Err(TendonError::InvalidClip(format!(
                "skeleton '{}' lists bone '{}' twice",
                doc.name, bone.name
            )));
        }
    }

    let skeleton = Skeleton::new(doc.name, root, bone_info)?;
    log::debug!(
        "loaded skeleton '{}': {} nodes, {} skinned bones",
        skeleton.name,
        skeleton.root.node_count(),
        skeleton.bone_count()
    );
    Ok(skeleton)
}

fn build_node(doc: NodeDocument) -> Result<SkeletonNode> {
    let has_trs = doc.translation.is_some() || doc.rotation.is_some() || doc.scale.is_some();

    let transform = match doc.matrix {
        Some(_) if has_trs => {
            return Err(TendonError::InvalidClip(format!(
                "node '{}' has both a matrix and translation/rotation/scale",
                doc.name
            )))
        }
        Some(m) => Mat4::from_cols_array(&m),
        None => {
            let rotation = match doc.rotation {
                Some(r) => unit_quat(r, &doc.name)?,
                None => Quat::IDENTITY,
            };
            Mat4::from_scale_rotation_translation(
                doc.scale.map_or(Vec3::ONE, Vec3::from_array),
                rotation,
                doc.translation.map_or(Vec3::ZERO, Vec3::from_array),
            )
        }
    };

    let mut node = SkeletonNode::new(doc.name, transform);
    for child in doc.children {
        node.children.push(build_node(child)?);
    }
    Ok(node)
}

/// A parsed clip document whose bones have no matrix slots yet
#[derive(Debug, Clone)]
pub struct ClipSource {
    pub name: String,
    pub duration: f32,
    pub ticks_per_second: f32,
    pub tracks: Vec<BoneTracks>,
}

/// Read a clip from a `.anim.toml` file.
///
/// ```toml
/// name = "dance"
/// duration = 48.0
/// ticks_per_second = 24.0
///
/// [[bones]]
/// name = "Hips"
/// positions = [
///     { time = 0.0, value = [0.0, 1.0, 0.0] },
///     { time = 24.0, value = [0.0, 1.2, 0.0] },
/// ]
/// rotations = [{ time = 0.0, value = [0.0, 0.0, 0.0, 1.0] }]
/// ```
///
/// A bone that omits a track kind holds the rest value for it.
pub fn read_clip_file(path: &Path) -> Result<ClipSource> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TendonError::AnimationError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_clip_str(&content, path)
}

/// Parse a clip from a TOML string. `path` is only used in messages.
pub fn parse_clip_str(content: &str, path: &Path) -> Result<ClipSource> {
    let doc: ClipDocument = toml::from_str(content).map_err(|e| {
        TendonError::AnimationError(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    let tracks = doc
        .bones
        .into_iter()
        .map(|bone| build_tracks(&doc.name, bone))
        .collect::<Result<Vec<_>>>()?;

    Ok(ClipSource {
        name: doc.name,
        duration: doc.duration,
        ticks_per_second: doc.ticks_per_second,
        tracks,
    })
}

/// Bind a set of clips to `skeleton`.
///
/// Animated bones missing from the skin table are registered for the whole
/// set before any clip is built, so every returned clip carries the same
/// skin table and a slot means the same bone in all of them. Clips come back
/// in input order.
pub fn bind_clips(sources: Vec<ClipSource>, skeleton: &mut Skeleton) -> Result<Vec<AnimationClip>> {
    let appended = skeleton.register_bones(
        sources
            .iter()
            .flat_map(|source| source.tracks.iter().map(|t| t.name.as_str())),
    )?;
    if appended > 0 {
        log::debug!(
            "skeleton '{}': {} animated bones appended to the skin table",
            skeleton.name,
            appended
        );
    }

    let skeleton: &Skeleton = skeleton;
    sources
        .into_iter()
        .map(|source| {
            let clip = AnimationClip::for_skeleton(
                source.name,
                source.duration,
                source.ticks_per_second,
                skeleton,
                source.tracks,
            )?;
            log::debug!(
                "loaded clip '{}': {} ticks at {}/s, {} animated bones",
                clip.name(),
                clip.duration(),
                clip.ticks_per_second(),
                clip.bone_count()
            );
            Ok(clip)
        })
        .collect()
}

/// Read every clip file and bind them together to `skeleton`.
pub fn load_clips_from_files<P: AsRef<Path>>(
    paths: &[P],
    skeleton: &mut Skeleton,
) -> Result<Vec<AnimationClip>> {
    let sources = paths
        .iter()
        .map(|path| read_clip_file(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    bind_clips(sources, skeleton)
}

fn build_tracks(clip: &str, doc: BoneTrackDocument) -> Result<BoneTracks> {
    let context = |kind: &str, err: TendonError| {
        TendonError::InvalidTrack(format!("clip '{}', bone '{}', {}: {}", clip, doc.name, kind, err))
    };

    let mut tracks = BoneTracks::still(doc.name.clone());

    if !doc.positions.is_empty() {
        let keys = doc
            .positions
            .iter()
            .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
            .collect();
        tracks.positions = KeyframeTrack::new(keys).map_err(|e| context("positions", e))?;
    }

    if !doc.rotations.is_empty() {
        let keys = doc
            .rotations
            .iter()
            .map(|k| Ok(Keyframe::new(k.time, unit_quat(k.value, &doc.name)?)))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| context("rotations", e))?;
        tracks.rotations = KeyframeTrack::new(keys).map_err(|e| context("rotations", e))?;
    }

    if !doc.scales.is_empty() {
        let keys = doc
            .scales
            .iter()
            .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
            .collect();
        tracks.scales = KeyframeTrack::new(keys).map_err(|e| context("scales", e))?;
    }

    Ok(tracks)
}

fn unit_quat(xyzw: [f32; 4], owner: &str) -> Result<Quat> {
    let q = Quat::from_array(xyzw);
    let length = q.length();
    if !(length.is_finite() && length > 1e-6) {
        return Err(TendonError::InvalidTrack(format!(
            "'{}' has a degenerate rotation {:?}",
            owner, xyzw
        )));
    }
    Ok(q / length)
}
