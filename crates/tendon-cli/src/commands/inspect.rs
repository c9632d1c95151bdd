//! Skeleton and clip inspection command

use anyhow::Result;
use std::path::{Path, PathBuf};
use tendon_animation::loader::{load_clips_from_files, load_skeleton_from_file};
use tendon_animation::skeleton::MAX_BONES;

pub fn run(skeleton_path: &Path, clip_paths: &[PathBuf]) -> Result<()> {
    let mut skeleton = load_skeleton_from_file(skeleton_path)?;
    let skinned = skeleton.bone_count();

    // Binding may append animated bones to the skin table
    let clips = load_clips_from_files(clip_paths, &mut skeleton)?;

    println!("Skeleton: {}", skeleton.name);
    println!(
        "  {} nodes, {}/{} bone slots",
        skeleton.root.node_count(),
        skeleton.bone_count(),
        MAX_BONES
    );

    println!("\nHierarchy:");
    skeleton.root.walk(&mut |node, depth| {
        let marker = match skeleton.bone_info().get(&node.name) {
            Some(info) => format!(" [{}]", info.index),
            None => String::new(),
        };
        println!("  {}{}{}", "  ".repeat(depth), node.name, marker);
    });

    let mut skin: Vec<_> = skeleton.bone_info().iter().collect();
    skin.sort_by_key(|(_, info)| info.index);
    println!("\nSkin table:");
    for (name, info) in skin {
        let translation = info.offset.w_axis.truncate();
        let origin = if info.index >= skinned { "  (appended)" } else { "" };
        println!(
            "  {:>3}  {:<24} offset t=({:.3}, {:.3}, {:.3}){}",
            info.index, name, translation.x, translation.y, translation.z, origin
        );
    }

    if clips.is_empty() {
        return Ok(());
    }

    println!("\nClips:");
    for clip in &clips {
        println!(
            "  {:<16} {:>8.2} ticks @ {:>6.2}/s = {:>6.2}s, {} animated bones",
            clip.name(),
            clip.duration(),
            clip.ticks_per_second(),
            clip.duration_seconds(),
            clip.bone_count()
        );
    }

    Ok(())
}
