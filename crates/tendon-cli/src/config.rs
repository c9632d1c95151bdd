//! Demo configuration (`tendon.toml`)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tendon_animation::library::ClipLibrary;
use tendon_animation::loader::{load_clips_from_files, load_skeleton_from_file};
use tendon_animation::skeleton::Skeleton;
use tendon_animation::state_machine::{StateClips, StateMachineConfig};
use tendon_animation::AnimationSystem;
use tendon_runtime::{InputConfig, InputState};

/// ```toml
/// skeleton = "dancer.skeleton.toml"
///
/// [clips]
/// idle = "idle.anim.toml"
/// dance = "dance.anim.toml"
/// moonwalk = "moonwalk.anim.toml"
///
/// [state_machine]
/// blend_rate = 2.0
///
/// [input.bindings]
/// dance = ["ArrowLeft", "KeyA"]
/// ```
#[derive(Debug, Deserialize)]
pub struct DemoConfig {
    pub skeleton: PathBuf,
    pub clips: ClipPaths,
    #[serde(default)]
    pub state_machine: StateMachineConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Deserialize)]
pub struct ClipPaths {
    pub idle: PathBuf,
    pub dance: PathBuf,
    pub moonwalk: PathBuf,
}

impl DemoConfig {
    /// Read a config file; relative paths inside it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, base)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self> {
        let mut config: DemoConfig = toml::from_str(content)?;
        config.state_machine.validate()?;

        config.skeleton = base.join(&config.skeleton);
        config.clips.idle = base.join(&config.clips.idle);
        config.clips.dance = base.join(&config.clips.dance);
        config.clips.moonwalk = base.join(&config.clips.moonwalk);

        let known = InputState::new().action_names();
        for action in config.input.bindings.keys() {
            if !known.contains(action) {
                bail!(
                    "unknown input action '{}'; valid actions: {}",
                    action,
                    known.join(", ")
                );
            }
        }

        Ok(config)
    }

    pub fn load_skeleton(&self) -> Result<Skeleton> {
        Ok(load_skeleton_from_file(&self.skeleton)?)
    }

    /// Load the skeleton and all three clips, and build the animation system.
    ///
    /// The clips are bound to the skeleton together so they share one skin table.
    pub fn build_system(&self) -> Result<AnimationSystem> {
        let mut skeleton = self.load_skeleton()?;
        let clips = load_clips_from_files(
            &[&self.clips.idle, &self.clips.dance, &self.clips.moonwalk],
            &mut skeleton,
        )?;

        let mut library = ClipLibrary::new();
        let ids: Vec<_> = clips.into_iter().map(|clip| library.add(clip)).collect();
        let &[idle, dance, moonwalk] = ids.as_slice() else {
            bail!("expected three clips, loaded {}", ids.len());
        };

        let clips = StateClips {
            idle,
            dance,
            moonwalk,
        };
        Ok(AnimationSystem::new(library, clips, self.state_machine)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use tendon_animation::state_machine::{AnimationRequests, ForcedPose};
    use winit::keyboard::KeyCode;

    const MINIMAL: &str = r#"
skeleton = "rig/dancer.skeleton.toml"

[clips]
idle = "idle.anim.toml"
dance = "dance.anim.toml"
moonwalk = "/abs/moonwalk.anim.toml"
"#;

    #[test]
    fn defaults_and_path_resolution() {
        let config = DemoConfig::from_toml_str(MINIMAL, Path::new("demos")).unwrap();
        assert_eq!(config.skeleton, PathBuf::from("demos/rig/dancer.skeleton.toml"));
        assert_eq!(config.clips.idle, PathBuf::from("demos/idle.anim.toml"));
        assert_eq!(config.clips.moonwalk, PathBuf::from("/abs/moonwalk.anim.toml"));
        assert_eq!(config.state_machine.blend_rate, 2.0);
        assert!(config.input.bindings.is_empty());
    }

    #[test]
    fn parses_optional_tables() {
        let content = format!(
            "{}\n[state_machine]\nblend_rate = 4.0\n\n[input.bindings]\ndance = [\"KeyA\", \"ArrowLeft\"]\n",
            MINIMAL
        );
        let config = DemoConfig::from_toml_str(&content, Path::new(".")).unwrap();
        assert_eq!(config.state_machine.blend_rate, 4.0);
        assert_eq!(
            config.input.bindings.get("dance"),
            Some(&vec![KeyCode::KeyA, KeyCode::ArrowLeft])
        );
    }

    #[test]
    fn rejects_bad_blend_rate() {
        let content = format!("{}\n[state_machine]\nblend_rate = -1.0\n", MINIMAL);
        assert!(DemoConfig::from_toml_str(&content, Path::new(".")).is_err());
    }

    #[test]
    fn rejects_unknown_action() {
        let content = format!("{}\n[input.bindings]\njump = [\"Space\"]\n", MINIMAL);
        let err = DemoConfig::from_toml_str(&content, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("jump"));
    }

    #[test]
    fn rejects_missing_clip() {
        let content = "skeleton = \"a.skeleton.toml\"\n[clips]\nidle = \"idle.anim.toml\"\n";
        assert!(DemoConfig::from_toml_str(content, Path::new(".")).is_err());
    }

    fn demo_config_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/tendon.toml")
    }

    #[test]
    fn demo_clips_share_one_skin_table() {
        let config = DemoConfig::load(&demo_config_path()).unwrap();
        let system = config.build_system().unwrap();

        let tables: Vec<_> = system.library.iter().map(|(_, clip)| clip.bone_info()).collect();
        assert_eq!(tables.len(), 3);
        assert!(tables.iter().all(|table| *table == tables[0]));
        assert!(tables[0].contains_key("HeadTop_End"));
    }

    #[test]
    fn idle_rewrites_slot_only_moonwalk_animates() {
        let config = DemoConfig::load(&demo_config_path()).unwrap();
        let mut system = config.build_system().unwrap();
        let info = system
            .library
            .iter()
            .next()
            .map(|(_, clip)| clip.bone_info().clone())
            .unwrap();
        let tip = info.get("HeadTop_End").unwrap().index;
        let head = *info.get("Head").unwrap();

        let force = |pose| AnimationRequests {
            force: Some(pose),
            ..Default::default()
        };
        system.step(&force(ForcedPose::Moonwalk), 0.25);
        let hold = AnimationRequests {
            moonwalk: true,
            ..Default::default()
        };
        system.step(&hold, 0.25);
        let moonwalk_tip = system.animator.final_bone_matrices()[tip];

        system.step(&force(ForcedPose::Idle), 0.1);
        for _ in 0..30 {
            system.step(&AnimationRequests::default(), 1.0 / 60.0);
        }

        // Idle leaves the tip at its bind offset under the head
        let matrices = system.animator.final_bone_matrices();
        let head_world = matrices[head.index] * head.offset.inverse();
        let expected = head_world * Mat4::from_translation(Vec3::new(0.0, 0.2, 0.0));
        assert!(matrices[tip].abs_diff_eq(expected, 1e-4));
        assert!(!matrices[tip].abs_diff_eq(moonwalk_tip, 1e-3));
    }
}
