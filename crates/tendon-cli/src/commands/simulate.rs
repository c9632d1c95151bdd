//! Headless simulation command

use crate::config::DemoConfig;
use crate::script::InputScript;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tendon_animation::AnimationSystem;
use tendon_runtime::{GameClock, InputState, RuntimeSystem};

pub struct SimulateArgs {
    pub config: PathBuf,
    pub script: PathBuf,
    pub fps: f64,
    pub duration: Option<f64>,
    pub matrices: Option<PathBuf>,
}

/// Final pose dump written by `--matrices`
#[derive(Debug, Serialize)]
struct MatrixDump {
    time: f64,
    frames: u64,
    state: String,
    clip: Option<String>,
    /// One column-major matrix per used bone slot
    matrices: Vec<[f32; 16]>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }

    let config = DemoConfig::load(&args.config)?;
    let mut script = InputScript::load(&args.script)?;
    let mut system = config.build_system()?;
    log::info!(
        "loaded {} clips for skeleton {}",
        system.library.len(),
        config.skeleton.display()
    );

    let mut input = InputState::new();
    input.apply_config(&config.input);

    let duration = args.duration.unwrap_or(script.end_time() + 1.0);
    let dt = 1.0 / args.fps;
    let mut clock = GameClock::new();

    println!(
        "Simulating {:.2}s at {} fps ({} script events)",
        duration,
        args.fps,
        script.len()
    );
    println!("[{:>8.3}s] {}", 0.0, system.state_machine.state());

    system.initialize()?;
    // Events at t=0 are seen by the first frame
    script.apply_until(0.0, &mut input);

    while clock.total_time < duration {
        clock.advance(dt);
        system.update(&input, clock.delta_time)?;

        for change in system.events.drain() {
            println!("[{:>8.3}s] {} -> {}", clock.total_time, change.from, change.to);
        }

        input.end_frame();
        script.apply_until(clock.total_time, &mut input);
    }

    system.shutdown()?;
    println!(
        "Done after {} frames, final state {}",
        clock.frame_count,
        system.state_machine.state()
    );

    if let Some(path) = &args.matrices {
        let dump = matrix_dump(&system, clock.total_time, clock.frame_count);
        let json = serde_json::to_string_pretty(&dump)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} bone matrices to {}", dump.matrices.len(), path.display());
    }

    Ok(())
}

fn matrix_dump(system: &AnimationSystem, time: f64, frames: u64) -> MatrixDump {
    let clip = system
        .animator
        .primary()
        .and_then(|id| system.library.get(id));
    let used = clip.map_or(0, |c| c.bone_info().len());

    MatrixDump {
        time,
        frames,
        state: system.state_machine.state().to_string(),
        clip: clip.map(|c| c.name().to_string()),
        matrices: system
            .animator
            .final_bone_matrices()
            .iter()
            .take(used)
            .map(|m| m.to_cols_array())
            .collect(),
    }
}
