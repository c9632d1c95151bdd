//! Tendon CLI - inspect skeletons and clips, replay input scripts headlessly

mod commands;
mod config;
mod script;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, simulate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tendon")]
#[command(about = "Skeletal animation blending and state machine driver", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a skeleton's hierarchy and skin table, plus clip summaries
    Inspect {
        /// Path to a .skeleton.toml file
        skeleton: PathBuf,

        /// Clip files (.anim.toml) to load against the skeleton
        clips: Vec<PathBuf>,
    },

    /// Run the animation system on a fixed timestep, replaying a key script
    Simulate {
        /// Path to the demo config (tendon.toml)
        #[arg(long, default_value = "tendon.toml")]
        config: PathBuf,

        /// Path to the input script
        #[arg(long)]
        script: PathBuf,

        /// Simulation frames per second
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Seconds to simulate (default: one second past the last event)
        #[arg(long)]
        duration: Option<f64>,

        /// Write the final bone matrices to this JSON file
        #[arg(long)]
        matrices: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still overrides the flags
    let default_filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Inspect { skeleton, clips } => inspect::run(&skeleton, &clips),
        Commands::Simulate {
            config,
            script,
            fps,
            duration,
            matrices,
        } => simulate::run(simulate::SimulateArgs {
            config,
            script,
            fps,
            duration,
            matrices,
        }),
    }
}
