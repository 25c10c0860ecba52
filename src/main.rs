// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use dual_camera::Config;
use dual_camera::backends::camera::Facing;
use dual_camera::constants::app_version;

mod cli;

#[derive(Parser)]
#[command(name = "dual-camera")]
#[command(about = "Take a rear photo and then a front photo with one shutter press")]
#[command(version = app_version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Camera used for the first photo (front or back)
    #[arg(long, global = true)]
    facing: Option<Facing>,

    /// Delay before the second photo, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Also wait for the second camera to report ready (delay becomes a minimum)
    #[arg(long, global = true)]
    wait_ready: bool,

    /// Answer the permission prompt with "deny"
    #[arg(long, global = true)]
    deny_permission: bool,

    /// Store the given options in the config file before running
    #[arg(long, global = true)]
    save_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture screen in the terminal (default)
    Terminal,

    /// List available cameras
    List,

    /// Run one capture sequence without a UI and print the photos as JSON
    Capture,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=dual_camera=debug, RUST_LOG=telemetry=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(version = app_version(), "Starting dual-camera");

    let mut config = Config::load();
    if let Some(facing) = cli.facing {
        config.initial_facing = facing;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.second_capture_delay_ms = delay_ms;
    }
    if cli.wait_ready {
        config.wait_for_secondary_ready = true;
    }
    if cli.save_config {
        config.save()?;
    }

    match cli.command {
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Capture) => cli::capture_sequence(config, cli.deny_permission),
        Some(Commands::Terminal) | None => dual_camera::terminal::run(config, cli.deny_permission),
    }
}
