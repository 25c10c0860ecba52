// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Directory name under the user config dir
pub const APP_DIR_NAME: &str = "dual-camera";

/// Config file name inside [`APP_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Bump when a config field changes meaning
pub const CONFIG_VERSION: u32 = 1;

/// Default gap between the first photo resolving and the second capture
pub const SECOND_CAPTURE_DELAY_MS: u64 = 1000;

/// Telemetry event sent for every accepted shutter press
pub const CAPTURE_EVENT_NAME: &str = "increment";

/// Payload key of [`CAPTURE_EVENT_NAME`]; value is the count before the press
pub const CAPTURE_EVENT_KEY: &str = "takePhotoCount";

/// Simulated stream start-up time
pub const VIRTUAL_WARMUP_MS: u64 = 400;

/// Simulated time to take one photo
pub const VIRTUAL_CAPTURE_LATENCY_MS: u64 = 120;

/// Terminal redraw / input poll interval
pub const TERMINAL_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Busy indicator animation frames
pub const SPINNER_FRAMES: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// Spinner frame for a given tick
pub fn spinner_frame(tick: u64) -> char {
    SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
}

/// Version string baked in by build.rs
pub fn app_version() -> &'static str {
    env!("GIT_VERSION")
}
