// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Running one headless capture sequence

use dual_camera::app::{CaptureCallbacks, DualCaptureModel, Mount};
use dual_camera::backends::camera::{CameraBackendManager, PhotoSummary, VirtualCameraBackend};
use dual_camera::backends::permission::{PermissionState, VirtualPermission};
use dual_camera::Config;
use dual_camera::errors::AppError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// One line of `capture` output
#[derive(Serialize)]
struct CaptureReport {
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<PhotoSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CaptureReport {
    fn print(&self) {
        match serde_json::to_string(self) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "Failed to serialize capture report"),
        }
    }
}

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let manager =
        CameraBackendManager::new(Arc::new(VirtualCameraBackend::new(config.virtual_camera())));

    let cameras = manager.enumerate_cameras()?;
    let facings: Vec<String> = manager
        .available_facings()
        .iter()
        .map(|facing| facing.to_string())
        .collect();

    println!("Available cameras ({}):", facings.join(", "));
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        let marker = if camera.facing == config.initial_facing {
            " (primary)"
        } else {
            ""
        };
        println!("  [{}] {}{}", index, camera.name, marker);
        println!("      Facing: {}", camera.facing);
        println!("      Path:   {}", camera.path);
    }

    Ok(())
}

/// Run one capture sequence and print each delivered photo as a JSON line
pub fn capture_sequence(
    config: Config,
    deny_permission: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    // Set up Ctrl+C handler
    let (cancel_sender, cancel_receiver) = tokio::sync::oneshot::channel::<()>();
    let cancel_sender = Mutex::new(Some(cancel_sender));
    ctrlc::set_handler(move || {
        if let Some(sender) = cancel_sender.lock().ok().and_then(|mut s| s.take()) {
            let _ = sender.send(());
        }
    })?;

    let failed = Arc::new(AtomicBool::new(false));
    let failed_flag = Arc::clone(&failed);
    let callbacks = CaptureCallbacks::new(
        |photo| {
            CaptureReport {
                event: "back_camera_picture_saved",
                photo: Some(photo.summary()),
                error: None,
            }
            .print()
        },
        |photo| {
            CaptureReport {
                event: "front_camera_picture_saved",
                photo: Some(photo.summary()),
                error: None,
            }
            .print()
        },
    )
    .with_capture_error(move |err| {
        failed_flag.store(true, Ordering::SeqCst);
        CaptureReport {
            event: "capture_error",
            photo: None,
            error: Some(err.to_string()),
        }
        .print()
    })
    .with_sequence_complete(|| {
        CaptureReport {
            event: "sequence_complete",
            photo: None,
            error: None,
        }
        .print()
    });

    let backend = Arc::new(VirtualCameraBackend::new(config.virtual_camera()));
    let permissions = Arc::new(VirtualPermission::new(
        PermissionState::Unknown,
        !deny_permission,
    ));
    let model = DualCaptureModel::new(config, backend, permissions, callbacks);

    rt.block_on(async move {
        let mut mount = Mount::new(model);

        let outcome = tokio::select! {
            result = run_sequence(&mut mount) => result,
            _ = cancel_receiver => {
                println!();
                println!("Cancelled");
                Ok(())
            }
        };

        mount.teardown();
        outcome
    })?;

    if failed.load(Ordering::SeqCst) {
        return Err("capture sequence failed".into());
    }
    Ok(())
}

async fn run_sequence(mount: &mut Mount) -> Result<(), Box<dyn std::error::Error>> {
    // Mount-time permission query
    mount.settle().await;

    if mount.view().is_permission_gate() {
        info!("Camera permission not granted, requesting");
        mount.dispatch(dual_camera::Message::RequestPermission);
        mount.settle().await;
    }
    if mount.view().is_permission_gate() {
        return Err(AppError::Permission("camera access was not granted".into()).into());
    }

    // The primary stream is ready once everything has settled
    mount.dispatch(dual_camera::Message::Shutter);
    mount.settle().await;
    Ok(())
}
