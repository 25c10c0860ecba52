// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The capture screen never talks to hardware directly. It goes through the
//! manager, which owns the one handle that may be bound at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ Orchestrator (app)  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackendManager│  ← Exclusive handle ownership
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← bind(facing) -> CameraHandle
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │Virtual │  ← Simulated hardware
//!       └────────┘
//! ```

pub mod manager;
pub mod types;
pub mod virtual_camera;

pub use manager::CameraBackendManager;
pub use types::*;
pub use virtual_camera::{VirtualCameraBackend, VirtualCameraSettings};

use async_trait::async_trait;
use std::sync::Arc;

/// Camera hardware API
///
/// Backends enumerate the facings they can serve and hand out live stream
/// handles. Dropping a handle unbinds the stream.
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Start streaming from the camera with the given facing
    ///
    /// # Returns
    /// * `Ok(handle)` - Stream bound; readiness is signalled by [`CameraHandle::wait_ready`]
    /// * `Err(BackendError::DeviceNotFound)` - No camera with that facing
    fn bind(&self, facing: Facing) -> BackendResult<Arc<dyn CameraHandle>>;

    /// Facings this backend can bind
    fn available_facings(&self) -> Vec<Facing> {
        let mut facings = Vec::new();
        for camera in self.enumerate_cameras() {
            if !facings.contains(&camera.facing) {
                facings.push(camera.facing);
            }
        }
        facings
    }
}

/// A bound, streaming camera
#[async_trait]
pub trait CameraHandle: Send + Sync {
    /// Facing this stream is bound to
    fn facing(&self) -> Facing;

    /// Resolves once the live feed has started and can accept captures
    async fn wait_ready(&self) -> BackendResult<()>;

    /// Capture a single photo
    ///
    /// Suspends until the hardware returns an image or fails.
    async fn capture_photo(&self) -> BackendResult<Photo>;

    /// Latest preview image, for front-ends that draw the live feed
    fn preview(&self) -> Option<Arc<image::RgbaImage>> {
        None
    }

    /// Stop the stream; later captures on clones of this handle must fail
    fn close(&self) {}
}
