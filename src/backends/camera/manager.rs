// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides:
//! - Exclusive ownership of the single bound camera handle
//! - Thread-safe backend access

use super::CameraBackend;
use super::types::*;
use super::CameraHandle;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Internal manager state
struct ManagerState {
    /// Handle of the currently mounted capture view, if any
    bound: Option<Arc<dyn CameraHandle>>,
}

/// Camera backend manager
///
/// Whichever capture view is mounted uses the one handle held here. Binding a
/// new facing closes the previous handle first, so two streams never coexist.
#[derive(Clone)]
pub struct CameraBackendManager {
    backend: Arc<dyn CameraBackend>,
    state: Arc<Mutex<ManagerState>>,
}

impl CameraBackendManager {
    /// Create a new backend manager
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(ManagerState { bound: None })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enumerate available cameras
    pub fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        let cameras = self.backend.enumerate_cameras();
        if cameras.is_empty() {
            Err(BackendError::DeviceNotFound("No cameras found".to_string()))
        } else {
            Ok(cameras)
        }
    }

    /// Facings the backend can serve
    pub fn available_facings(&self) -> Vec<Facing> {
        self.backend.available_facings()
    }

    /// Bind the camera with the given facing, releasing any previous handle
    pub fn bind(&self, facing: Facing) -> BackendResult<Arc<dyn CameraHandle>> {
        let mut state = self.lock();

        if let Some(previous) = state.bound.take() {
            debug!(facing = %previous.facing(), "Releasing previous camera handle");
            previous.close();
        }

        info!(%facing, "Binding camera");
        let handle = self.backend.bind(facing)?;
        state.bound = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Handle of the currently bound camera
    pub fn current(&self) -> Option<Arc<dyn CameraHandle>> {
        self.lock().bound.clone()
    }

    /// Facing of the currently bound camera
    pub fn current_facing(&self) -> Option<Facing> {
        self.lock().bound.as_ref().map(|handle| handle.facing())
    }

    /// Close and drop the bound handle (view unmount)
    pub fn release(&self) {
        if let Some(handle) = self.lock().bound.take() {
            info!(facing = %handle.facing(), "Releasing camera");
            handle.close();
        }
    }
}

impl std::fmt::Debug for CameraBackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraBackendManager")
            .field("bound", &self.current_facing())
            .finish()
    }
}
