// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::callbacks::CaptureCallbacks;
use crate::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraBackendManager, CameraHandle, Facing, Photo,
};
use crate::backends::permission::{PermissionProvider, PermissionState};
use crate::config::Config;
use crate::telemetry::{NoopTelemetry, TelemetrySink, TracingTelemetry};
use std::sync::Arc;

/// Progress of the two-photo capture sequence
///
/// A mount runs at most one sequence. `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceState {
    /// Shutter not pressed yet (or the first capture failed)
    #[default]
    Idle,
    /// Waiting for the primary camera to return the first photo
    PrimaryInFlight,
    /// First photo delivered, second capture scheduled or running
    SecondaryPending,
    /// Both photos delivered
    Complete,
    /// The second capture failed
    Failed,
}

/// Coarse phase of the screen, derived from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPermission,
    AwaitingFirstCapture,
    AwaitingSecondCapture,
    Complete,
}

/// Transient state of one mount
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    /// Camera bound to the primary view
    pub facing: Facing,
    pub permission: PermissionState,
    /// True while a permission prompt is open
    pub permission_request_in_flight: bool,
    /// A prompt was shown; the mount-time query no longer applies
    pub permission_requested: bool,
    /// Bumped on every primary bind; ready signals carry the value they were bound under
    pub primary_stream: u64,
    /// Primary stream has reported ready
    pub primary_ready: bool,
    /// First photo taken; the secondary view is shown from here on
    pub secondary_captured: bool,
    /// Camera used for the second photo
    pub secondary_facing: Option<Facing>,
    /// First photo, drawn behind the busy indicator
    pub last_primary_image: Option<Photo>,
    /// Accepted shutter presses (telemetry only)
    pub capture_count: u64,
    pub sequence: SequenceState,
}

impl CaptureSession {
    pub fn new(facing: Facing) -> Self {
        Self {
            facing,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.permission.is_granted() {
            return Phase::AwaitingPermission;
        }
        match self.sequence {
            SequenceState::Idle | SequenceState::PrimaryInFlight => Phase::AwaitingFirstCapture,
            SequenceState::SecondaryPending => Phase::AwaitingSecondCapture,
            SequenceState::Complete | SequenceState::Failed => Phase::Complete,
        }
    }
}

/// Messages that drive the capture screen
#[derive(Debug, Clone)]
pub enum Message {
    /// Component mounted
    Mounted,
    /// Result of the one-time permission query at mount
    PermissionQueried(PermissionState),
    /// User asked to grant camera access
    RequestPermission,
    /// Permission prompt answered
    PermissionResolved(PermissionState),
    /// Stream for the primary view went live
    PrimaryReady { facing: Facing, stream: u64 },
    /// Waiting for the primary stream failed
    PrimaryStreamFailed(BackendError),
    /// Toggle the primary camera between front and back
    Flip,
    /// Shutter button
    Shutter,
    /// First capture resolved
    PrimaryCaptured(BackendResult<Photo>),
    /// Second capture resolved
    SecondaryCaptured(BackendResult<Photo>),
}

/// The capture screen: state plus its collaborators
pub struct DualCaptureModel {
    pub(crate) session: CaptureSession,
    pub(crate) config: Config,
    pub(crate) camera: CameraBackendManager,
    pub(crate) permissions: Arc<dyn PermissionProvider>,
    pub(crate) telemetry: Arc<dyn TelemetrySink>,
    pub(crate) callbacks: CaptureCallbacks,
}

impl DualCaptureModel {
    pub fn new(
        config: Config,
        backend: Arc<dyn CameraBackend>,
        permissions: Arc<dyn PermissionProvider>,
        callbacks: CaptureCallbacks,
    ) -> Self {
        let telemetry: Arc<dyn TelemetrySink> = if config.telemetry_enabled {
            Arc::new(TracingTelemetry)
        } else {
            Arc::new(NoopTelemetry)
        };

        Self {
            session: CaptureSession::new(config.initial_facing),
            config,
            camera: CameraBackendManager::new(backend),
            permissions,
            telemetry,
            callbacks,
        }
    }

    /// Replace the telemetry sink; ignored when telemetry is disabled in config
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        if self.config.telemetry_enabled {
            self.telemetry = sink;
        }
        self
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Handle bound to the camera of the current view, if any
    pub fn camera_handle(&self) -> Option<Arc<dyn CameraHandle>> {
        self.camera.current()
    }

    /// Handle of the primary view; None once the secondary camera is bound
    pub(crate) fn primary_handle(&self) -> Option<Arc<dyn CameraHandle>> {
        if self.session.secondary_captured {
            return None;
        }
        self.camera
            .current()
            .filter(|handle| handle.facing() == self.session.facing)
    }
}

impl std::fmt::Debug for DualCaptureModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualCaptureModel")
            .field("session", &self.session)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}
