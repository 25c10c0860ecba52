// SPDX-License-Identifier: GPL-3.0-only

//! Camera stream handlers
//!
//! Binding, readiness and front/back flipping for the primary view.

use crate::app::state::{DualCaptureModel, Message, SequenceState};
use crate::app::task::Task;
use crate::backends::camera::{BackendError, CameraHandle, Facing};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl DualCaptureModel {
    /// Bind the primary camera and wait for its stream to go live
    pub(crate) fn mount_primary_view(&mut self) -> Task<Message> {
        if self.session.secondary_captured || self.primary_handle().is_some() {
            return Task::none();
        }
        self.bind_primary()
    }

    /// Bind `session.facing` as a new primary stream
    ///
    /// Readiness restarts from false and only the ready signal of this bind
    /// is accepted.
    fn bind_primary(&mut self) -> Task<Message> {
        self.session.primary_ready = false;
        self.session.primary_stream += 1;
        match self.camera.bind(self.session.facing) {
            Ok(handle) => Self::watch_primary_ready(handle, self.session.primary_stream),
            Err(e) => {
                // Without a handle the shutter stays a no-op
                warn!(facing = %self.session.facing, error = %e, "Failed to bind primary camera");
                Task::none()
            }
        }
    }

    fn watch_primary_ready(handle: Arc<dyn CameraHandle>, stream: u64) -> Task<Message> {
        let facing = handle.facing();
        Task::perform(async move { handle.wait_ready().await }, move |result| {
            match result {
                Ok(()) => Message::PrimaryReady { facing, stream },
                Err(e) => Message::PrimaryStreamFailed(e),
            }
        })
    }

    pub(crate) fn handle_primary_ready(&mut self, facing: Facing, stream: u64) -> Task<Message> {
        if self.session.secondary_captured || stream != self.session.primary_stream {
            debug!(%facing, stream, "Ignoring ready signal from a replaced stream");
            return Task::none();
        }
        if self.session.primary_ready {
            return Task::none();
        }

        info!(%facing, "Primary camera ready");
        self.session.primary_ready = true;
        Task::none()
    }

    pub(crate) fn handle_primary_stream_failed(&mut self, error: BackendError) -> Task<Message> {
        match error {
            // Stream was closed by a flip or teardown
            BackendError::Disconnected => debug!("Primary stream closed before it became ready"),
            error => warn!(%error, "Primary camera stream failed to start"),
        }
        Task::none()
    }

    pub(crate) fn handle_flip(&mut self) -> Task<Message> {
        if !self.session.permission.is_granted()
            || self.session.secondary_captured
            || self.session.sequence != SequenceState::Idle
        {
            return Task::none();
        }

        self.session.facing = self.session.facing.opposite();
        info!(facing = %self.session.facing, "Flipping primary camera");

        self.bind_primary()
    }

    /// Release the camera; called when the screen is unmounted
    pub(crate) fn teardown(&mut self) {
        if self.session.sequence == SequenceState::SecondaryPending {
            info!("Unmounted with the second capture pending, cancelling it");
        }
        self.camera.release();
    }
}
