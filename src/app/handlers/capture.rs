// SPDX-License-Identifier: GPL-3.0-only

//! Capture sequence handlers
//!
//! Shutter press → primary capture → view swap → fixed delay → secondary
//! capture. Each step is a message so the whole sequence stays on the
//! single thread that owns the model.

use crate::app::state::{DualCaptureModel, Message, SequenceState};
use crate::app::task::Task;
use crate::backends::camera::{BackendResult, CameraHandle, Photo};
use crate::constants::{CAPTURE_EVENT_KEY, CAPTURE_EVENT_NAME};
use crate::errors::{CaptureError, CaptureStage};
use crate::telemetry::{self, TelemetryEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

impl DualCaptureModel {
    pub(crate) fn handle_shutter(&mut self) -> Task<Message> {
        // Not ready / no handle / already used: dropped without feedback
        if !self.session.permission.is_granted()
            || !self.session.primary_ready
            || self.session.sequence != SequenceState::Idle
        {
            return Task::none();
        }
        let Some(handle) = self.primary_handle() else {
            return Task::none();
        };

        let previous_count = self.session.capture_count;
        self.session.capture_count += 1;
        telemetry::emit(
            self.telemetry.as_ref(),
            TelemetryEvent::new(CAPTURE_EVENT_NAME, CAPTURE_EVENT_KEY, previous_count),
        );

        info!(facing = %self.session.facing, "Capturing primary photo...");
        self.session.sequence = SequenceState::PrimaryInFlight;
        Task::perform(
            async move { handle.capture_photo().await },
            Message::PrimaryCaptured,
        )
    }

    pub(crate) fn handle_primary_captured(&mut self, result: BackendResult<Photo>) -> Task<Message> {
        if self.session.sequence != SequenceState::PrimaryInFlight {
            debug!("Ignoring primary capture result outside of a capture");
            return Task::none();
        }

        let photo = match result {
            Ok(photo) => photo,
            Err(e) => {
                // Stay on the primary view; the shutter may be pressed again
                self.session.sequence = SequenceState::Idle;
                self.report_capture_error(CaptureError::new(CaptureStage::Primary, e));
                return Task::none();
            }
        };

        info!(uri = %photo.uri, "Primary photo saved");
        let secondary_facing = self.session.facing.opposite();
        self.session.secondary_captured = true;
        self.session.secondary_facing = Some(secondary_facing);
        self.session.last_primary_image = Some(photo.clone());
        self.session.sequence = SequenceState::SecondaryPending;
        self.callbacks.primary_saved(&photo);

        // Mounting the secondary view takes over the camera
        let handle = match self.camera.bind(secondary_facing) {
            Ok(handle) => handle,
            Err(e) => return Task::done(Message::SecondaryCaptured(Err(e))),
        };

        let delay = self.config.second_capture_delay();
        let wait_ready = self.config.wait_for_secondary_ready;
        debug!(?delay, wait_ready, facing = %secondary_facing, "Scheduling secondary capture");
        Task::perform(
            second_capture(handle, delay, wait_ready),
            Message::SecondaryCaptured,
        )
    }

    pub(crate) fn handle_secondary_captured(
        &mut self,
        result: BackendResult<Photo>,
    ) -> Task<Message> {
        if self.session.sequence != SequenceState::SecondaryPending {
            debug!("Ignoring secondary capture result outside of a capture");
            return Task::none();
        }

        match result {
            Ok(photo) => {
                info!(uri = %photo.uri, "Secondary photo saved");
                self.session.sequence = SequenceState::Complete;
                self.callbacks.secondary_saved(&photo);
                self.callbacks.sequence_complete();
            }
            Err(e) => {
                self.session.sequence = SequenceState::Failed;
                self.report_capture_error(CaptureError::new(CaptureStage::Secondary, e));
            }
        }
        Task::none()
    }

    fn report_capture_error(&mut self, err: CaptureError) {
        if !self.callbacks.capture_failed(&err) {
            error!(stage = %err.stage, error = %err.source, "Capture failed");
        }
    }
}

/// The delayed capture on the secondary camera
///
/// With `wait_ready` the stream's own ready signal is awaited as well, and
/// `delay` only acts as a minimum.
async fn second_capture(
    handle: Arc<dyn CameraHandle>,
    delay: Duration,
    wait_ready: bool,
) -> BackendResult<Photo> {
    if wait_ready {
        let (_, ready) = tokio::join!(tokio::time::sleep(delay), handle.wait_ready());
        ready?;
    } else {
        tokio::time::sleep(delay).await;
    }
    handle.capture_photo().await
}
