// SPDX-License-Identifier: GPL-3.0-only

//! Permission gate handlers
//!
//! The grant state is fetched once at mount and afterwards changes only
//! through an explicit request.

use crate::app::state::{DualCaptureModel, Message};
use crate::app::task::Task;
use crate::backends::permission::PermissionState;
use std::sync::Arc;
use tracing::{debug, info};

impl DualCaptureModel {
    pub(crate) fn handle_mounted(&mut self) -> Task<Message> {
        debug!(facing = %self.session.facing, "Capture screen mounted");
        let permissions = Arc::clone(&self.permissions);
        Task::perform(
            async move { permissions.query().await },
            Message::PermissionQueried,
        )
    }

    pub(crate) fn handle_permission_queried(&mut self, state: PermissionState) -> Task<Message> {
        // A prompt answered in the meantime is more recent than the query
        if self.session.permission_requested || self.session.permission.is_granted() {
            debug!(%state, "Ignoring stale permission query result");
            return Task::none();
        }

        info!(%state, "Camera permission at mount");
        self.apply_permission(state)
    }

    pub(crate) fn handle_request_permission(&mut self) -> Task<Message> {
        if self.session.permission.is_granted() || self.session.permission_request_in_flight {
            return Task::none();
        }

        info!("Requesting camera permission");
        self.session.permission_request_in_flight = true;
        self.session.permission_requested = true;
        let permissions = Arc::clone(&self.permissions);
        Task::perform(
            async move { permissions.request().await },
            Message::PermissionResolved,
        )
    }

    pub(crate) fn handle_permission_resolved(&mut self, state: PermissionState) -> Task<Message> {
        self.session.permission_request_in_flight = false;
        if self.session.permission.is_granted() {
            return Task::none();
        }
        if !state.is_granted() {
            info!(%state, "Camera permission not granted");
        }
        self.apply_permission(state)
    }

    fn apply_permission(&mut self, state: PermissionState) -> Task<Message> {
        self.session.permission = state;
        if state.is_granted() {
            self.mount_primary_view()
        } else {
            Task::none()
        }
    }
}
