// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` only dispatches. The handling code lives in the `handlers`
//! submodules, grouped by concern:
//!
//! - `handlers::permission`: mount-time query and the grant prompt
//! - `handlers::camera`: stream binding, readiness, flipping
//! - `handlers::capture`: the two-photo capture sequence

use crate::app::state::{DualCaptureModel, Message};
use crate::app::task::Task;

impl DualCaptureModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // ===== Permission =====
            Message::Mounted => self.handle_mounted(),
            Message::PermissionQueried(state) => self.handle_permission_queried(state),
            Message::RequestPermission => self.handle_request_permission(),
            Message::PermissionResolved(state) => self.handle_permission_resolved(state),

            // ===== Camera =====
            Message::PrimaryReady { facing, stream } => self.handle_primary_ready(facing, stream),
            Message::PrimaryStreamFailed(error) => self.handle_primary_stream_failed(error),
            Message::Flip => self.handle_flip(),

            // ===== Capture =====
            Message::Shutter => self.handle_shutter(),
            Message::PrimaryCaptured(result) => self.handle_primary_captured(result),
            Message::SecondaryCaptured(result) => self.handle_secondary_captured(result),
        }
    }
}
