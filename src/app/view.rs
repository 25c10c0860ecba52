// SPDX-License-Identifier: GPL-3.0-only

//! View selection
//!
//! Which of the three sub-views is visible is a pure function of the session,
//! so front-ends only ever draw what `view()` returns.

use crate::app::state::{DualCaptureModel, Message, SequenceState};
use crate::backends::camera::{Facing, Photo};
use crate::backends::permission::PermissionState;

/// The visible sub-view
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Camera access not granted; offers the request action
    PermissionGate {
        permission: PermissionState,
        request_in_flight: bool,
    },
    /// Live feed with shutter and flip controls
    PrimaryCapture { facing: Facing, ready: bool },
    /// Opposite camera with the first photo drawn over it
    SecondaryCapture {
        facing: Facing,
        overlay: Photo,
        busy: bool,
    },
}

/// Something the user can trigger on the visible view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    RequestPermission,
    Shutter,
    Flip,
}

impl UserAction {
    pub fn message(self) -> Message {
        match self {
            UserAction::RequestPermission => Message::RequestPermission,
            UserAction::Shutter => Message::Shutter,
            UserAction::Flip => Message::Flip,
        }
    }
}

impl View {
    /// User-triggerable actions of this view
    pub fn actions(&self) -> &'static [UserAction] {
        match self {
            View::PermissionGate { .. } => &[UserAction::RequestPermission],
            View::PrimaryCapture { .. } => &[UserAction::Shutter, UserAction::Flip],
            // The second capture is started by the orchestrator, never the user
            View::SecondaryCapture { .. } => &[],
        }
    }

    pub fn offers(&self, action: UserAction) -> bool {
        self.actions().contains(&action)
    }

    /// Explanation shown on the permission gate
    pub fn permission_message(&self) -> Option<&'static str> {
        match self {
            View::PermissionGate {
                request_in_flight: true,
                ..
            } => Some("Waiting for camera permission..."),
            View::PermissionGate {
                permission: PermissionState::Denied,
                ..
            } => Some("Camera permission denied, grant it to take photos"),
            View::PermissionGate { .. } => {
                Some("Camera permission not granted, grant it to take photos")
            }
            _ => None,
        }
    }

    pub fn is_permission_gate(&self) -> bool {
        matches!(self, View::PermissionGate { .. })
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, View::PrimaryCapture { .. })
    }

    pub fn is_secondary(&self) -> bool {
        matches!(self, View::SecondaryCapture { .. })
    }

    /// Camera the visible capture view is bound to
    pub fn facing(&self) -> Option<Facing> {
        match self {
            View::PermissionGate { .. } => None,
            View::PrimaryCapture { facing, .. } | View::SecondaryCapture { facing, .. } => {
                Some(*facing)
            }
        }
    }
}

impl DualCaptureModel {
    pub fn view(&self) -> View {
        let session = &self.session;

        if !session.permission.is_granted() {
            return View::PermissionGate {
                permission: session.permission,
                request_in_flight: session.permission_request_in_flight,
            };
        }

        match (session.secondary_captured, &session.last_primary_image) {
            (true, Some(photo)) => View::SecondaryCapture {
                facing: session
                    .secondary_facing
                    .unwrap_or_else(|| session.facing.opposite()),
                overlay: photo.clone(),
                busy: session.sequence == SequenceState::SecondaryPending,
            },
            _ => View::PrimaryCapture {
                facing: session.facing,
                ready: session.primary_ready,
            },
        }
    }
}
