// SPDX-License-Identifier: MPL-2.0

//! The dual-capture screen
//!
//! # Architecture
//!
//! - `state`: Session state, messages and the model (`DualCaptureModel`)
//! - `update`: Message dispatch
//! - `handlers`: Permission, camera and capture-sequence handlers
//! - `view`: Which sub-view is visible and what it offers
//! - `task`: Deferred work returned from `update`
//! - `runtime`: One component mount, driving the model on tokio
//! - `callbacks`: Caller-supplied outputs
//!
//! # Flow
//!
//! ```text
//! PermissionGate ──granted──▶ PrimaryCapture ──first photo──▶ SecondaryCapture
//!                                  │                              │
//!                          on_back_camera_picture_saved   delay, then
//!                                                         on_front_camera_picture_saved
//! ```

pub mod callbacks;
mod handlers;
pub mod runtime;
pub mod state;
pub mod task;
mod update;
pub mod view;

pub use callbacks::CaptureCallbacks;
pub use runtime::Mount;
pub use state::{CaptureSession, DualCaptureModel, Message, Phase, SequenceState};
pub use task::Task;
pub use view::{UserAction, View};
