// SPDX-License-Identifier: MPL-2.0

//! Dual Camera - sequential rear/front capture screen
//!
//! One press of the shutter takes a photo with the primary camera, swaps to
//! the opposite camera, and takes a second photo after a short delay. Both
//! photos are handed to the caller through callbacks.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Orchestrator state machine, view selection and the mount runtime
//! - [`backends`]: Camera hardware and permission abstractions (plus simulated ones)
//! - [`telemetry`]: Fire-and-forget usage events
//! - [`config`]: User configuration handling
//! - [`terminal`]: Terminal front-end
//!
//! # Example
//!
//! ```ignore
//! let model = DualCaptureModel::new(config, backend, permissions, callbacks);
//! let mut mount = Mount::new(model);
//! mount.settle().await;
//! mount.dispatch(Message::Shutter);
//! mount.settle().await;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod telemetry;
pub mod terminal;

// Re-export commonly used types
pub use app::{CaptureCallbacks, DualCaptureModel, Message, Mount, View};
pub use backends::camera::{Facing, Photo};
pub use config::Config;
