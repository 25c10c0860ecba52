// SPDX-License-Identifier: MPL-2.0

//! Error types for the dual-capture screen

use crate::backends::camera::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera hardware errors outside of a capture sequence
    Camera(BackendError),
    /// A capture inside the sequence failed
    Capture(CaptureError),
    /// Permission subsystem errors
    Permission(String),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Which capture of the sequence failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    /// The shutter-triggered capture on the primary view
    Primary,
    /// The delayed capture on the opposite-facing camera
    Secondary,
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStage::Primary => write!(f, "primary"),
            CaptureStage::Secondary => write!(f, "secondary"),
        }
    }
}

/// Hardware failure of one of the two capture calls
#[derive(Debug, Clone)]
pub struct CaptureError {
    pub stage: CaptureStage,
    pub source: BackendError,
}

impl CaptureError {
    pub fn new(stage: CaptureStage, source: BackendError) -> Self {
        Self { stage, source }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "{}", e),
            AppError::Permission(msg) => write!(f, "Permission error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} capture failed: {}", self.stage, self.source)
    }
}

impl std::error::Error for AppError {}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
