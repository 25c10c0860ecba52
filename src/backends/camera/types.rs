// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Which physical camera a view is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front-mounted (selfie) camera
    Front,
    /// Rear-mounted camera
    #[default]
    Back,
}

impl Facing {
    pub const ALL: [Facing; 2] = [Facing::Back, Facing::Front];

    /// The camera on the other side of the device
    pub fn opposite(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    /// Lowercase identifier, used in URIs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Front => "front",
            Facing::Back => "back",
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(Facing::Front),
            "back" | "rear" | "environment" => Ok(Facing::Back),
            other => Err(format!("unknown camera facing '{}'", other)),
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub name: String,
    pub facing: Facing,
    /// Backend-specific location (device path, node id, `virtual://...`)
    pub path: String,
}

/// A captured photo as handed to the caller
///
/// `uri` is the only field every backend must fill in. Pixels are optional and
/// shared so views can draw the image without copying it.
#[derive(Clone)]
pub struct Photo {
    pub id: Uuid,
    pub uri: String,
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
    pub pixels: Option<Arc<image::RgbaImage>>,
}

impl Photo {
    /// Create a photo handle that only carries a location
    pub fn from_uri(uri: impl Into<String>, facing: Facing) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri: uri.into(),
            facing,
            width: 0,
            height: 0,
            captured_at: Local::now(),
            pixels: None,
        }
    }

    /// Create a photo handle backed by in-memory RGBA pixels
    pub fn from_image(uri: impl Into<String>, facing: Facing, image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: Some(Arc::new(image)),
            ..Self::from_uri(uri, facing)
        }
    }

    /// Serializable summary (everything except the pixel data)
    pub fn summary(&self) -> PhotoSummary {
        PhotoSummary {
            id: self.id.to_string(),
            uri: self.uri.clone(),
            facing: self.facing,
            width: self.width,
            height: self.height,
            captured_at: self.captured_at.to_rfc3339(),
        }
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("uri", &self.uri)
            .field("facing", &self.facing)
            .field("size", &format_args!("{}x{}", self.width, self.height))
            .field("has_pixels", &self.pixels.is_some())
            .finish()
    }
}

impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Photo metadata for logs and JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub id: String,
    pub uri: String,
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
    pub captured_at: String,
}

/// Backend error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No camera with the requested facing
    DeviceNotFound(String),
    /// Stream has not started yet
    NotReady,
    /// The hardware rejected or failed the capture
    CaptureFailed(String),
    /// Handle was released or the device went away
    Disconnected,
    /// Generic error
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::NotReady => write!(f, "Camera stream not ready"),
            BackendError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            BackendError::Disconnected => write!(f, "Camera disconnected"),
            BackendError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for facing in Facing::ALL {
            assert_ne!(facing.opposite(), facing);
            assert_eq!(facing.opposite().opposite(), facing);
        }
    }

    #[test]
    fn test_facing_parse() {
        assert_eq!("front".parse::<Facing>(), Ok(Facing::Front));
        assert_eq!(" Rear ".parse::<Facing>(), Ok(Facing::Back));
        assert!("sideways".parse::<Facing>().is_err());
    }

    #[test]
    fn test_facing_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Facing::Front).unwrap(), "\"front\"");
    }

    #[test]
    fn test_photo_from_image_records_dimensions() {
        let photo = Photo::from_image("virtual://back/a.png", Facing::Back, image::RgbaImage::new(8, 6));
        assert_eq!((photo.width, photo.height), (8, 6));
        assert!(photo.pixels.is_some());

        let summary = photo.summary();
        assert_eq!(summary.uri, "virtual://back/a.png");
        assert_eq!(summary.facing, Facing::Back);
    }
}
