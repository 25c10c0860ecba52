// SPDX-License-Identifier: GPL-3.0-only

//! Simulated camera hardware
//!
//! Streams synthetic frames for a front and a back camera. Warm-up and capture
//! latency run on the tokio clock, so tests with a paused clock see exact
//! timings. Failures can be scripted per facing.

use super::types::*;
use super::{CameraBackend, CameraHandle};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Timing and resolution of the simulated cameras
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualCameraSettings {
    /// Time from bind until the stream reports ready
    pub warmup: Duration,
    /// Time a capture takes once the stream is ready
    pub capture_latency: Duration,
    /// Captured photo size
    pub photo_size: (u32, u32),
    /// Preview frame size
    pub preview_size: (u32, u32),
}

impl VirtualCameraSettings {
    /// No warm-up and no capture latency
    pub fn instant() -> Self {
        Self {
            warmup: Duration::ZERO,
            capture_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for VirtualCameraSettings {
    fn default() -> Self {
        Self {
            warmup: Duration::from_millis(crate::constants::VIRTUAL_WARMUP_MS),
            capture_latency: Duration::from_millis(crate::constants::VIRTUAL_CAPTURE_LATENCY_MS),
            photo_size: (320, 240),
            preview_size: (160, 120),
        }
    }
}

/// State shared between the backend and every handle it gave out
#[derive(Default)]
struct Shared {
    scripted_failures: Mutex<HashMap<Facing, VecDeque<BackendError>>>,
    captures: Mutex<HashMap<Facing, u32>>,
    binds: AtomicU32,
}

impl Shared {
    fn failures(&self) -> MutexGuard<'_, HashMap<Facing, VecDeque<BackendError>>> {
        self.scripted_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn captures(&self) -> MutexGuard<'_, HashMap<Facing, u32>> {
        self.captures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Simulated dual-camera device
#[derive(Clone)]
pub struct VirtualCameraBackend {
    settings: VirtualCameraSettings,
    facings: Vec<Facing>,
    shared: Arc<Shared>,
}

impl VirtualCameraBackend {
    /// Create a backend with both a front and a back camera
    pub fn new(settings: VirtualCameraSettings) -> Self {
        Self::with_facings(settings, &Facing::ALL)
    }

    /// Create a backend that only has the given cameras
    pub fn with_facings(settings: VirtualCameraSettings, facings: &[Facing]) -> Self {
        Self {
            settings,
            facings: facings.to_vec(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Make the next capture on `facing` fail with `error`
    pub fn fail_next_capture(&self, facing: Facing, error: BackendError) {
        self.shared
            .failures()
            .entry(facing)
            .or_default()
            .push_back(error);
    }

    /// Number of successful captures taken on `facing`
    pub fn captures_taken(&self, facing: Facing) -> u32 {
        self.shared.captures().get(&facing).copied().unwrap_or(0)
    }

    /// Number of times a stream was bound
    pub fn binds(&self) -> u32 {
        self.shared.binds.load(Ordering::SeqCst)
    }
}

impl CameraBackend for VirtualCameraBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.facings
            .iter()
            .map(|facing| CameraDevice {
                name: format!("Virtual {} camera", facing),
                facing: *facing,
                path: format!("virtual://{}", facing),
            })
            .collect()
    }

    fn bind(&self, facing: Facing) -> BackendResult<Arc<dyn CameraHandle>> {
        if !self.facings.contains(&facing) {
            return Err(BackendError::DeviceNotFound(format!(
                "no {} camera on this device",
                facing
            )));
        }

        self.shared.binds.fetch_add(1, Ordering::SeqCst);
        debug!(%facing, warmup = ?self.settings.warmup, "Virtual camera stream starting");

        Ok(Arc::new(VirtualCameraHandle {
            facing,
            settings: self.settings,
            ready_at: Instant::now() + self.settings.warmup,
            closed: AtomicBool::new(false),
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// One bound simulated stream
struct VirtualCameraHandle {
    facing: Facing,
    settings: VirtualCameraSettings,
    ready_at: Instant,
    closed: AtomicBool,
    shared: Arc<Shared>,
}

impl VirtualCameraHandle {
    fn ensure_open(&self) -> BackendResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(BackendError::Disconnected)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CameraHandle for VirtualCameraHandle {
    fn facing(&self) -> Facing {
        self.facing
    }

    async fn wait_ready(&self) -> BackendResult<()> {
        tokio::time::sleep_until(self.ready_at).await;
        self.ensure_open()
    }

    async fn capture_photo(&self) -> BackendResult<Photo> {
        self.ensure_open()?;
        if Instant::now() < self.ready_at {
            return Err(BackendError::NotReady);
        }
        tokio::time::sleep(self.settings.capture_latency).await;
        self.ensure_open()?;

        let scripted = self
            .shared
            .failures()
            .get_mut(&self.facing)
            .and_then(|queue| queue.pop_front());
        if let Some(error) = scripted {
            warn!(facing = %self.facing, %error, "Virtual capture failing as scripted");
            return Err(error);
        }

        let shot = {
            let mut captures = self.shared.captures();
            let count = captures.entry(self.facing).or_insert(0);
            *count += 1;
            *count
        };

        let (width, height) = self.settings.photo_size;
        let frame = render_frame(self.facing, width, height, shot);
        let mut photo = Photo::from_image(String::new(), self.facing, frame);
        photo.uri = format!("virtual://{}/{}.png", self.facing, photo.id);

        info!(uri = %photo.uri, "Virtual photo captured");
        Ok(photo)
    }

    fn preview(&self) -> Option<Arc<RgbaImage>> {
        if self.closed.load(Ordering::SeqCst) || Instant::now() < self.ready_at {
            return None;
        }
        let (width, height) = self.settings.preview_size;
        let phase = (self.ready_at.elapsed().as_millis() / 40) as u32;
        Some(Arc::new(render_frame(self.facing, width, height, phase)))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Diagonal gradient tinted per facing, with a moving vertical bar at `phase`
fn render_frame(facing: Facing, width: u32, height: u32, phase: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let bar = phase.wrapping_mul(7) % width;

    RgbaImage::from_fn(width, height, |x, y| {
        let shade = ((x + y) * 255 / (width + height)) as u8;
        if x.abs_diff(bar) < 2 {
            return Rgba([255, 255, 255, 255]);
        }
        match facing {
            Facing::Back => Rgba([shade / 3, shade / 2, shade, 255]),
            Facing::Front => Rgba([shade, shade / 2, shade / 3, 255]),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_warmup() {
        let backend = VirtualCameraBackend::new(VirtualCameraSettings {
            warmup: Duration::from_millis(300),
            ..VirtualCameraSettings::instant()
        });
        let handle = backend.bind(Facing::Back).unwrap();

        let start = Instant::now();
        handle.wait_ready().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_capture_produces_facing_uri() {
        let backend = VirtualCameraBackend::new(VirtualCameraSettings::instant());
        let handle = backend.bind(Facing::Front).unwrap();

        let photo = handle.capture_photo().await.unwrap();
        assert!(photo.uri.starts_with("virtual://front/"));
        assert_eq!(photo.facing, Facing::Front);
        assert_eq!(backend.captures_taken(Facing::Front), 1);
        assert_eq!(backend.captures_taken(Facing::Back), 0);
    }

    #[tokio::test]
    async fn test_scripted_failure_applies_once() {
        let backend = VirtualCameraBackend::new(VirtualCameraSettings::instant());
        backend.fail_next_capture(Facing::Back, BackendError::CaptureFailed("blurry".into()));
        let handle = backend.bind(Facing::Back).unwrap();

        assert!(handle.capture_photo().await.is_err());
        assert!(handle.capture_photo().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_before_ready_is_rejected() {
        let backend = VirtualCameraBackend::new(VirtualCameraSettings {
            warmup: Duration::from_millis(300),
            ..VirtualCameraSettings::instant()
        });
        let handle = backend.bind(Facing::Back).unwrap();

        assert_eq!(handle.capture_photo().await, Err(BackendError::NotReady));
        handle.wait_ready().await.unwrap();
        assert!(handle.capture_photo().await.is_ok());
    }

    #[test]
    fn test_missing_facing_cannot_bind() {
        let backend =
            VirtualCameraBackend::with_facings(VirtualCameraSettings::instant(), &[Facing::Back]);
        assert!(matches!(
            backend.bind(Facing::Front),
            Err(BackendError::DeviceNotFound(_))
        ));
        assert_eq!(backend.available_facings(), vec![Facing::Back]);
    }

    #[test]
    fn test_frames_are_tinted_per_facing() {
        let back = render_frame(Facing::Back, 16, 16, 100);
        let front = render_frame(Facing::Front, 16, 16, 100);
        let Rgba([br, _, bb, _]) = *back.get_pixel(15, 15);
        let Rgba([fr, _, fb, _]) = *front.get_pixel(15, 15);
        assert!(bb > br);
        assert!(fr > fb);
    }
}
