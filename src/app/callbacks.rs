// SPDX-License-Identifier: GPL-3.0-only

//! Caller-supplied callbacks of the capture screen

use crate::backends::camera::Photo;
use crate::errors::CaptureError;

pub type PhotoCallback = Box<dyn FnMut(&Photo) + Send>;
pub type ErrorCallback = Box<dyn FnMut(&CaptureError) + Send>;
pub type CompleteCallback = Box<dyn FnMut() + Send>;

/// Outputs of the capture screen
///
/// The two photo callbacks are named after the default layout (rear camera
/// first). They fire for the first and second photo of the sequence whatever
/// the physical facing was.
pub struct CaptureCallbacks {
    on_back_camera_picture_saved: PhotoCallback,
    on_front_camera_picture_saved: PhotoCallback,
    on_capture_error: Option<ErrorCallback>,
    on_sequence_complete: Option<CompleteCallback>,
}

impl CaptureCallbacks {
    pub fn new(
        on_back_camera_picture_saved: impl FnMut(&Photo) + Send + 'static,
        on_front_camera_picture_saved: impl FnMut(&Photo) + Send + 'static,
    ) -> Self {
        Self {
            on_back_camera_picture_saved: Box::new(on_back_camera_picture_saved),
            on_front_camera_picture_saved: Box::new(on_front_camera_picture_saved),
            on_capture_error: None,
            on_sequence_complete: None,
        }
    }

    /// Callbacks that ignore everything
    pub fn noop() -> Self {
        Self::new(|_| {}, |_| {})
    }

    /// Receive hardware capture failures instead of having them logged
    pub fn with_capture_error(mut self, callback: impl FnMut(&CaptureError) + Send + 'static) -> Self {
        self.on_capture_error = Some(Box::new(callback));
        self
    }

    /// Be told when the second photo has been delivered
    pub fn with_sequence_complete(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_sequence_complete = Some(Box::new(callback));
        self
    }

    pub(crate) fn primary_saved(&mut self, photo: &Photo) {
        (self.on_back_camera_picture_saved)(photo);
    }

    pub(crate) fn secondary_saved(&mut self, photo: &Photo) {
        (self.on_front_camera_picture_saved)(photo);
    }

    /// Returns false when no error callback is installed
    pub(crate) fn capture_failed(&mut self, error: &CaptureError) -> bool {
        match self.on_capture_error.as_mut() {
            Some(callback) => {
                callback(error);
                true
            }
            None => false,
        }
    }

    pub(crate) fn sequence_complete(&mut self) {
        if let Some(callback) = self.on_sequence_complete.as_mut() {
            callback();
        }
    }
}

impl std::fmt::Debug for CaptureCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureCallbacks")
            .field("on_capture_error", &self.on_capture_error.is_some())
            .field("on_sequence_complete", &self.on_sequence_complete.is_some())
            .finish_non_exhaustive()
    }
}
