use anyhow::Result;

use crate::detect::result::Detection;

/// Detector backend trait.
///
/// Implementations take a tightly packed RGB8 pixel buffer and return
/// detections in pixel coordinates of that image. Resizing to the model's
/// working resolution is the backend's concern; callers always deal in the
/// original image geometry.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on one image.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
