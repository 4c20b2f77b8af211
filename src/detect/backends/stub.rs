use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Stub backend for testing. Replays a canned set of detections, clamped to
/// the frame it is asked about.
pub struct StubBackend {
    detections: Vec<Detection>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            detections: Vec::new(),
        }
    }

    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        Ok(self
            .detections
            .iter()
            .map(|d| Detection {
                x1: d.x1.clamp(0.0, width as f32),
                y1: d.y1.clamp(0.0, height as f32),
                x2: d.x2.clamp(0.0, width as f32),
                y2: d.y2.clamp(0.0, height as f32),
                ..*d
            })
            .collect())
    }
}
