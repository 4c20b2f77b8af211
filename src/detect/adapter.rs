//! Decode, detect, count, annotate.
//!
//! The adapter owns the boundary between image bytes and the detection
//! backend, and the process-wide cache for the loaded model. Everything in
//! and out of here is RGB; no channel-order correction is left to callers.

use image::RgbImage;

use crate::detect::annotate::draw_detections;
use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;
use crate::error::Error;

#[cfg(feature = "backend-tract")]
use std::sync::{Mutex, OnceLock};

#[cfg(feature = "backend-tract")]
use crate::config::ParkwatchConfig;
#[cfg(feature = "backend-tract")]
use crate::detect::backends::TractBackend;

/// Result of one detection pass.
pub struct DetectionOutput {
    /// Source image with all surviving detections drawn, RGB.
    pub annotated: RgbImage,
    /// Count of detections on the vehicle allow-list.
    pub vehicle_count: u32,
    /// All surviving detections, vehicles and not.
    pub detections: Vec<Detection>,
}

/// Decode PNG/JPEG bytes into an RGB raster.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, Error> {
    let image = image::load_from_memory(bytes).map_err(Error::Decode)?;
    Ok(image.to_rgb8())
}

/// Run the backend over an already-decoded image, count vehicle-class
/// detections, and render the annotated copy.
pub fn detect_vehicles(
    backend: &mut dyn DetectorBackend,
    image: &RgbImage,
) -> Result<DetectionOutput, Error> {
    let (width, height) = image.dimensions();
    let detections = backend
        .detect(image.as_raw(), width, height)
        .map_err(Error::Inference)?;

    let vehicle_count = detections.iter().filter(|d| d.is_vehicle()).count() as u32;

    let mut annotated = image.clone();
    draw_detections(&mut annotated, &detections);

    Ok(DetectionOutput {
        annotated,
        vehicle_count,
        detections,
    })
}

/// Process-wide model handle.
///
/// Loading the weights is the expensive one-time cost of this tool; the
/// loaded backend is cached for the lifetime of the process and reused by
/// every subsequent analysis. A load failure is fatal to the calling
/// operation and is not retried here.
#[cfg(feature = "backend-tract")]
static SHARED_BACKEND: OnceLock<Mutex<TractBackend>> = OnceLock::new();

#[cfg(feature = "backend-tract")]
pub fn shared_backend(cfg: &ParkwatchConfig) -> Result<&'static Mutex<TractBackend>, Error> {
    if let Some(backend) = SHARED_BACKEND.get() {
        return Ok(backend);
    }
    let backend = TractBackend::new(&cfg.model_path, cfg.detector).map_err(Error::ModelLoad)?;
    Ok(SHARED_BACKEND.get_or_init(|| Mutex::new(backend)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::backends::StubBackend;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode png");
        buf.into_inner()
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn decode_accepts_png() {
        let image = decode_image(&png_bytes(8, 6)).expect("decode");
        assert_eq!(image.dimensions(), (8, 6));
    }

    #[test]
    fn counts_only_vehicle_classes() {
        let vehicle = Detection {
            x1: 1.0,
            y1: 1.0,
            x2: 10.0,
            y2: 10.0,
            confidence: 0.8,
            class_id: 2,
        };
        let person = Detection {
            x1: 20.0,
            y1: 20.0,
            x2: 28.0,
            y2: 30.0,
            confidence: 0.9,
            class_id: 0,
        };
        let mut backend = StubBackend::with_detections(vec![vehicle, person]);
        let image = RgbImage::new(64, 64);
        let output = detect_vehicles(&mut backend, &image).expect("detect");
        assert_eq!(output.vehicle_count, 1);
        assert_eq!(output.detections.len(), 2);
        assert_eq!(output.annotated.dimensions(), (64, 64));
    }
}
