#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tract_onnx::prelude::*;

use crate::config::DetectorSettings;
use crate::detect::backend::DetectorBackend;
use crate::detect::result::{suppress_overlaps, Detection};

/// Letterbox fill value used by YOLO-family models.
const PAD_GRAY: u8 = 114;

/// Tract-based backend running a YOLOv8 ONNX model.
///
/// The input image is letterboxed to a square working resolution (long side
/// scaled to `imgsz`, gray padding), inference runs once, and the raw
/// proposals are confidence-filtered and suppressed before boxes are mapped
/// back to original image coordinates.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    settings: DetectorSettings,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, settings: DetectorSettings) -> Result<Self> {
        let model_path = model_path.as_ref();
        let size = settings.imgsz as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self { model, settings })
    }

    fn letterbox(&self, image: &RgbImage) -> (RgbImage, f32, f32, f32) {
        let size = self.settings.imgsz;
        let (w, h) = image.dimensions();
        let scale = size as f32 / w.max(h) as f32;
        let new_w = ((w as f32 * scale).round() as u32).clamp(1, size);
        let new_h = ((h as f32 * scale).round() as u32).clamp(1, size);
        let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);

        let pad_x = (size - new_w) as f32 / 2.0;
        let pad_y = (size - new_h) as f32 / 2.0;
        let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_GRAY, PAD_GRAY, PAD_GRAY]));
        imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

        (canvas, scale, pad_x, pad_y)
    }

    fn build_input(&self, canvas: &RgbImage) -> Tensor {
        let size = self.settings.imgsz as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, size, size),
            |(_, channel, y, x)| canvas.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        );
        input.into_tensor()
    }

    /// Decode YOLOv8 output: `[1, 4 + classes, anchors]`, attribute rows
    /// stored column-major over the anchors.
    fn decode(
        &self,
        outputs: TVec<TValue>,
        scale: f32,
        pad_x: f32,
        pad_y: f32,
        orig_w: u32,
        orig_h: u32,
    ) -> Result<Vec<Detection>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let view = view
            .into_dimensionality::<tract_ndarray::Ix3>()
            .context("unexpected model output rank")?;

        let attrs = view.shape()[1];
        let anchors = view.shape()[2];
        let classes = attrs
            .checked_sub(4)
            .ok_or_else(|| anyhow!("model output has fewer than 4 attributes"))?;

        let mut candidates = Vec::new();
        for i in 0..anchors {
            let mut best_class = 0usize;
            let mut best_score = 0f32;
            for c in 0..classes {
                let score = view[[0, 4 + c, i]];
                if score > best_score {
                    best_score = score;
                    best_class = c;
                }
            }
            if best_score < self.settings.confidence {
                continue;
            }

            let cx = view[[0, 0, i]];
            let cy = view[[0, 1, i]];
            let w = view[[0, 2, i]];
            let h = view[[0, 3, i]];

            // cxcywh in letterbox space back to xyxy in original pixels.
            let x1 = ((cx - w / 2.0 - pad_x) / scale).clamp(0.0, orig_w as f32);
            let y1 = ((cy - h / 2.0 - pad_y) / scale).clamp(0.0, orig_h as f32);
            let x2 = ((cx + w / 2.0 - pad_x) / scale).clamp(0.0, orig_w as f32);
            let y2 = ((cy + h / 2.0 - pad_y) / scale).clamp(0.0, orig_h as f32);
            if x2 <= x1 || y2 <= y1 {
                continue;
            }

            candidates.push(Detection {
                x1,
                y1,
                x2,
                y2,
                confidence: best_score,
                class_id: best_class,
            });
        }

        Ok(suppress_overlaps(candidates, self.settings.iou))
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }
        let image = RgbImage::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", width, height))?;

        let (canvas, scale, pad_x, pad_y) = self.letterbox(&image);
        let input = self.build_input(&canvas);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;

        self.decode(outputs, scale, pad_x, pad_y, width, height)
    }
}
