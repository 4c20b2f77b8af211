use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detect::result::Detection;

const VEHICLE_COLOR: Rgb<u8> = Rgb([0, 220, 60]);
const OTHER_COLOR: Rgb<u8> = Rgb([150, 150, 150]);
const BOX_THICKNESS: i32 = 2;

/// Draw every detection onto the image, vehicles bright, everything else
/// dimmed. Counting policy lives elsewhere; this draws all surviving boxes.
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
    for detection in detections {
        let color = if detection.is_vehicle() {
            VEHICLE_COLOR
        } else {
            OTHER_COLOR
        };
        draw_box(image, detection, color);
    }
}

fn draw_box(image: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
    let x = detection.x1.round() as i32;
    let y = detection.y1.round() as i32;
    let w = detection.width().round().max(1.0) as u32;
    let h = detection.height().round().max(1.0) as u32;

    // Nested hollow rects to get a visible line weight.
    for inset in 0..BOX_THICKNESS {
        let rw = w.saturating_sub(2 * inset as u32);
        let rh = h.saturating_sub(2 * inset as u32);
        if rw == 0 || rh == 0 {
            break;
        }
        let rect = Rect::at(x + inset, y + inset).of_size(rw, rh);
        draw_hollow_rect_mut(image, rect, color);
    }
}
