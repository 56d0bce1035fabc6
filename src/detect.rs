use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;
use log::debug;
use logging_timer::time;
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

use crate::debug::ImageDebugWriter;
use crate::geometry::{contour_area, min_enclosing_circle};
use crate::image_utils::WHITE;

/// Calibration of the filled-bubble segmentation.
///
/// The defaults select a blue marking pen on the canonical 700×800 rectified
/// sheet; they are empirical, not derived from image statistics. Hue is in
/// degrees on the 0–360 color wheel, saturation and value are fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectOptions {
    pub hue_min_deg: f32,
    pub hue_max_deg: f32,
    pub saturation_min: f32,
    pub value_min: f32,
    /// Contours with enclosed area at or below this are noise speckles.
    pub area_min: f64,
    /// Contours with enclosed area at or above this are not bubbles.
    pub area_max: f64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            hue_min_deg: 180.0,
            hue_max_deg: 260.0,
            saturation_min: 50.0 / 255.0,
            value_min: 50.0 / 255.0,
            area_min: 200.0,
            area_max: 5000.0,
        }
    }
}

/// Finds the centers of filled answer bubbles in a (typically rectified)
/// color image.
///
/// Pixels inside the configured hue/saturation/value band form a binary
/// mask; each external contour of the mask whose enclosed area lies strictly
/// inside the configured band contributes the center of its minimal
/// enclosing circle. Zero detected bubbles is a valid outcome, not an error.
#[time]
pub fn detect_bubbles(
    image: &RgbImage,
    options: &DetectOptions,
    debug_writer: &ImageDebugWriter,
) -> Vec<Point<f32>> {
    let mask = pen_color_mask(image, options);
    debug_writer.write_gray("bubble_mask", &mask);

    let contours: Vec<Contour<i32>> = find_contours(&mask);
    let mut centers = Vec::new();
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        let area = contour_area(&contour.points);
        if area <= options.area_min || area >= options.area_max {
            continue;
        }

        let points: Vec<Point<f32>> = contour
            .points
            .iter()
            .map(|p| Point::new(p.x as f32, p.y as f32))
            .collect();
        if let Some(circle) = min_enclosing_circle(&points) {
            centers.push(circle.center);
        }
    }

    debug!("detected {} filled bubbles", centers.len());
    centers
}

/// Binary mask of the pixels within the configured pen-color band.
fn pen_color_mask(image: &RgbImage, options: &DetectOptions) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let hsv = Hsv::from_color(Srgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        ));
        let hue = hsv.hue.into_positive_degrees();
        if hue >= options.hue_min_deg
            && hue <= options.hue_max_deg
            && hsv.saturation >= options.saturation_min
            && hsv.value >= options.value_min
        {
            mask.put_pixel(x, y, WHITE);
        }
    }
    mask
}
