use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use log::{debug, warn};
use logging_timer::time;
use serde::{Deserialize, Serialize};

use crate::debug::{draw_sheet_corners_debug_image_mut, ImageDebugWriter};
use crate::geometry::{contour_area, reorder_quad};
use crate::image_utils::{adaptive_threshold_inv, normalize_channels};

/// Calibration of the sheet-boundary detection and warp stages.
///
/// The defaults are tuned for hand-held photographs of a letter-ish answer
/// sheet against a contrasting background.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectifyOptions {
    /// Width of the canonical top-down output image.
    pub output_width: u32,
    /// Height of the canonical top-down output image.
    pub output_height: u32,
    /// Gaussian smoothing strength applied before thresholding; 1.1 is the
    /// sigma a 5×5 kernel implies.
    pub blur_sigma: f32,
    /// Side length of the local-mean window used by adaptive thresholding.
    pub threshold_window: u32,
    /// Bias subtracted from the local mean before comparison.
    pub threshold_bias: i32,
    /// Lower hysteresis threshold for edge extraction.
    pub canny_low: f32,
    /// Upper hysteresis threshold for edge extraction.
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of the contour
    /// perimeter.
    pub approx_epsilon_ratio: f64,
}

impl Default for RectifyOptions {
    fn default() -> Self {
        Self {
            output_width: 700,
            output_height: 800,
            blur_sigma: 1.1,
            threshold_window: 11,
            threshold_bias: 2,
            canny_low: 50.0,
            canny_high: 150.0,
            approx_epsilon_ratio: 0.02,
        }
    }
}

/// Outcome of a rectification attempt.
///
/// `NotFound` carries a channel-normalized copy of the input so the caller
/// can continue with the unrectified sheet; it never requires comparing
/// images to discover that detection missed.
#[derive(Debug, Clone)]
pub enum Rectification {
    /// The sheet boundary was found and warped to the canonical size.
    Rectified(RgbImage),
    /// No usable sheet boundary; the channel-normalized input is returned.
    NotFound(RgbImage),
}

impl Rectification {
    pub fn image(&self) -> &RgbImage {
        match self {
            Self::Rectified(image) | Self::NotFound(image) => image,
        }
    }

    pub fn into_image(self) -> RgbImage {
        match self {
            Self::Rectified(image) | Self::NotFound(image) => image,
        }
    }

    pub fn is_rectified(&self) -> bool {
        matches!(self, Self::Rectified(_))
    }
}

/// Finds the answer sheet in a photograph and produces a top-down view of it
/// at the canonical output size.
///
/// The photograph is channel-normalized, grayscaled, smoothed, adaptively
/// thresholded and edge-extracted; the largest external contour is then
/// approximated to a polygon at 2% of its perimeter. When that polygon has
/// exactly four vertices they are reordered into canonical corner order and
/// the enclosed region is perspective-warped to the output rectangle. Every
/// other outcome is a detection miss, not an error.
#[time]
pub fn rectify(
    image: &DynamicImage,
    options: &RectifyOptions,
    debug_writer: &ImageDebugWriter,
) -> Rectification {
    if image.width() == 0 || image.height() == 0 {
        warn!("input image is empty; skipping rectification");
        return Rectification::NotFound(normalize_channels(image));
    }

    let normalized = normalize_channels(image);

    let gray = image::imageops::grayscale(&normalized);
    let blurred = gaussian_blur_f32(&gray, options.blur_sigma);
    let thresholded =
        adaptive_threshold_inv(&blurred, options.threshold_window, options.threshold_bias);
    debug_writer.write_gray("threshold", &thresholded);

    let edges = canny(&thresholded, options.canny_low, options.canny_high);
    debug_writer.write_gray("edges", &edges);

    let polygon = match approximate_sheet_boundary(&edges, options) {
        Some(polygon) => polygon,
        None => {
            debug!("no contours in edge image; returning the input unrectified");
            return Rectification::NotFound(normalized);
        }
    };

    let polygon: Vec<Point<f32>> = polygon
        .iter()
        .map(|p| Point::new(p.x as f32, p.y as f32))
        .collect();
    let corners = match reorder_quad(&polygon) {
        Some(corners) => corners,
        None => {
            debug!(
                "sheet boundary approximates to {} vertices, not 4; returning the input unrectified",
                polygon.len()
            );
            return Rectification::NotFound(normalized);
        }
    };

    if debug_writer.is_enabled() {
        let mut canvas = normalized.clone();
        draw_sheet_corners_debug_image_mut(&mut canvas, &corners);
        debug_writer.write_rgb("boundary", &canvas);
    }

    let (width, height) = (options.output_width, options.output_height);
    let src = [
        (corners[0].x, corners[0].y),
        (corners[1].x, corners[1].y),
        (corners[2].x, corners[2].y),
        (corners[3].x, corners[3].y),
    ];
    let dst = [
        (0.0, 0.0),
        ((width - 1) as f32, 0.0),
        ((width - 1) as f32, (height - 1) as f32),
        (0.0, (height - 1) as f32),
    ];
    let projection = match Projection::from_control_points(src, dst) {
        Some(projection) => projection,
        None => {
            debug!("sheet corners admit no projective transform; returning the input unrectified");
            return Rectification::NotFound(normalized);
        }
    };

    let mut warped = RgbImage::new(width, height);
    warp_into(
        &normalized,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut warped,
    );
    debug_writer.write_rgb("rectified", &warped);

    Rectification::Rectified(warped)
}

/// Approximates the largest external contour of the edge image to a polygon.
/// Returns `None` when the edge image has no contours at all.
fn approximate_sheet_boundary(edges: &GrayImage, options: &RectifyOptions) -> Option<Vec<Point<i32>>> {
    let contours: Vec<Contour<i32>> = find_contours(edges);

    let mut largest: Option<(f64, &Contour<i32>)> = None;
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        let area = contour_area(&contour.points);
        if largest.map_or(true, |(largest_area, _)| area > largest_area) {
            largest = Some((area, contour));
        }
    }
    let (_, largest) = largest?;

    let perimeter = arc_length(&largest.points, true);
    Some(approximate_polygon_dp(
        &largest.points,
        options.approx_epsilon_ratio * perimeter,
        true,
    ))
}
