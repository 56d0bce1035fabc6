use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::point::Point;
use log::{debug, warn};

use crate::image_utils::GREEN;

/// Creates a path for a debug image.
fn debug_image_path(base: &Path, label: &str) -> PathBuf {
    let mut result = PathBuf::from(base);
    result.set_file_name(format!(
        "{}_debug_{}.png",
        base.file_stem().unwrap_or_default().to_str().unwrap_or_default(),
        label
    ));
    result
}

/// Writes intermediate pipeline images next to the input file for visual
/// inspection. Disabled by default; a disabled writer ignores every write.
pub struct ImageDebugWriter {
    input_path: Option<PathBuf>,
}

impl ImageDebugWriter {
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path: Some(input_path),
        }
    }

    pub fn disabled() -> Self {
        Self { input_path: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.input_path.is_some()
    }

    pub fn write_gray(&self, label: &str, image: &GrayImage) {
        if let Some(input_path) = &self.input_path {
            write_image_file(&debug_image_path(input_path, label), |path| image.save(path));
        }
    }

    pub fn write_rgb(&self, label: &str, image: &RgbImage) {
        if let Some(input_path) = &self.input_path {
            write_image_file(&debug_image_path(input_path, label), |path| image.save(path));
        }
    }
}

fn write_image_file<F>(path: &Path, save: F)
where
    F: FnOnce(&Path) -> image::ImageResult<()>,
{
    match save(path) {
        Ok(()) => debug!("wrote debug image: {}", path.display()),
        Err(e) => warn!("failed to write debug image {}: {}", path.display(), e),
    }
}

/// Draws the detected sheet boundary onto a canvas.
pub fn draw_sheet_corners_debug_image_mut(canvas: &mut RgbImage, corners: &[Point<f32>; 4]) {
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        draw_line_segment_mut(canvas, (a.x, a.y), (b.x, b.y), GREEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn debug_image_path_is_a_labeled_sibling() {
        let path = debug_image_path(Path::new("/tmp/sheets/student.jpeg"), "edges");
        assert_eq!(path, PathBuf::from("/tmp/sheets/student_debug_edges.png"));
    }

    #[test]
    fn disabled_writer_writes_nothing() {
        let writer = ImageDebugWriter::disabled();
        assert!(!writer.is_enabled());
        // No path to write to; must be a no-op rather than a panic.
        writer.write_rgb("boundary", &RgbImage::new(4, 4));
    }

    #[test]
    fn enabled_writer_saves_labeled_images() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("sheet.png");
        let writer = ImageDebugWriter::new(input_path.clone());
        assert!(writer.is_enabled());

        writer.write_rgb("boundary", &RgbImage::from_pixel(8, 8, Rgb([1u8, 2, 3])));
        writer.write_gray("mask", &GrayImage::new(8, 8));

        assert!(dir.path().join("sheet_debug_boundary.png").exists());
        assert!(dir.path().join("sheet_debug_mask.png").exists());
    }

    #[test]
    fn draw_sheet_corners_traces_the_quad() {
        let mut canvas = RgbImage::new(20, 20);
        let corners = [
            Point::new(2.0, 2.0),
            Point::new(17.0, 2.0),
            Point::new(17.0, 17.0),
            Point::new(2.0, 17.0),
        ];
        draw_sheet_corners_debug_image_mut(&mut canvas, &corners);
        assert_eq!(canvas.get_pixel(10, 2), &GREEN);
        assert_eq!(canvas.get_pixel(2, 10), &GREEN);
    }
}
