use image::{DynamicImage, RgbImage};
use imageproc::point::Point;
use log::warn;
use logging_timer::time;

use crate::annotate::{annotate, AnnotateOptions};
use crate::debug::ImageDebugWriter;
use crate::detect::{detect_bubbles, DetectOptions};
use crate::grade::{grade, GradeResult};
use crate::rectify::{rectify, RectifyOptions};

/// Match distance used for the numeric score tally.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 50.0;
/// Tighter match distance used to classify marks for the visual overlay.
pub const DEFAULT_OVERLAY_THRESHOLD: f32 = 25.0;

#[derive(Debug, Clone)]
pub struct Options {
    pub score_threshold: f32,
    pub overlay_threshold: f32,
    pub rectify: RectifyOptions,
    pub detect: DetectOptions,
    pub annotate: AnnotateOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            overlay_threshold: DEFAULT_OVERLAY_THRESHOLD,
            rectify: RectifyOptions::default(),
            detect: DetectOptions::default(),
            annotate: AnnotateOptions::default(),
        }
    }
}

/// Everything produced by grading one student sheet against one key sheet.
#[derive(Debug, Clone)]
pub struct GradedSheets {
    pub teacher_sheet: RgbImage,
    pub student_sheet: RgbImage,
    pub teacher_bubbles: Vec<Point<f32>>,
    pub student_bubbles: Vec<Point<f32>>,
    /// Tally at the score threshold; its counts feed the score text.
    pub score: GradeResult,
    /// Classification at the overlay threshold; its partition is drawn.
    pub overlay: GradeResult,
    pub annotated: RgbImage,
}

/// Grades a photographed student sheet against a photographed answer-key
/// sheet.
///
/// Both sheets are rectified and their bubbles detected independently, so
/// the two run concurrently. The same coordinate sets are then graded twice:
/// once at the looser score threshold for the numeric tally and once at the
/// tighter overlay threshold for the correct/incorrect rendering on the
/// student sheet.
#[time]
pub fn grade_sheets(
    teacher_image: &DynamicImage,
    student_image: &DynamicImage,
    options: &Options,
    teacher_debug: &ImageDebugWriter,
    student_debug: &ImageDebugWriter,
) -> GradedSheets {
    let (teacher_rectification, student_rectification) = rayon::join(
        || rectify(teacher_image, &options.rectify, teacher_debug),
        || rectify(student_image, &options.rectify, student_debug),
    );

    if !teacher_rectification.is_rectified() {
        warn!("teacher sheet boundary not found; grading the unrectified image");
    }
    if !student_rectification.is_rectified() {
        warn!("student sheet boundary not found; grading the unrectified image");
    }

    let teacher_sheet = teacher_rectification.into_image();
    let student_sheet = student_rectification.into_image();

    let (teacher_bubbles, student_bubbles) = rayon::join(
        || detect_bubbles(&teacher_sheet, &options.detect, teacher_debug),
        || detect_bubbles(&student_sheet, &options.detect, student_debug),
    );

    let score = grade(&teacher_bubbles, &student_bubbles, options.score_threshold);
    let overlay = grade(
        &teacher_bubbles,
        &student_bubbles,
        options.overlay_threshold,
    );

    let annotated = annotate(
        &student_sheet,
        &teacher_bubbles,
        &overlay.matched,
        &overlay.unmatched,
        &score.score_text(),
        &options.annotate,
    );

    GradedSheets {
        teacher_sheet,
        student_sheet,
        teacher_bubbles,
        student_bubbles,
        score,
        overlay,
        annotated,
    }
}
