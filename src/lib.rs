//! Grades photographed multiple-choice answer sheets.
//!
//! A teacher (answer-key) sheet and a student sheet each pass through the
//! same pipeline: the photograph is rectified to a canonical top-down view
//! ([`rectify`]) and the filled answer bubbles in it are located
//! ([`detect_bubbles`]). The two resulting coordinate sets are matched under
//! a distance threshold ([`grade`]) and the classification is rendered onto
//! the student's rectified sheet ([`annotate`]). [`grade_sheets`] runs the
//! whole flow for a pair of photographs.
//!
//! Decoding photographs into raster images and persisting results are the
//! caller's concern; every operation here works on in-memory images.

pub mod annotate;
pub mod debug;
pub mod detect;
pub mod geometry;
pub mod grade;
pub mod image_utils;
pub mod interpret;
pub mod rectify;

pub use annotate::{annotate, outline_bubbles, AnnotateOptions};
pub use detect::{detect_bubbles, DetectOptions};
pub use grade::{grade, GradeResult, GradeSummary};
pub use interpret::{grade_sheets, GradedSheets, Options};
pub use rectify::{rectify, Rectification, RectifyOptions};
