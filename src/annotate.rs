use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use log::debug;

use crate::image_utils::{GREEN, RED};

/// Rendering configuration for the graded-sheet overlay.
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Radius of every drawn mark circle.
    pub mark_radius: i32,
    /// Outline color for answer-key reference circles.
    pub key_color: Rgb<u8>,
    /// Fill color for student marks classified correct.
    pub correct_color: Rgb<u8>,
    /// Fill color for student marks classified incorrect.
    pub incorrect_color: Rgb<u8>,
    pub score_color: Rgb<u8>,
    /// Score text position as an inset from the canvas's top-right corner.
    pub score_inset: (i32, i32),
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            mark_radius: 20,
            key_color: GREEN,
            correct_color: GREEN,
            incorrect_color: RED,
            score_color: RED,
            score_inset: (400, 50),
        }
    }
}

/// Renders the grading overlay onto a copy of the rectified student sheet.
///
/// Key marks become hollow circles, matched student marks filled circles,
/// unmatched student marks filled circles in the contrasting color, and the
/// score string is drawn near the top-right corner. The input image is never
/// mutated; coordinates outside the canvas are clipped by the drawing
/// primitives.
pub fn annotate(
    image: &RgbImage,
    teacher: &[Point<f32>],
    matched: &[Point<f32>],
    unmatched: &[Point<f32>],
    score_text: &str,
    options: &AnnotateOptions,
) -> RgbImage {
    let mut canvas = image.clone();

    for t in teacher {
        draw_mark_outline_mut(&mut canvas, t, options.mark_radius, options.key_color);
    }
    for s in matched {
        draw_filled_circle_mut(
            &mut canvas,
            (s.x.round() as i32, s.y.round() as i32),
            options.mark_radius,
            options.correct_color,
        );
    }
    for s in unmatched {
        draw_filled_circle_mut(
            &mut canvas,
            (s.x.round() as i32, s.y.round() as i32),
            options.mark_radius,
            options.incorrect_color,
        );
    }

    let x = (canvas.width() as i32 - options.score_inset.0).max(0);
    draw_score_text_mut(&mut canvas, score_text, x, options.score_inset.1, options.score_color);

    canvas
}

/// Renders a hollow circle around each detected bubble on a copy of the
/// image, for detection preview.
pub fn outline_bubbles(
    image: &RgbImage,
    centers: &[Point<f32>],
    options: &AnnotateOptions,
) -> RgbImage {
    let mut canvas = image.clone();
    for center in centers {
        draw_mark_outline_mut(&mut canvas, center, options.mark_radius, options.key_color);
    }
    canvas
}

// Hollow circles from imageproc are single-pixel; stacking three radii gives
// a stroke that survives display scaling.
fn draw_mark_outline_mut(canvas: &mut RgbImage, center: &Point<f32>, radius: i32, color: Rgb<u8>) {
    let center = (center.x.round() as i32, center.y.round() as i32);
    for r in radius - 1..=radius + 1 {
        draw_hollow_circle_mut(canvas, center, r, color);
    }
}

const GLYPH_WIDTH: i32 = 22;
const GLYPH_HEIGHT: i32 = 36;
const GLYPH_STROKE: i32 = 5;
const GLYPH_ADVANCE: i32 = 28;

// Segment bitmasks for the digits 0-9, one bit per segment in the order
// top, top-right, bottom-right, bottom, bottom-left, top-left, middle.
const DIGIT_SEGMENTS: [u8; 10] = [
    0b111_1110,
    0b011_0000,
    0b110_1101,
    0b111_1001,
    0b011_0011,
    0b101_1011,
    0b101_1111,
    0b111_0000,
    0b111_1111,
    0b111_1011,
];

/// Draws a score string using segment glyphs. Only digits, `/` and spaces
/// are renderable; anything else is skipped.
fn draw_score_text_mut(canvas: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>) {
    let mut pen_x = x;
    for c in text.chars() {
        match c {
            '0'..='9' => {
                let segments = DIGIT_SEGMENTS[c as usize - '0' as usize];
                draw_digit_segments_mut(canvas, segments, pen_x, y, color);
            }
            '/' => draw_slash_mut(canvas, pen_x, y, color),
            ' ' => {}
            _ => debug!("score text character {:?} has no glyph; skipping", c),
        }
        pen_x += GLYPH_ADVANCE;
    }
}

fn draw_digit_segments_mut(canvas: &mut RgbImage, segments: u8, x: i32, y: i32, color: Rgb<u8>) {
    let (w, h, t) = (GLYPH_WIDTH, GLYPH_HEIGHT, GLYPH_STROKE);
    let half = h / 2;
    let bars = [
        Rect::at(x, y).of_size(w as u32, t as u32),                              // top
        Rect::at(x + w - t, y).of_size(t as u32, half as u32),                   // top-right
        Rect::at(x + w - t, y + half).of_size(t as u32, (h - half) as u32),      // bottom-right
        Rect::at(x, y + h - t).of_size(w as u32, t as u32),                      // bottom
        Rect::at(x, y + half).of_size(t as u32, (h - half) as u32),              // bottom-left
        Rect::at(x, y).of_size(t as u32, half as u32),                           // top-left
        Rect::at(x, y + half - t / 2).of_size(w as u32, t as u32),               // middle
    ];
    for (i, bar) in bars.iter().enumerate() {
        if segments & (1u8 << (6 - i)) != 0 {
            draw_filled_rect_mut(canvas, *bar, color);
        }
    }
}

fn draw_slash_mut(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    for offset in 0..GLYPH_STROKE {
        draw_line_segment_mut(
            canvas,
            ((x + GLYPH_WIDTH + offset) as f32, y as f32),
            ((x + offset) as f32, (y + GLYPH_HEIGHT) as f32),
            color,
        );
    }
}
