use imageproc::point::Point;
use log::debug;
use serde::Serialize;

use crate::geometry::distance;

/// Classification of every student mark against the answer key.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    /// Student marks within the threshold of some key mark.
    pub matched: Vec<Point<f32>>,
    /// Student marks with no key mark in range.
    pub unmatched: Vec<Point<f32>>,
    /// Number of matched student marks.
    pub correct_count: usize,
    /// Number of key marks; the score denominator even when the student made
    /// more or fewer marks.
    pub total_count: usize,
}

impl GradeResult {
    /// Score string in `correct/total` form; an empty answer key reads
    /// "0/0".
    pub fn score_text(&self) -> String {
        format!("{}/{}", self.correct_count, self.total_count)
    }

    pub fn summary(&self) -> GradeSummary {
        GradeSummary {
            correct_count: self.correct_count,
            total_count: self.total_count,
            matched: self.matched.iter().map(|p| (p.x, p.y)).collect(),
            unmatched: self.unmatched.iter().map(|p| (p.x, p.y)).collect(),
        }
    }
}

/// Serializable form of a [`GradeResult`], with marks as `(x, y)` pairs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub correct_count: usize,
    pub total_count: usize,
    pub matched: Vec<(f32, f32)>,
    pub unmatched: Vec<(f32, f32)>,
}

/// Partitions the student marks into matched and unmatched against the
/// answer key.
///
/// Each student mark scans the key marks in their given order and the first
/// one within `threshold` pixels wins; when key marks sit closer together
/// than the threshold, the earliest-indexed one takes the match. The score
/// numerator is the matched-mark count and the denominator is the key-mark
/// count; unmatched marks do not lower the numerator, they surface in the
/// incorrect overlay instead.
pub fn grade(teacher: &[Point<f32>], student: &[Point<f32>], threshold: f32) -> GradeResult {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for s in student {
        if teacher.iter().any(|t| distance(s, t) < threshold) {
            matched.push(*s);
        } else {
            unmatched.push(*s);
        }
    }

    debug!(
        "graded {} student marks against {} key marks: {} matched",
        student.len(),
        teacher.len(),
        matched.len()
    );

    GradeResult {
        correct_count: matched.len(),
        total_count: teacher.len(),
        matched,
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_marks_by_distance_threshold() {
        let teacher = vec![Point::new(100.0, 100.0), Point::new(200.0, 100.0)];
        let student = vec![Point::new(101.0, 99.0), Point::new(500.0, 500.0)];

        let result = grade(&teacher, &student, 25.0);

        assert_eq!(result.matched, vec![Point::new(101.0, 99.0)]);
        assert_eq!(result.unmatched, vec![Point::new(500.0, 500.0)]);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn denominator_is_the_key_mark_count() {
        let teacher = vec![
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(110.0, 10.0),
        ];

        let no_answers = grade(&teacher, &[], 25.0);
        assert_eq!(no_answers.correct_count, 0);
        assert_eq!(no_answers.total_count, 3);

        // Extra marks near the same key mark can all match it, but the
        // denominator still caps the ratio at the key-mark count.
        let extra_marks = vec![
            Point::new(10.0, 10.0),
            Point::new(12.0, 10.0),
            Point::new(60.0, 11.0),
            Point::new(110.0, 9.0),
            Point::new(400.0, 400.0),
        ];
        let result = grade(&teacher, &extra_marks, 25.0);
        assert_eq!(result.correct_count, 4);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.unmatched, vec![Point::new(400.0, 400.0)]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let teacher = vec![Point::new(0.0, 0.0)];
        let at_threshold = vec![Point::new(25.0, 0.0)];
        let result = grade(&teacher, &at_threshold, 25.0);
        assert_eq!(result.correct_count, 0);

        let just_inside = vec![Point::new(24.9, 0.0)];
        let result = grade(&teacher, &just_inside, 25.0);
        assert_eq!(result.correct_count, 1);
    }

    #[test]
    fn empty_key_scores_zero_of_zero() {
        let result = grade(&[], &[Point::new(5.0, 5.0)], 25.0);
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.total_count, 0);
        assert_eq!(result.score_text(), "0/0");
    }

    #[test]
    fn score_text_is_correct_over_total() {
        let teacher = vec![Point::new(100.0, 100.0), Point::new(200.0, 100.0)];
        let student = vec![Point::new(101.0, 99.0)];
        let result = grade(&teacher, &student, 25.0);
        assert_eq!(result.score_text(), "1/2");
    }

    #[test]
    fn summary_serializes_counts_and_marks() {
        let teacher = vec![Point::new(100.0, 100.0)];
        let student = vec![Point::new(101.0, 99.0), Point::new(500.0, 500.0)];
        let result = grade(&teacher, &student, 25.0);

        let json = serde_json::to_value(result.summary()).unwrap();
        assert_eq!(json["correctCount"], 1);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["matched"][0][0], 101.0);
        assert_eq!(json["unmatched"][0][1], 500.0);
    }
}
