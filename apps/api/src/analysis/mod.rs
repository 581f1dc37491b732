// Scoring core: résumé ATS analysis, coding-practice and portfolio scorers,
// readiness aggregation, and the record lifecycle that persists their output.

pub mod coding;
pub mod handlers;
pub mod locks;
pub mod models;
pub mod portfolio;
pub mod readiness;
pub mod resume;
pub mod service;

use crate::insight::Insight;

/// Output of a scorer, ready to be stored on an `AnalysisRecord`.
pub trait ScoredAnalysis {
    fn score(&self) -> u8;
    fn insight(&self) -> Option<&Insight>;
}

/// Rounds half away from zero and clamps into [0, 100]. NaN maps to 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-12.0), 0);
        assert_eq!(clamp_score(250.4), 100);
        assert_eq!(clamp_score(66.5), 67);
        assert_eq!(clamp_score(f64::NAN), 0);
        assert_eq!(clamp_score(f64::INFINITY), 100);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("résumé", 3), "rés");
        assert_eq!(excerpt("short", 100), "short");
    }
}
