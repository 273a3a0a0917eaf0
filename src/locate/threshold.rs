use super::types::{CandidatePoint, ScoreMatrix};

/// Every window scoring at least `threshold`, as the pixel at the window center.
///
/// Scans row-major (y ascending, then x), so the output order is reproducible.
/// Each score cell maps to a distinct center, so no coordinate repeats.
pub fn filter(
    scores: &ScoreMatrix,
    threshold: f32,
    sub_width: u32,
    sub_height: u32,
) -> Vec<CandidatePoint> {
    let (half_w, half_h) = (sub_width / 2, sub_height / 2);
    let points: Vec<CandidatePoint> = scores
        .enumerate()
        .filter(|&(_, _, score)| score >= threshold)
        .map(|(x, y, _)| CandidatePoint::new(x + half_w, y + half_h))
        .collect();

    log::debug!(
        "🎯 {} of {} windows reached confidence {:.2}",
        points.len(),
        scores.as_slice().len(),
        threshold
    );
    points
}
