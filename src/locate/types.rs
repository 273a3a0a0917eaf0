/// Locate pipeline data types
use serde::Serialize;

/// A pixel coordinate in the main image.
///
/// Produced from a score-matrix cell that passed the threshold, offset to the
/// center of the aligned window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CandidatePoint {
    /// X coordinate in the main image
    pub x: u32,
    /// Y coordinate in the main image
    pub y: u32,
}

impl CandidatePoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance, kept integral so comparisons are exact.
    pub fn distance_squared(&self, other: &CandidatePoint) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &CandidatePoint) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

impl From<CandidatePoint> for (u32, u32) {
    fn from(p: CandidatePoint) -> Self {
        (p.x, p.y)
    }
}

impl From<(u32, u32)> for CandidatePoint {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Similarity scores for every valid alignment of the sub image.
///
/// Row-major; `width = main_w - sub_w + 1`, `height = main_h - sub_h + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    width: u32,
    height: u32,
    scores: Vec<f32>,
}

impl ScoreMatrix {
    pub fn new(width: u32, height: u32, scores: Vec<f32>) -> Self {
        debug_assert_eq!(
            scores.len(),
            width as usize * height as usize,
            "score buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            scores,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Score of the window whose top-left corner is (x, y).
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.scores
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Iterate `(x, y, score)` in row-major order (y ascending, then x).
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        let width = self.width.max(1) as usize;
        self.scores
            .iter()
            .enumerate()
            .map(move |(i, &s)| ((i % width) as u32, (i / width) as u32, s))
    }

    /// Highest score and its window position, if the matrix is non-empty.
    pub fn max(&self) -> Option<(u32, u32, f32)> {
        self.enumerate()
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }
}
