//! Top-level locate orchestration
//!
//! Validation is exhaustive and happens before any pixel is decoded: every
//! failing check is collected and reported together. Only then does the
//! pipeline run: load -> correlate -> threshold -> deduplicate.

use super::cluster::ClusterDeduplicator;
use super::config::LocateConfig;
use super::error::{ImageRole, LocateError, LocateResult, ValidationError, ValidationErrors};
use super::loader::ImageLoader;
use super::matcher::TemplateMatcher;
use super::threshold;
use super::types::CandidatePoint;
use image::GrayImage;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct MatchLocator {
    config: LocateConfig,
}

impl MatchLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LocateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocateConfig {
        &self.config
    }

    /// Pre-flight checks for a locate call. Reports every violation at once.
    pub fn validate(
        &self,
        main_path: &Path,
        sub_path: &Path,
        confidence: f32,
    ) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if !main_path.exists() {
            errors.push(ValidationError::PathNotFound {
                which: ImageRole::Main,
                path: main_path.to_path_buf(),
            });
        }
        if !sub_path.exists() {
            errors.push(ValidationError::PathNotFound {
                which: ImageRole::Sub,
                path: sub_path.to_path_buf(),
            });
        }
        errors.extend(self.validate_parameters(confidence));

        match ValidationErrors::new(errors) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    fn validate_parameters(&self, confidence: f32) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        // Closed interval: 0 and 1 are both accepted. NaN fails the range test.
        if !(0.0..=1.0).contains(&confidence) {
            errors.push(ValidationError::InvalidParameter {
                name: "confidence",
                value: confidence as f64,
                expected: "a value within [0, 1]",
            });
        }
        let radius = self.config.cluster_radius;
        if !(radius.is_finite() && radius >= 0.0) {
            errors.push(ValidationError::InvalidParameter {
                name: "cluster_radius",
                value: radius,
                expected: "a finite, non-negative pixel distance",
            });
        }
        errors
    }

    /// Find every distinct occurrence of the sub image inside the main image.
    ///
    /// Returns one center point per occurrence, in row-major discovery order.
    /// An empty list means no window reached `confidence`.
    pub fn locate(
        &self,
        main_path: &Path,
        sub_path: &Path,
        confidence: f32,
    ) -> LocateResult<Vec<CandidatePoint>> {
        self.validate(main_path, sub_path, confidence)?;

        let main = ImageLoader::load_main(main_path)?;
        let sub = ImageLoader::load_sub(sub_path)?;
        self.run(&main.gray, sub, confidence)
    }

    /// [`locate`](Self::locate) with the confidence from this locator's config.
    pub fn locate_configured(
        &self,
        main_path: &Path,
        sub_path: &Path,
    ) -> LocateResult<Vec<CandidatePoint>> {
        self.locate(main_path, sub_path, self.config.confidence)
    }

    /// Same pipeline on already decoded images (e.g. a fresh screenshot).
    pub fn locate_images(
        &self,
        main: &GrayImage,
        sub: &GrayImage,
        confidence: f32,
    ) -> LocateResult<Vec<CandidatePoint>> {
        if let Some(errors) = ValidationErrors::new(self.validate_parameters(confidence)) {
            return Err(errors.into());
        }
        for (image, which) in [(main, ImageRole::Main), (sub, ImageRole::Sub)] {
            if image.width() == 0 || image.height() == 0 {
                return Err(LocateError::EmptyImage { which });
            }
        }
        self.run(main, sub.clone(), confidence)
    }

    fn run(
        &self,
        main: &GrayImage,
        sub: GrayImage,
        confidence: f32,
    ) -> LocateResult<Vec<CandidatePoint>> {
        let start = Instant::now();
        let (sub_w, sub_h) = sub.dimensions();

        let scores = TemplateMatcher::new(sub).match_image(main)?;
        let candidates = threshold::filter(&scores, confidence, sub_w, sub_h);
        let dedup = ClusterDeduplicator::new(self.config.cluster_radius);
        let points = dedup.deduplicate(&candidates);

        debug_assert!(
            points
                .iter()
                .all(|p| p.x < main.width() && p.y < main.height()),
            "located point outside main image"
        );
        debug_assert!(
            points.iter().enumerate().all(|(i, a)| points[i + 1..]
                .iter()
                .all(|b| a.distance(b) > dedup.eps())),
            "cluster representatives closer than eps"
        );

        log::info!(
            "✅ Located {} occurrence(s) in {}ms",
            points.len(),
            start.elapsed().as_millis()
        );
        Ok(points)
    }
}

/// Locate `sub_path` inside `main_path` with the default cluster radius.
pub fn locate(
    main_path: impl AsRef<Path>,
    sub_path: impl AsRef<Path>,
    confidence: f32,
) -> LocateResult<Vec<(u32, u32)>> {
    MatchLocator::new()
        .locate(main_path.as_ref(), sub_path.as_ref(), confidence)
        .map(|points| points.into_iter().map(Into::into).collect())
}
