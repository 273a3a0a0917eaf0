//! Locate a sub image inside a main image
//!
//! The match-and-deduplicate pipeline:
//! - `loader`: decode both images to intensity matrices
//! - `matcher`: normalized cross-correlation score for every window
//! - `threshold`: keep windows at or above the confidence, as center points
//! - `cluster`: collapse near-duplicate detections, one point per occurrence
//! - `locator`: pre-flight validation and orchestration
pub mod annotate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod loader;
pub mod locator;
pub mod matcher;
pub mod threshold;
pub mod types;

#[cfg(test)]
mod tests;

pub use cluster::ClusterDeduplicator;
pub use config::{LocateConfig, create_default_config, create_ui_config};
pub use error::{ImageRole, LocateError, LocateResult, ValidationError, ValidationErrors};
pub use loader::{ImageLoader, LoadedImage};
pub use locator::{MatchLocator, locate};
pub use matcher::{TemplateMatcher, match_template};
pub use types::{CandidatePoint, ScoreMatrix};
