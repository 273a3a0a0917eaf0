//! Configuration for locate operations

/// Default confidence threshold used by the tap workflow and the CLI.
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

/// Maximum pixel distance at which two detections are the same occurrence.
pub const DEFAULT_CLUSTER_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LocateConfig {
    /// Confidence threshold for template matching (0.0 to 1.0)
    pub confidence: f32,
    /// Clustering radius (eps) for collapsing near-duplicate detections
    pub cluster_radius: f64,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            cluster_radius: DEFAULT_CLUSTER_RADIUS,
        }
    }
}

impl LocateConfig {
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_cluster_radius(mut self, radius: f64) -> Self {
        self.cluster_radius = radius;
        self
    }
}

/// Create a default configuration for screen automation
pub fn create_default_config() -> LocateConfig {
    LocateConfig::default()
}

/// Configuration preset for UI elements (buttons, menus)
pub fn create_ui_config() -> LocateConfig {
    LocateConfig {
        confidence: 0.9,
        cluster_radius: DEFAULT_CLUSTER_RADIUS,
    }
}
