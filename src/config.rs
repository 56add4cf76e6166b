use serde::{Deserialize, Serialize};

/// Layout and interaction constants of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Viewport size in pixels
    pub viewport_width: f64,
    pub viewport_height: f64,

    /// Height of one lane in pixels
    pub row_height: f64,

    /// Per-entry markers are drawn only while fewer tracks than this are visible
    pub detail_threshold: usize,

    /// Added to the recording duration so the last event is not flush
    /// against the right edge (ms)
    pub duration_padding: f64,

    /// Scale multiplier of one zoom-in step
    pub zoom_factor: f64,

    /// Lower bound of the horizontal scale (pixels per ms)
    pub min_scale: f64,

    /// Below this scale the grid switches to the coarse interval
    pub coarse_grid_scale: f64,
    pub fine_grid_interval: f64,
    pub coarse_grid_interval: f64,

    /// Every n-th grid line is a major line
    pub major_grid_every: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            row_height: 30.0,
            detail_threshold: 100,
            duration_padding: 200.0,
            zoom_factor: 1.3,
            min_scale: 0.01,
            coarse_grid_scale: 0.1,
            fine_grid_interval: 100.0,
            coarse_grid_interval: 1000.0,
            major_grid_every: 10,
        }
    }
}

impl TimelineConfig {
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    /// Number of lanes that fit the viewport height
    pub fn lane_count(&self) -> usize {
        if self.row_height <= 0.0 {
            return 1;
        }
        ((self.viewport_height / self.row_height).floor() as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_count() {
        assert_eq!(TimelineConfig::default().lane_count(), 24);
        let config = TimelineConfig::default().with_viewport(800.0, 95.0);
        assert_eq!(config.lane_count(), 3);
    }

    #[test]
    fn test_lane_count_never_zero() {
        let config = TimelineConfig::default().with_viewport(800.0, 10.0);
        assert_eq!(config.lane_count(), 1);
        assert_eq!(config.with_row_height(0.0).lane_count(), 1);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TimelineConfig = serde_json::from_str(r#"{"row_height": 16}"#).unwrap();
        assert_eq!(config.row_height, 16.0);
        assert_eq!(config.detail_threshold, 100);
    }
}
