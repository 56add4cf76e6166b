use serde::Serialize;

use super::Recording;
use crate::config::TimelineConfig;

/// Visible time window and horizontal scale
///
/// Every transition takes the current recording and returns with the window
/// clamped to its time extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Width of the drawing area in pixels
    pub width: f64,
    /// Time at the left edge (ms)
    pub visible_time_start: f64,
    /// Pixels per ms
    pub scale_x: f64,
    #[serde(skip)]
    zoom_factor: f64,
    #[serde(skip)]
    min_scale: f64,
    /// Still showing the whole recording; cleared by the first pan or zoom
    #[serde(skip)]
    fitted: bool,
}

/// Direction of a wheel step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel deltas below zero zoom in
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        }
    }
}

impl Viewport {
    /// A viewport showing the whole recording
    pub fn fit(recording: &Recording, config: &TimelineConfig) -> Self {
        let mut viewport = Self {
            width: config.viewport_width,
            visible_time_start: recording.begin,
            scale_x: config.min_scale,
            zoom_factor: config.zoom_factor,
            min_scale: config.min_scale,
            fitted: true,
        };
        viewport.reset(recording);
        viewport
    }

    /// Time at the right edge (ms)
    pub fn visible_time_end(&self) -> f64 {
        self.visible_time_start + self.visible_span()
    }

    /// Length of the visible window (ms)
    pub fn visible_span(&self) -> f64 {
        self.width / self.scale_x
    }

    /// Smallest scale allowed for `recording`: the whole trace in view
    pub fn fit_scale(&self, recording: &Recording) -> f64 {
        let fit = if recording.duration > 0.0 {
            self.width / recording.duration
        } else {
            self.min_scale
        };
        fit.max(self.min_scale)
    }

    /// Screen x of a point in time
    pub fn time_to_x(&self, time: f64) -> f64 {
        (time - self.visible_time_start) * self.scale_x
    }

    /// Point in time under a screen x
    pub fn x_to_time(&self, x: f64) -> f64 {
        self.visible_time_start + x / self.scale_x
    }

    /// Fit the whole recording and scroll to its beginning
    pub fn reset(&mut self, recording: &Recording) {
        self.scale_x = self.fit_scale(recording);
        self.visible_time_start = recording.begin;
        self.fitted = true;
        log::debug!(
            "Viewport reset: scale {:.5} px/ms from {}ms",
            self.scale_x,
            self.visible_time_start
        );
    }

    /// Move the left edge to `time`, clamped to the recording
    pub fn pan_to(&mut self, time: f64, recording: &Recording) {
        self.fitted = false;
        self.clamp_start(time, recording);
    }

    fn clamp_start(&mut self, time: f64, recording: &Recording) {
        let upper = recording.end - self.visible_span();
        self.visible_time_start = if upper < recording.begin {
            recording.begin
        } else {
            time.clamp(recording.begin, upper)
        };
    }

    /// Drag the content by `dx` pixels; dragging right reveals earlier time
    pub fn pan_by_pixels(&mut self, dx: f64, recording: &Recording) {
        self.pan_to(self.visible_time_start - dx / self.scale_x, recording);
    }

    /// Zoom one step, keeping the time under `anchor_x` in place
    pub fn zoom(&mut self, direction: ZoomDirection, anchor_x: f64, recording: &Recording) {
        let factor = match direction {
            ZoomDirection::In => self.zoom_factor,
            ZoomDirection::Out => 1.0 / self.zoom_factor,
        };
        let old_scale = self.scale_x;
        let new_scale = (old_scale * factor).max(self.fit_scale(recording));

        self.scale_x = new_scale;
        let start = self.visible_time_start - (anchor_x / new_scale - anchor_x / old_scale);
        self.pan_to(start, recording);

        log::debug!(
            "Zoom {:?} at x={}: scale {:.5} -> {:.5}, start {}ms",
            direction,
            anchor_x,
            old_scale,
            new_scale,
            self.visible_time_start
        );
    }

    /// Adapt to a new drawing width. A fitted view is fitted again,
    /// otherwise the current position is kept.
    pub fn resize(&mut self, width: f64, recording: &Recording) {
        self.width = width;
        if self.fitted {
            self.reset(recording);
            return;
        }
        self.scale_x = self.scale_x.max(self.fit_scale(recording));
        self.clamp_start(self.visible_time_start, recording);
    }

    /// Whether the view still shows the whole recording as fitted on load
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }
}
