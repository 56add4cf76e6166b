use serde::Serialize;
use std::path::Path;

use crate::config::TimelineConfig;
use crate::timeline::{
    FilterSet, Frame, Highlight, LockerInfo, Recording, Scene, Theme, Viewport, ZoomDirection,
    build_recording, visible_tracks,
};
use crate::trace::{
    JSON_MIME, ProtocolEntry, SanityReport, TraceResult, TraceSource, check_trace, format_track,
    mime_for_path, parse_trace,
};

/// Headline numbers of the loaded trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub entries: usize,
    pub tracks: usize,
    /// Padded recording duration in whole seconds
    pub duration_secs: u64,
}

/// One loaded trace together with the view state around it.
///
/// Loading a trace replaces the raw entries and the derived recording in one
/// step and resets the view. A failed load leaves everything untouched.
#[derive(Debug, Clone)]
pub struct Session {
    config: TimelineConfig,
    theme: Theme,
    source: Option<TraceSource>,
    trace: Vec<ProtocolEntry>,
    recording: Recording,
    viewport: Viewport,
    filters: FilterSet,
    highlight: Highlight,
}

impl Session {
    pub fn new(config: TimelineConfig) -> Self {
        let recording = build_recording(&[], &config);
        let viewport = Viewport::fit(&recording, &config);
        Self {
            config,
            theme: Theme::default(),
            source: None,
            trace: Vec::new(),
            recording,
            viewport,
            filters: FilterSet::new(),
            highlight: Highlight::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn source(&self) -> Option<&TraceSource> {
        self.source.as_ref()
    }

    /// The raw entries of the current trace
    pub fn trace(&self) -> &[ProtocolEntry] {
        &self.trace
    }

    /// The recording derived from the current trace
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn has_data(&self) -> bool {
        !self.trace.is_empty()
    }

    /// Replace the whole trace, rebuild the recording and fit the view
    pub fn replace_trace(&mut self, entries: Vec<ProtocolEntry>) {
        self.trace = entries;
        self.recording = build_recording(&self.trace, &self.config);
        self.viewport.reset(&self.recording);
        self.highlight.leave();
    }

    /// Parse `text` as a trace and load it
    pub fn load_json(&mut self, text: &str) -> TraceResult<()> {
        let entries = parse_trace(text).inspect_err(|e| {
            log::warn!("Rejected trace, keeping the current one: {}", e);
        })?;
        log::info!("Loaded trace with {} entries", entries.len());
        self.replace_trace(entries);
        Ok(())
    }

    /// Read, parse and load a trace, remembering where it came from
    pub fn load_source(&mut self, source: TraceSource) -> TraceResult<()> {
        let text = source.read_text()?;
        self.load_json(&text)?;
        self.source = Some(source);
        Ok(())
    }

    /// Read the current source again. Returns `false` if there is nothing to
    /// reload.
    pub fn reload(&mut self) -> TraceResult<bool> {
        let Some(source) = self.source.clone() else {
            return Ok(false);
        };
        log::debug!("Reloading {}", source.display_name());
        self.load_source(source)?;
        Ok(true)
    }

    /// Handle a dropped file. Anything but JSON is ignored; returns whether
    /// the trace was replaced.
    pub fn load_dropped(&mut self, mime: &str, text: &str) -> TraceResult<bool> {
        if mime != JSON_MIME {
            log::warn!("Ignoring dropped file of type {:?}", mime);
            return Ok(false);
        }
        self.load_json(text)?;
        Ok(true)
    }

    /// Handle a file dropped by path
    pub fn drop_file(&mut self, path: &Path) -> TraceResult<bool> {
        let Some(mime) = mime_for_path(path) else {
            log::warn!("Ignoring dropped file {}", path.display());
            return Ok(false);
        };
        let source = TraceSource::File(path.to_path_buf());
        let text = source.read_text()?;
        let loaded = self.load_dropped(mime, &text)?;
        if loaded {
            self.source = Some(source);
        }
        Ok(loaded)
    }

    /// The drawing area changed size. Lanes are reassigned for the new
    /// height; the view keeps its position.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width == self.config.viewport_width && height == self.config.viewport_height {
            return;
        }
        let lanes_before = self.config.lane_count();
        self.config.viewport_width = width;
        self.config.viewport_height = height;

        // An empty recording spans the viewport width, so it follows resizes too
        if self.config.lane_count() != lanes_before || self.recording.is_empty() {
            self.recording = build_recording(&self.trace, &self.config);
        }
        self.viewport.resize(width, &self.recording);
    }

    pub fn zoom(&mut self, direction: ZoomDirection, anchor_x: f64) {
        self.viewport.zoom(direction, anchor_x, &self.recording);
    }

    pub fn pan_by_pixels(&mut self, dx: f64) {
        self.viewport.pan_by_pixels(dx, &self.recording);
    }

    pub fn set_visible_time_start(&mut self, time: f64) {
        self.viewport.pan_to(time, &self.recording);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset(&self.recording);
    }

    pub fn set_filters(&mut self, tags: Vec<String>) {
        self.filters.set(tags);
    }

    pub fn add_filter(&mut self, tag: impl Into<String>) {
        self.filters.add(tag);
    }

    pub fn remove_filter(&mut self, index: usize) -> Option<String> {
        self.filters.remove(index)
    }

    pub fn pop_filter(&mut self) -> Option<String> {
        self.filters.pop()
    }

    /// Pointer entered the track of locker `id`
    pub fn enter_track(&mut self, id: u64) {
        if let Some(locker) = self.recording.locker(id) {
            self.highlight.enter(locker);
        }
    }

    pub fn leave_track(&mut self) {
        self.highlight.leave();
    }

    pub fn visible_tracks(&self) -> Vec<&LockerInfo> {
        visible_tracks(&self.recording, &self.viewport, &self.filters)
    }

    /// The visible track under a screen position, topmost first
    pub fn track_at(&self, x: f64, y: f64) -> Option<&LockerInfo> {
        if y < 0.0 || self.config.row_height <= 0.0 {
            return None;
        }
        let row = (y / self.config.row_height).floor() as usize;
        let time = self.viewport.x_to_time(x);
        let slack = self.theme.border_width / self.viewport.scale_x;

        self.visible_tracks()
            .into_iter()
            .rev()
            .find(|l| l.row == row && time >= l.begin - slack && time <= l.end + slack)
    }

    /// Render-ready state for the current tick
    pub fn frame(&self) -> Frame {
        Scene {
            recording: &self.recording,
            viewport: &self.viewport,
            filters: &self.filters,
            highlight: &self.highlight,
            theme: &self.theme,
            config: &self.config,
            has_data: self.has_data(),
        }
        .frame()
    }

    pub fn sanity_check(&self) -> SanityReport {
        check_trace(&self.trace)
    }

    /// Textual dump of one track
    pub fn inspect(&self, id: u64) -> Option<String> {
        self.recording.locker(id).map(format_track)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            entries: self.trace.len(),
            tracks: self.recording.lockers.len(),
            duration_secs: (self.recording.duration / 1000.0).round().max(0.0) as u64,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}
