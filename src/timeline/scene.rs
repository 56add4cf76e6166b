use serde::Serialize;

use super::grid::{GridLine, grid_lines};
use super::theme::{Rgb, Theme};
use super::visibility::{FilterSet, is_detailed, visible_tracks};
use super::{Highlight, LockerInfo, Recording, Viewport};
use crate::config::TimelineConfig;
use crate::trace::EntryType;

/// Width of an entry marker in pixels
const MARKER_WIDTH: f64 = 2.0;

/// Gap between a bar and its label in pixels
const LABEL_GAP: f64 = 2.0;

/// Everything a renderer needs for one tick, in screen coordinates
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub window: TimeWindow,
    pub grid: Vec<GridLine>,
    pub tracks: Vec<TrackShape>,
    /// Lockers drawn with the highlight color
    pub highlighted: Vec<u64>,
    /// Whether per-entry markers were produced
    pub detailed: bool,
    /// Nothing loaded, the renderer should show a hint instead
    pub placeholder: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeWindow {
    pub visible_time_start: f64,
    pub visible_time_end: f64,
    pub scale_x: f64,
}

/// Draw attributes of one visible track
#[derive(Debug, Clone, Serialize)]
pub struct TrackShape {
    pub id: u64,
    pub row: usize,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub highlighted: bool,
    pub warn: bool,
    pub errored: bool,
    pub detailed: bool,
    pub label_x: f64,
    pub markers: Vec<Marker>,
}

/// A single entry on a detailed track
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub time: f64,
    pub entry_type: EntryType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
    /// Matched entries sit in the upper half of the row
    pub matched: bool,
}

/// Borrowed view of the state a frame is derived from
pub struct Scene<'a> {
    pub recording: &'a Recording,
    pub viewport: &'a Viewport,
    pub filters: &'a FilterSet,
    pub highlight: &'a Highlight,
    pub theme: &'a Theme,
    pub config: &'a TimelineConfig,
    /// Whether any raw entries are loaded, even if none formed a track
    pub has_data: bool,
}

impl Scene<'_> {
    pub fn frame(&self) -> Frame {
        let visible = visible_tracks(self.recording, self.viewport, self.filters);
        let detailed = is_detailed(visible.len(), self.config.detail_threshold);

        let tracks = visible
            .into_iter()
            .map(|locker| self.track_shape(locker, detailed))
            .collect();

        Frame {
            window: TimeWindow {
                visible_time_start: self.viewport.visible_time_start,
                visible_time_end: self.viewport.visible_time_end(),
                scale_x: self.viewport.scale_x,
            },
            grid: grid_lines(self.recording, self.viewport, self.config),
            tracks,
            highlighted: self.highlight.lockers().to_vec(),
            detailed,
            placeholder: !self.has_data,
        }
    }

    fn track_shape(&self, locker: &LockerInfo, detailed: bool) -> TrackShape {
        let theme = self.theme;
        let scale = self.viewport.scale_x;
        let row_height = self.config.row_height;

        let x = self.viewport.time_to_x(locker.begin);
        let y = locker.row as f64 * row_height;
        let bar_width = locker.duration() * scale;
        let highlighted = self.highlight.contains(locker.id);
        let errored = locker.is_errored();

        let fill = if highlighted {
            theme.highlight
        } else if locker.warn {
            theme.fill_warn
        } else {
            theme.fill
        };
        let stroke = if errored { theme.error } else { theme.border };

        let markers = if detailed {
            locker
                .protocol
                .iter()
                .map(|entry| {
                    let matched = self.filters.matches_entry(entry);
                    Marker {
                        time: entry.time,
                        entry_type: entry.entry_type,
                        x: self.viewport.time_to_x(entry.time),
                        y: if matched { y } else { y + row_height / 2.0 },
                        width: MARKER_WIDTH,
                        height: row_height / 2.0,
                        color: theme.entry_color(entry.entry_type),
                        matched,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        TrackShape {
            id: locker.id,
            row: locker.row,
            label: locker.label.clone(),
            x,
            y,
            width: bar_width + theme.border_width * 2.0,
            height: row_height,
            fill,
            stroke,
            highlighted,
            warn: locker.warn,
            errored,
            detailed,
            label_x: x + bar_width + theme.border_width + LABEL_GAP,
            markers,
        }
    }
}
