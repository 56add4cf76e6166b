use serde::Serialize;

use super::interval::is_between;
use super::{Recording, Viewport};
use crate::config::TimelineConfig;

/// A vertical time grid line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLine {
    pub time: f64,
    /// Screen x
    pub x: f64,
    pub major: bool,
}

/// Grid spacing in ms for the current zoom level
pub fn grid_interval(scale_x: f64, config: &TimelineConfig) -> f64 {
    if scale_x < config.coarse_grid_scale {
        config.coarse_grid_interval
    } else {
        config.fine_grid_interval
    }
}

/// Grid lines anchored at the recording start that fall inside the viewport
pub fn grid_lines(
    recording: &Recording,
    viewport: &Viewport,
    config: &TimelineConfig,
) -> Vec<GridLine> {
    let interval = grid_interval(viewport.scale_x, config);
    if interval <= 0.0 || recording.duration <= 0.0 {
        return Vec::new();
    }

    let start = viewport.visible_time_start;
    let end = viewport.visible_time_end();
    let count = (recording.duration / interval).floor() as usize;
    let major_every = config.major_grid_every.max(1);

    // Only walk the candidates that can land in the window
    let first = ((start - recording.begin) / interval).floor().max(0.0) as usize;

    (first..count)
        .map(|n| (n, recording.begin + n as f64 * interval))
        .take_while(|&(_, time)| time <= end)
        .filter(|&(_, time)| is_between(time, start, end))
        .map(|(n, time)| GridLine {
            time,
            x: viewport.time_to_x(time),
            major: n % major_every == 0,
        })
        .collect()
}
