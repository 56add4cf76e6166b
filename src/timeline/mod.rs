//! Layout and interaction engine of the lock timeline: groups a trace into
//! tracks, places them on lanes, and resolves what is visible for a given
//! viewport, filter set and highlight.

mod grid;
mod grouper;
mod highlight;
mod interval;
mod scene;
mod theme;
mod viewport;
mod visibility;

pub use grid::{GridLine, grid_interval, grid_lines};
pub use grouper::{LockerInfo, MERGED_LABEL, Recording, build_recording};
pub use highlight::Highlight;
pub use interval::{is_between, is_in_range};
pub use scene::{Frame, Marker, Scene, TimeWindow, TrackShape};
pub use theme::{Rgb, Theme};
pub use viewport::{Viewport, ZoomDirection};
pub use visibility::{FilterSet, is_detailed, visible_tracks};
