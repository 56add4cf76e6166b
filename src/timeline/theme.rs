use serde::{Deserialize, Serialize};
use std::fmt;

use crate::trace::EntryType;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Palette and stroke settings of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Rgb,
    pub light_lines: Rgb,
    pub main_lines: Rgb,
    pub highlight: Rgb,
    pub error: Rgb,
    pub border: Rgb,
    pub border_width: f64,
    pub fill: Rgb,
    pub fill_warn: Rgb,
    pub label: Rgb,
    /// Marker color per event type, indexed by `EntryType::index`
    pub colors: [Rgb; EntryType::COUNT],
}

impl Theme {
    pub fn entry_color(&self, entry_type: EntryType) -> Rgb {
        self.colors[entry_type.index()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb::from_hex(0x494848),
            light_lines: Rgb::from_hex(0x444444),
            main_lines: Rgb::from_hex(0x666666),
            highlight: Rgb::from_hex(0x008080),
            error: Rgb::from_hex(0xff0000),
            border: Rgb::from_hex(0x000000),
            border_width: 1.0,
            fill: Rgb::from_hex(0xffffff),
            fill_warn: Rgb::from_hex(0xf08080),
            label: Rgb::from_hex(0xffffff),
            colors: [
                Rgb::from_hex(0x20b2aa), // RequestRead
                Rgb::from_hex(0xf08080), // RequestWrite
                Rgb::from_hex(0x2e8b57), // ReadGranted
                Rgb::from_hex(0xff7f50), // WriteGranted
                Rgb::from_hex(0x8fbc8f), // ReadReleased
                Rgb::from_hex(0xcd5b45), // WriteReleased
                Rgb::from_hex(0xffa500), // RequestRejected
                Rgb::from_hex(0x8b0000), // DeadlockDetected
                Rgb::from_hex(0x006400), // DeadlockResolved
                Rgb::from_hex(0xffff00), // Unlocked
                Rgb::from_hex(0xffffff), // Created
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_colors() {
        let theme = Theme::default();
        assert_eq!(theme.entry_color(EntryType::DeadlockDetected), Rgb(0x8b, 0, 0));
        assert_eq!(theme.entry_color(EntryType::Unlocked), Rgb(0xff, 0xff, 0));
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::from_hex(0x20b2aa).to_string(), "#20b2aa");
    }
}
