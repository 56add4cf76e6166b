use ratatui::style::Color;

use crate::timeline::Rgb;
use crate::trace::EntryType;

/// Terminal color for a theme color
pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Short tag shown in the inspector for each event type
pub fn entry_glyph(entry_type: EntryType) -> char {
    match entry_type {
        // Requests
        EntryType::RequestRead | EntryType::RequestWrite => '?',

        // Grants
        EntryType::ReadGranted | EntryType::WriteGranted => '+',

        // Releases
        EntryType::ReadReleased | EntryType::WriteReleased | EntryType::Unlocked => '-',

        // Failures
        EntryType::RequestRejected | EntryType::DeadlockDetected => '!',

        EntryType::DeadlockResolved => '~',
        EntryType::Created => '*',
    }
}
