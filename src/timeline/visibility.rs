use serde::Serialize;

use super::interval::is_in_range;
use super::{LockerInfo, Recording, Viewport};
use crate::trace::ProtocolEntry;

/// Active text filters, matched as case-sensitive substrings of `extraInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    tags: Vec<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all tags at once, the way a tag widget reports them
    pub fn set(&mut self, tags: Vec<String>) {
        self.tags = tags;
        log::debug!("Filters set to {:?}", self.tags);
    }

    pub fn add(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if tag.is_empty() {
            return;
        }
        log::debug!("Adding filter {:?}", tag);
        self.tags.push(tag);
    }

    /// Remove the tag at `index`, returning it
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.tags.len() {
            return None;
        }
        let tag = self.tags.remove(index);
        log::debug!("Removed filter {:?}", tag);
        Some(tag)
    }

    pub fn pop(&mut self) -> Option<String> {
        let tag = self.tags.pop();
        log::debug!("Removed filter {:?}", tag);
        tag
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_active(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Whether `text` contains any of the tags
    pub fn matches_text(&self, text: &str) -> bool {
        self.tags.iter().any(|tag| text.contains(tag.as_str()))
    }

    /// Whether an entry is emphasized: filters are active and its
    /// `extraInfo` contains one of them
    pub fn matches_entry(&self, entry: &ProtocolEntry) -> bool {
        self.is_active() && entry.extra_info().is_some_and(|info| self.matches_text(info))
    }

    /// Whether a track passes the filters: no filters, or any entry matches
    pub fn admits(&self, locker: &LockerInfo) -> bool {
        !self.is_active() || locker.protocol.iter().any(|e| self.matches_entry(e))
    }
}

/// Tracks that intersect the visible window and pass the filters, in
/// recording order
pub fn visible_tracks<'a>(
    recording: &'a Recording,
    viewport: &Viewport,
    filters: &FilterSet,
) -> Vec<&'a LockerInfo> {
    let start = viewport.visible_time_start;
    let end = viewport.visible_time_end();

    recording
        .lockers
        .iter()
        .filter(|l| is_in_range(l.begin, l.end, start, end))
        .filter(|l| filters.admits(l))
        .collect()
}

/// Per-entry markers are drawn only below the threshold
pub fn is_detailed(visible_count: usize, threshold: usize) -> bool {
    visible_count < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::timeline::build_recording;
    use crate::trace::EntryType;

    fn track(id: u64, start: f64, infos: &[&str]) -> Vec<ProtocolEntry> {
        infos
            .iter()
            .enumerate()
            .map(|(n, info)| {
                ProtocolEntry::new(start + n as f64 * 10.0, id, EntryType::ReadGranted).with_info(*info)
            })
            .collect()
    }

    fn sample() -> (Recording, Viewport) {
        let config = TimelineConfig::default().with_viewport(100.0, 300.0);
        let mut entries = track(1, 0.0, &["tx", "/a h1", "/a h2"]);
        entries.extend(track(2, 100.0, &["tx", "/b h1", "/b h2"]));
        entries.extend(track(3, 1000.0, &["tx", "/a h3", "/c h4"]));
        let recording = build_recording(&entries, &config);
        let mut viewport = Viewport::fit(&recording, &config);
        viewport.scale_x = 1.0;
        (recording, viewport)
    }

    fn ids(tracks: &[&LockerInfo]) -> Vec<u64> {
        tracks.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_culls_offscreen_tracks() {
        let (recording, viewport) = sample();
        let visible = visible_tracks(&recording, &viewport, &FilterSet::new());

        assert_eq!(ids(&visible), vec![1, 2]);
    }

    #[test]
    fn test_filter_selects_tracks() {
        let (recording, mut viewport) = sample();
        viewport.scale_x = 0.05;
        let mut filters = FilterSet::new();
        filters.add("/a");

        let visible = visible_tracks(&recording, &viewport, &filters);
        assert_eq!(ids(&visible), vec![1, 3]);
    }

    #[test]
    fn test_filter_round_trip() {
        let (recording, viewport) = sample();
        let mut filters = FilterSet::new();
        let before = ids(&visible_tracks(&recording, &viewport, &filters));

        filters.add("/b");
        assert_eq!(ids(&visible_tracks(&recording, &viewport, &filters)), vec![2]);

        assert_eq!(filters.remove(0), Some("/b".to_string()));
        assert_eq!(ids(&visible_tracks(&recording, &viewport, &filters)), before);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let mut filters = FilterSet::new();
        filters.add("Lock");

        let entry = ProtocolEntry::new(0.0, 1, EntryType::Created).with_info("lockfile");
        assert!(!filters.matches_entry(&entry));
        assert!(filters.matches_text("Lockfile"));
    }

    #[test]
    fn test_entry_match_needs_active_filters() {
        let filters = FilterSet::new();
        let entry = ProtocolEntry::new(0.0, 1, EntryType::Created).with_info("anything");
        assert!(!filters.matches_entry(&entry));

        let bare = ProtocolEntry::new(0.0, 1, EntryType::Created);
        let mut filters = FilterSet::new();
        filters.add("x");
        assert!(!filters.matches_entry(&bare));
    }

    #[test]
    fn test_empty_tags_are_ignored() {
        let mut filters = FilterSet::new();
        filters.add("");
        assert!(!filters.is_active());
        assert_eq!(filters.remove(3), None);
    }

    #[test]
    fn test_detail_threshold() {
        assert!(is_detailed(99, 100));
        assert!(!is_detailed(100, 100));
    }
}
