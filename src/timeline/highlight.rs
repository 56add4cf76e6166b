use super::LockerInfo;

/// Lockers highlighted while the pointer rests on a deadlocked track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    lockers: Vec<u64>,
}

impl Highlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer entered a track. A warn track replaces the highlight set with
    /// the lockers of its deadlock cycle; other tracks leave it alone.
    pub fn enter(&mut self, locker: &LockerInfo) {
        if !locker.warn {
            return;
        }
        self.lockers = locker
            .deadlock_entry()
            .and_then(|e| e.conflicting_lockers.clone())
            .unwrap_or_default();
        log::debug!(
            "Highlighting lockers {:?} from locker {}",
            self.lockers,
            locker.id
        );
    }

    /// Pointer left a track
    pub fn leave(&mut self) {
        self.lockers.clear();
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lockers.contains(&id)
    }

    pub fn lockers(&self) -> &[u64] {
        &self.lockers
    }

    pub fn is_empty(&self) -> bool {
        self.lockers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::timeline::build_recording;
    use crate::trace::{EntryType, ProtocolEntry};

    fn deadlocked(id: u64, conflicts: Vec<u64>) -> Vec<ProtocolEntry> {
        vec![
            ProtocolEntry::new(0.0, id, EntryType::RequestWrite),
            ProtocolEntry::new(5.0, id, EntryType::DeadlockDetected).with_conflicts(conflicts),
            ProtocolEntry::new(9.0, id, EntryType::DeadlockResolved),
        ]
    }

    #[test]
    fn test_enter_and_leave() {
        let mut entries = deadlocked(1, vec![1, 4]);
        entries.extend(deadlocked(2, vec![2, 7]));
        let recording = build_recording(&entries, &TimelineConfig::default());
        let mut highlight = Highlight::new();

        highlight.enter(recording.locker(1).unwrap());
        assert_eq!(highlight.lockers(), &[1, 4]);
        assert!(highlight.contains(4));

        highlight.enter(recording.locker(2).unwrap());
        assert_eq!(highlight.lockers(), &[2, 7]);
        assert!(!highlight.contains(4));

        highlight.leave();
        assert!(highlight.is_empty());
    }

    #[test]
    fn test_calm_track_does_not_highlight() {
        let entries = vec![
            ProtocolEntry::new(0.0, 3, EntryType::Created),
            ProtocolEntry::new(1.0, 3, EntryType::ReadGranted),
            ProtocolEntry::new(2.0, 3, EntryType::Unlocked),
        ];
        let recording = build_recording(&entries, &TimelineConfig::default());
        let mut highlight = Highlight::new();

        highlight.enter(recording.locker(3).unwrap());
        assert!(highlight.is_empty());
    }

    #[test]
    fn test_deadlock_without_conflicts_clears() {
        let entries = vec![
            ProtocolEntry::new(0.0, 5, EntryType::Created),
            ProtocolEntry::new(1.0, 5, EntryType::DeadlockDetected),
            ProtocolEntry::new(2.0, 5, EntryType::Unlocked),
        ];
        let recording = build_recording(&entries, &TimelineConfig::default());
        let mut highlight = Highlight { lockers: vec![9] };

        highlight.enter(recording.locker(5).unwrap());
        assert!(highlight.is_empty());
    }
}
