use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::TimelineConfig;
use crate::trace::{EntryType, ProtocolEntry};

/// Lockers with fewer entries than this are noise and get no track
const MIN_TRACK_ENTRIES: usize = 3;

/// Number of leading characters of an event id shown in a label
const EVENT_ID_PREFIX: usize = 8;

/// Label of a track that repeats an already placed transaction
pub const MERGED_LABEL: &str = "**";

/// One actor's activity, laid out on a lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockerInfo {
    pub id: u64,
    /// Short description taken from the first entry
    pub info: String,
    /// Text drawn next to the bar; `**` for a repeated transaction
    pub label: String,
    /// Display lane
    pub row: usize,
    /// Whether the track contains a detected deadlock
    pub warn: bool,
    pub begin: f64,
    pub end: f64,
    /// Entries of this actor, sorted by time
    pub protocol: Vec<ProtocolEntry>,
}

impl LockerInfo {
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }

    pub fn deadlock_entry(&self) -> Option<&ProtocolEntry> {
        self.protocol
            .iter()
            .find(|e| e.entry_type == EntryType::DeadlockDetected)
    }

    /// A release that carries `extraInfo` is an error report
    pub fn is_errored(&self) -> bool {
        self.protocol
            .iter()
            .any(|e| e.entry_type == EntryType::Unlocked && e.extra_info.is_some())
    }

    pub fn is_merged(&self) -> bool {
        self.label == MERGED_LABEL
    }
}

/// All tracks of a trace plus the overall time extent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    pub lockers: Vec<LockerInfo>,
    pub begin: f64,
    pub end: f64,
    /// `end - begin` plus padding
    pub duration: f64,
}

impl Recording {
    pub fn is_empty(&self) -> bool {
        self.lockers.is_empty()
    }

    pub fn locker(&self, id: u64) -> Option<&LockerInfo> {
        self.lockers.iter().find(|l| l.id == id)
    }

    pub fn entry_count(&self) -> usize {
        self.lockers.iter().map(|l| l.protocol.len()).sum()
    }
}

/// Transaction identity optionally encoded as JSON in the first entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionInfo {
    event_id: String,
    event_type: Option<String>,
}

impl TransactionInfo {
    fn parse(info: &str) -> Option<Self> {
        serde_json::from_str(info).ok()
    }

    fn label(&self) -> String {
        let prefix: String = self.event_id.chars().take(EVENT_ID_PREFIX).collect();
        match &self.event_type {
            Some(event_type) => format!("{} {}", prefix, event_type),
            None => prefix,
        }
    }
}

/// Hands out lanes, wrapping around once the viewport is full.
/// Tracks of the same transaction share a lane.
struct LaneAllocator {
    next: usize,
    lane_count: usize,
    transactions: HashMap<String, usize>,
}

impl LaneAllocator {
    fn new(lane_count: usize) -> Self {
        Self {
            next: 0,
            lane_count: lane_count.max(1),
            transactions: HashMap::new(),
        }
    }

    fn fresh(&mut self) -> usize {
        let row = self.next;
        self.next += 1;
        row
    }

    /// Returns the lane and whether the transaction was already placed
    fn for_transaction(&mut self, event_id: &str) -> (usize, bool) {
        if let Some(&row) = self.transactions.get(event_id) {
            return (row, true);
        }
        let row = self.fresh();
        self.transactions.insert(event_id.to_string(), row);
        (row, false)
    }

    fn wrap(&mut self) {
        if self.next >= self.lane_count {
            self.next = 0;
        }
    }
}

/// Group a flat trace into per-locker tracks and lay them out on lanes
pub fn build_recording(entries: &[ProtocolEntry], config: &TimelineConfig) -> Recording {
    let mut lanes = LaneAllocator::new(config.lane_count());

    let lockers: Vec<LockerInfo> = group_by_locker(entries)
        .into_iter()
        .filter(|protocol| protocol.len() >= MIN_TRACK_ENTRIES)
        .map(|protocol| {
            let track = build_track(protocol, &mut lanes);
            lanes.wrap();
            track
        })
        .collect();

    let (begin, end) = if lockers.is_empty() {
        (0.0, config.viewport_width)
    } else {
        let begin = lockers.iter().map(|l| l.begin).fold(f64::INFINITY, f64::min);
        let end = lockers
            .iter()
            .map(|l| l.end)
            .fold(f64::NEG_INFINITY, f64::max);
        (begin, end)
    };

    log::debug!(
        "Built recording: {} entries -> {} tracks on {} lanes, {}..{}ms",
        entries.len(),
        lockers.len(),
        lanes.lane_count,
        begin,
        end
    );

    Recording {
        lockers,
        begin,
        end,
        duration: end - begin + config.duration_padding,
    }
}

/// Group entries by locker id, keeping groups in order of first appearance
fn group_by_locker(entries: &[ProtocolEntry]) -> Vec<Vec<ProtocolEntry>> {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut groups: Vec<Vec<ProtocolEntry>> = Vec::new();

    for entry in entries {
        let slot = *index.entry(entry.locker_id).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(entry.clone());
    }

    groups
}

fn build_track(mut protocol: Vec<ProtocolEntry>, lanes: &mut LaneAllocator) -> LockerInfo {
    protocol.sort_by(|a, b| a.time.total_cmp(&b.time));

    let first = &protocol[0];
    let raw_info = first.extra_info().unwrap_or("");

    let (info, label, row) = match TransactionInfo::parse(raw_info) {
        Some(tx) => {
            let info = tx.label();
            let (row, merged) = lanes.for_transaction(&tx.event_id);
            let label = if merged {
                MERGED_LABEL.to_string()
            } else {
                info.clone()
            };
            (info, label, row)
        }
        None => (raw_info.to_string(), raw_info.to_string(), lanes.fresh()),
    };

    let id = first.locker_id;
    let begin = first.time;
    let end = protocol[protocol.len() - 1].time;
    let warn = protocol
        .iter()
        .any(|e| e.entry_type == EntryType::DeadlockDetected);

    LockerInfo {
        id,
        info,
        label,
        row,
        warn,
        begin,
        end,
        protocol,
    }
}
