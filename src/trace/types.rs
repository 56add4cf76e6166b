use serde::{Deserialize, Serialize};
use std::fmt;

use super::TraceError;

/// Kind of a lock-protocol event.
///
/// The discriminants are the wire values used by the lock service, so the
/// order of the variants must not change.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEntryType", into = "u8")]
pub enum EntryType {
    RequestRead,
    RequestWrite,
    ReadGranted,
    WriteGranted,
    ReadReleased,
    WriteReleased,
    RequestRejected,
    DeadlockDetected,
    DeadlockResolved,
    Unlocked,
    Created,
}

impl EntryType {
    /// Number of variants, the length of any per-type lookup table
    pub const COUNT: usize = 11;

    pub const ALL: [EntryType; Self::COUNT] = [
        EntryType::RequestRead,
        EntryType::RequestWrite,
        EntryType::ReadGranted,
        EntryType::WriteGranted,
        EntryType::ReadReleased,
        EntryType::WriteReleased,
        EntryType::RequestRejected,
        EntryType::DeadlockDetected,
        EntryType::DeadlockResolved,
        EntryType::Unlocked,
        EntryType::Created,
    ];

    /// Position of this variant in a per-type lookup table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EntryType::RequestRead => "RequestRead",
            EntryType::RequestWrite => "RequestWrite",
            EntryType::ReadGranted => "ReadGranted",
            EntryType::WriteGranted => "WriteGranted",
            EntryType::ReadReleased => "ReadReleased",
            EntryType::WriteReleased => "WriteReleased",
            EntryType::RequestRejected => "RequestRejected",
            EntryType::DeadlockDetected => "DeadlockDetected",
            EntryType::DeadlockResolved => "DeadlockResolved",
            EntryType::Unlocked => "Unlocked",
            EntryType::Created => "Created",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<EntryType> for u8 {
    fn from(value: EntryType) -> Self {
        value as u8
    }
}

impl TryFrom<u64> for EntryType {
    type Error = TraceError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(TraceError::UnknownEntryType(value))
    }
}

/// `type` as it appears on the wire: the numeric discriminant, or the
/// variant name for hand-written traces.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntryType {
    Index(u64),
    Name(String),
}

impl TryFrom<RawEntryType> for EntryType {
    type Error = TraceError;

    fn try_from(value: RawEntryType) -> Result<Self, Self::Error> {
        match value {
            RawEntryType::Index(idx) => EntryType::try_from(idx),
            RawEntryType::Name(name) => {
                EntryType::from_name(&name).ok_or(TraceError::UnknownEntryName(name))
            }
        }
    }
}

/// A single event of the lock protocol trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolEntry {
    /// Timestamp in milliseconds
    pub time: f64,

    /// The actor (locker) this event belongs to
    pub locker_id: u64,

    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Free-form payload. Grant events carry `"<path> <hash>"`, the first
    /// entry of a transaction track may carry a JSON object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,

    /// Actors involved in a detected deadlock cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_lockers: Option<Vec<u64>>,
}

impl ProtocolEntry {
    pub fn new(time: f64, locker_id: u64, entry_type: EntryType) -> Self {
        Self {
            time,
            locker_id,
            entry_type,
            extra_info: None,
            conflicting_lockers: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.extra_info = Some(info.into());
        self
    }

    pub fn with_conflicts(mut self, lockers: Vec<u64>) -> Self {
        self.conflicting_lockers = Some(lockers);
        self
    }

    pub fn extra_info(&self) -> Option<&str> {
        self.extra_info.as_deref()
    }
}
