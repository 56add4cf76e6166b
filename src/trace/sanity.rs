use nom::{
    IResult, Parser,
    bytes::complete::take_till1,
    character::complete::char,
    sequence::preceded,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::{EntryType, ProtocolEntry};

/// Hash value reported by the lock service when a reader saw no content
const UNDEFINED_HASH: &str = "undefined";

/// A read grant that observed a different hash than the last write grant on
/// the same path
#[derive(Debug, Clone, Serialize)]
pub struct Inconsistency {
    pub path: String,
    /// Hash recorded by the last write grant on `path`
    pub expected_hash: String,
    /// Hash seen by the offending read grant
    pub actual_hash: String,
    pub entry: ProtocolEntry,
}

/// A grant entry the checker could not interpret
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub entry: ProtocolEntry,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SanityReport {
    pub inconsistencies: Vec<Inconsistency>,
    pub skipped: Vec<SkippedEntry>,
    /// Number of lockers with a clean release that were replayed
    pub checked_lockers: usize,
}

impl SanityReport {
    pub fn is_clean(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Replay the trace and report stale reads.
///
/// Only lockers that end in a clean release (an `Unlocked` entry without
/// `extraInfo`) take part. Write grants record the hash per path, read grants
/// are compared against it. Never fails: unparsable grants are skipped.
pub fn check_trace(entries: &[ProtocolEntry]) -> SanityReport {
    let clean_lockers: HashSet<u64> = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Unlocked && e.extra_info.is_none())
        .map(|e| e.locker_id)
        .collect();

    let mut report = SanityReport {
        checked_lockers: clean_lockers.len(),
        ..SanityReport::default()
    };
    let mut last_hash: HashMap<String, String> = HashMap::new();

    for entry in entries {
        if !clean_lockers.contains(&entry.locker_id) {
            continue;
        }
        if !matches!(
            entry.entry_type,
            EntryType::ReadGranted | EntryType::WriteGranted
        ) {
            continue;
        }

        let Some(info) = entry.extra_info() else {
            report.skipped.push(SkippedEntry {
                entry: entry.clone(),
                reason: "grant without extraInfo".to_string(),
            });
            continue;
        };
        let Some((path, hash)) = parse_grant_info(info) else {
            report.skipped.push(SkippedEntry {
                entry: entry.clone(),
                reason: format!("expected \"<path> <hash>\", got {:?}", info),
            });
            continue;
        };

        if entry.entry_type == EntryType::WriteGranted {
            last_hash.insert(path.to_string(), hash.to_string());
            continue;
        }

        if hash == UNDEFINED_HASH {
            continue;
        }
        if let Some(expected) = last_hash.get(path)
            && expected != hash
        {
            log::warn!(
                "invalid hash on {}: expected {}, got {} (locker {} at {}ms)",
                path,
                expected,
                hash,
                entry.locker_id,
                entry.time
            );
            report.inconsistencies.push(Inconsistency {
                path: path.to_string(),
                expected_hash: expected.clone(),
                actual_hash: hash.to_string(),
                entry: entry.clone(),
            });
        }
    }

    log::debug!(
        "Sanity check: {} lockers, {} inconsistencies, {} skipped",
        report.checked_lockers,
        report.inconsistencies.len(),
        report.skipped.len()
    );
    report
}

/// Split a grant payload `"<path> <hash>"` into its parts.
/// Anything after the hash is ignored.
pub fn parse_grant_info(info: &str) -> Option<(&str, &str)> {
    path_and_hash(info).ok().map(|(_, parts)| parts)
}

fn path_and_hash(input: &str) -> IResult<&str, (&str, &str)> {
    (token, preceded(char(' '), token)).parse(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == ' ').parse(input)
}
