mod inspect;
mod sanity;
mod types;

pub use inspect::format_track;
pub use sanity::{Inconsistency, SanityReport, SkippedEntry, check_trace, parse_grant_info};
pub use types::*;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// MIME type accepted for dropped trace files
pub const JSON_MIME: &str = "application/json";

/// Errors that can occur while loading a trace
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Invalid trace JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown entry type: {0}")]
    UnknownEntryType(u64),

    #[error("Unknown entry type name: {0}")]
    UnknownEntryName(String),

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },
}

/// Result type for trace operations
pub type TraceResult<T> = Result<T, TraceError>;

/// Where the current trace came from, so it can be read again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceSource {
    File(PathBuf),
    Stdin,
}

impl TraceSource {
    /// `-` means stdin, anything else is a path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            TraceSource::Stdin
        } else {
            TraceSource::File(PathBuf::from(arg))
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            TraceSource::File(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string()),
            TraceSource::Stdin => "stdin".to_string(),
        }
    }

    pub fn read_text(&self) -> TraceResult<String> {
        match self {
            TraceSource::File(path) => read_trace_text(path),
            TraceSource::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|e| TraceError::Io {
                        path: "stdin".to_string(),
                        message: e.to_string(),
                    })?;
                Ok(text)
            }
        }
    }
}

/// Parse a trace: a JSON array of protocol entries
pub fn parse_trace(text: &str) -> TraceResult<Vec<ProtocolEntry>> {
    Ok(serde_json::from_str(text)?)
}

fn read_trace_text(path: &Path) -> TraceResult<String> {
    fs::read_to_string(path).map_err(|e| TraceError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read and parse a trace file
pub fn load_trace_file(path: impl AsRef<Path>) -> TraceResult<Vec<ProtocolEntry>> {
    parse_trace(&read_trace_text(path.as_ref())?)
}

/// Guess the MIME type of a dropped file from its extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Some(JSON_MIME),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace_array() {
        let text = r#"[
            {"time": 0, "lockerId": 1, "type": 10},
            {"time": 5, "lockerId": 1, "type": 3, "extraInfo": "/a h1"}
        ]"#;
        let entries = parse_trace(text).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].entry_type, EntryType::WriteGranted);
    }

    #[test]
    fn test_parse_trace_rejects_object() {
        let err = parse_trace(r#"{"time": 0}"#).unwrap_err();
        assert!(matches!(err, TraceError::Json(_)));
    }

    #[test]
    fn test_source_from_arg() {
        assert_eq!(TraceSource::from_arg("-"), TraceSource::Stdin);
        assert_eq!(
            TraceSource::from_arg("/tmp/trace.json").display_name(),
            "trace.json"
        );
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/b.JSON")), Some(JSON_MIME));
        assert_eq!(mime_for_path(Path::new("a/b.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }
}
