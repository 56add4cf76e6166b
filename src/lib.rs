pub mod config;
pub mod session;
pub mod timeline;
pub mod trace;
pub mod tui;

pub use config::TimelineConfig;
pub use session::{Session, Summary};
pub use trace::{EntryType, ProtocolEntry, TraceError, TraceResult, TraceSource};
