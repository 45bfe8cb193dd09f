//! Core logic for daylog, a day-keyed activity log.
//! This crate is the single source of truth for entry invariants.

pub mod logging;
pub mod model;
pub mod report;
pub mod service;
pub mod repo;

pub use logging::{init_logging, logging_status, LogLevel, LoggingConfig, LoggingError};
pub use model::entry::{
    DayNumber, EntryId, EntryKind, EntryPayload, EntryValidationError, LogEntry, ProgressReport,
    MAX_NOTE_CHARS,
};
pub use report::{ActivityReport, DayReport, DaySummary, RecentActivity, ReportStats, TimeRange};
pub use service::activity_service::ActivityService;
pub use repo::retry::RetryPolicy;
pub use repo::{
    ActivityLogError, ActivityLogRepository, ActivityLogResult, FileActivityLogRepository,
    StoreConfig, DEFAULT_STORE_PATH,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
