//! Activity log use-case service.
//!
//! # Responsibility
//! - Provide the AIM/PROGRESS write entry points and the read-side queries.
//! - Run the append protocol (encode, bounded retry) over a repository.
//!
//! # Invariants
//! - Validation always happens before any I/O.
//! - Writes through one service are serialized in call order.
//! - Timestamps issued by one service never go backwards.
//! - Reads never fail for a missing store or malformed lines.

use crate::model::entry::{normalize_note, DayNumber, EntryKind, LogEntry, ProgressReport};
use crate::report::{build_report, summarize_day, ActivityReport, DaySummary};
use crate::repo::codec::{decode_line, encode_entry};
use crate::repo::retry::{run_with_retry, RetryPolicy};
use crate::repo::{
    ActivityLogError, ActivityLogRepository, ActivityLogResult, FileActivityLogRepository,
    StoreConfig,
};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Use-case service over an activity log repository.
pub struct ActivityService<R: ActivityLogRepository> {
    repo: R,
    retry: RetryPolicy,
    clock: Clock,
    // Held for the whole write path; tracks the last issued timestamp.
    write_state: Mutex<Option<DateTime<Utc>>>,
}

impl ActivityService<FileActivityLogRepository> {
    /// Opens a file-backed service from explicit configuration.
    pub fn open(config: &StoreConfig) -> Self {
        Self::new(FileActivityLogRepository::new(&config.path)).with_retry(config.retry)
    }
}

impl<R: ActivityLogRepository> ActivityService<R> {
    /// Creates a service with the default retry policy and the system clock.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            retry: RetryPolicy::default(),
            clock: Box::new(Utc::now),
            write_state: Mutex::new(None),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the time source used for new entries.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Records the AIM note for `day`.
    ///
    /// # Errors
    /// - `Validation` for an empty or oversized note or a non-positive day.
    /// - `Persistence` once every append attempt has failed.
    pub fn record_intent(&self, note: &str, day: i64) -> ActivityLogResult<LogEntry> {
        let result = self.record_intent_inner(note, day);
        match &result {
            Ok(entry) => info!(
                "event=aim_recorded module=activity status=ok day={} chars={}",
                entry.day,
                entry.aim_note().map_or(0, |note| note.chars().count())
            ),
            Err(err) => error!("event=aim_recorded module=activity status=error error={err}"),
        }
        result
    }

    fn record_intent_inner(&self, note: &str, day: i64) -> ActivityLogResult<LogEntry> {
        let note = normalize_note(note)?;
        let day = DayNumber::new(day)?;

        let mut last_timestamp = self.lock_writes();
        let entry = LogEntry::aim(day, note, self.next_timestamp(&mut last_timestamp));
        self.append_entry(&entry)?;
        Ok(entry)
    }

    /// Records the PROGRESS outcome, inferring the day when `day` is `None`.
    ///
    /// # Errors
    /// - `Validation` for an empty summary or a non-positive explicit day.
    /// - `Io` when day inference cannot read the store.
    /// - `Persistence` once every append attempt has failed.
    pub fn record_outcome(
        &self,
        progress: &ProgressReport,
        day: Option<i64>,
    ) -> ActivityLogResult<LogEntry> {
        let result = self.record_outcome_inner(progress, day);
        match &result {
            Ok(entry) => info!(
                "event=progress_recorded module=activity status=ok day={} done={} failed={}",
                entry.day,
                progress.done.len(),
                progress.failed.len()
            ),
            Err(err) => {
                error!("event=progress_recorded module=activity status=error error={err}")
            }
        }
        result
    }

    /// Records a PROGRESS outcome supplied as untyped JSON.
    ///
    /// The shape is validated strictly (see `ProgressReport::from_json`)
    /// before anything is read or written.
    pub fn record_outcome_json(
        &self,
        progress: &Value,
        day: Option<i64>,
    ) -> ActivityLogResult<LogEntry> {
        let report = ProgressReport::from_json(progress).map_err(|err| {
            error!("event=progress_recorded module=activity status=error error={err}");
            ActivityLogError::Validation(err)
        })?;
        self.record_outcome(&report, day)
    }

    fn record_outcome_inner(
        &self,
        progress: &ProgressReport,
        day: Option<i64>,
    ) -> ActivityLogResult<LogEntry> {
        let report = progress.normalized()?;
        let explicit_day = day.map(DayNumber::new).transpose()?;

        let mut last_timestamp = self.lock_writes();
        let day = match explicit_day {
            Some(day) => day,
            None => {
                let inferred = self.current_day()?;
                debug!("event=day_inferred module=activity day={inferred}");
                inferred
            }
        };
        let entry = LogEntry::progress(day, report, self.next_timestamp(&mut last_timestamp));
        self.append_entry(&entry)?;
        Ok(entry)
    }

    /// Day of the most recent AIM entry, or day 1 when there is none.
    pub fn current_day(&self) -> ActivityLogResult<DayNumber> {
        let lines = self.repo.read_lines().map_err(ActivityLogError::Io)?;
        let day = lines
            .iter()
            .rev()
            .filter_map(|line| decode_line(line))
            .find(|entry| entry.kind() == EntryKind::Aim)
            .map_or(DayNumber::FIRST, |entry| entry.day);
        Ok(day)
    }

    /// All decodable entries in store order.
    pub fn read_all(&self) -> ActivityLogResult<Vec<LogEntry>> {
        let lines = self.repo.read_lines().map_err(ActivityLogError::Io)?;
        let entries: Vec<LogEntry> = lines.iter().filter_map(|line| decode_line(line)).collect();
        let skipped = lines.iter().filter(|line| !line.trim().is_empty()).count() - entries.len();
        if skipped > 0 {
            debug!(
                "event=read_all module=activity status=partial entries={} skipped={skipped} store={}",
                entries.len(),
                self.repo.location()
            );
        }
        Ok(entries)
    }

    /// Summary of a single day; empty when nothing was recorded for it.
    pub fn summarize_day(&self, day: i64) -> ActivityLogResult<DaySummary> {
        let day = DayNumber::new(day)?;
        let entries = self.read_all()?;
        Ok(summarize_day(&entries, day))
    }

    /// Cross-day report derived from `read_all`.
    pub fn summarize_all(&self) -> ActivityLogResult<ActivityReport> {
        let entries = self.read_all()?;
        Ok(build_report(&entries))
    }

    fn append_entry(&self, entry: &LogEntry) -> ActivityLogResult<()> {
        let line = encode_entry(entry)?;
        run_with_retry(&self.retry, "append_entry", |_| self.repo.append_line(&line)).map_err(
            |exhausted| ActivityLogError::Persistence {
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            },
        )
    }

    fn lock_writes(&self) -> MutexGuard<'_, Option<DateTime<Utc>>> {
        self.write_state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_timestamp(&self, last: &mut Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = (self.clock)();
        let timestamp = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(timestamp);
        timestamp
    }
}
