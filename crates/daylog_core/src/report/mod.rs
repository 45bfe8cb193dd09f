//! Read-side summaries derived from decoded entries.
//!
//! # Responsibility
//! - Build per-day summaries and the cross-day activity report.
//!
//! # Invariants
//! - Every function here is pure over its `&[LogEntry]` input.
//! - Per-day fields take the first AIM / first PROGRESS in store order.
//! - Task totals count every PROGRESS entry, not only the first per day.
//! - Days sort numerically.

use crate::model::entry::{DayNumber, EntryKind, LogEntry, ProgressReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of trailing entries listed in `ActivityReport::recent_activity`.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Summary of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: DayNumber,
    pub aim_note: Option<String>,
    pub progress: Option<ProgressReport>,
    pub entry_count: usize,
    pub time_range: Option<TimeRange>,
}

/// One day of the cross-day report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    #[serde(flatten)]
    pub summary: DaySummary,
    pub aim_entries: usize,
    pub progress_entries: usize,
    /// A PROGRESS was recorded before any AIM for the same day.
    pub incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    pub total_entries: usize,
    pub total_days: usize,
    pub days_with_aim: usize,
    pub days_with_progress: usize,
    pub aim_coverage_pct: f64,
    pub progress_coverage_pct: f64,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    /// `completed / (completed + failed) * 100`, or 0 with no tasks.
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub timestamp: DateTime<Utc>,
    pub day: DayNumber,
    pub kind: EntryKind,
    pub done_count: usize,
    pub failed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub days: Vec<DayReport>,
    pub stats: ReportStats,
    pub recent_activity: Vec<RecentActivity>,
}

/// Summarizes the entries recorded for `day`.
///
/// Returns an empty summary (no note, no progress, zero count, no range)
/// when nothing matches.
pub fn summarize_day(entries: &[LogEntry], day: DayNumber) -> DaySummary {
    let matching: Vec<&LogEntry> = entries.iter().filter(|entry| entry.day == day).collect();
    summarize_matching(day, &matching)
}

fn summarize_matching(day: DayNumber, matching: &[&LogEntry]) -> DaySummary {
    let aim_note = matching
        .iter()
        .find_map(|entry| entry.aim_note())
        .map(str::to_string);
    let progress = matching
        .iter()
        .find_map(|entry| entry.progress_report())
        .cloned();
    let time_range = match (matching.first(), matching.last()) {
        (Some(first), Some(last)) => Some(TimeRange {
            start: first.timestamp,
            end: last.timestamp,
        }),
        _ => None,
    };

    DaySummary {
        day,
        aim_note,
        progress,
        entry_count: matching.len(),
        time_range,
    }
}

/// Builds the cross-day report.
pub fn build_report(entries: &[LogEntry]) -> ActivityReport {
    let mut by_day: BTreeMap<DayNumber, Vec<&LogEntry>> = BTreeMap::new();
    for entry in entries {
        by_day.entry(entry.day).or_default().push(entry);
    }

    let days: Vec<DayReport> = by_day
        .iter()
        .map(|(day, matching)| {
            let aim_entries = count_kind(matching, EntryKind::Aim);
            let progress_entries = count_kind(matching, EntryKind::Progress);
            DayReport {
                summary: summarize_matching(*day, matching),
                aim_entries,
                progress_entries,
                incomplete: progress_precedes_aim(matching),
            }
        })
        .collect();

    let (completed_tasks, failed_tasks) = entries
        .iter()
        .filter_map(LogEntry::progress_report)
        .fold((0, 0), |(done, failed), report| {
            (done + report.done.len(), failed + report.failed.len())
        });

    let total_days = days.len();
    let days_with_aim = days.iter().filter(|day| day.aim_entries > 0).count();
    let days_with_progress = days.iter().filter(|day| day.progress_entries > 0).count();

    let stats = ReportStats {
        total_entries: entries.len(),
        total_days,
        days_with_aim,
        days_with_progress,
        aim_coverage_pct: percentage(days_with_aim, total_days),
        progress_coverage_pct: percentage(days_with_progress, total_days),
        completed_tasks,
        failed_tasks,
        success_rate: percentage(completed_tasks, completed_tasks + failed_tasks),
    };

    let recent_start = entries.len().saturating_sub(RECENT_ACTIVITY_LIMIT);
    let recent_activity = entries[recent_start..]
        .iter()
        .map(|entry| {
            let (done_count, failed_count) = entry
                .progress_report()
                .map_or((0, 0), |report| (report.done.len(), report.failed.len()));
            RecentActivity {
                timestamp: entry.timestamp,
                day: entry.day,
                kind: entry.kind(),
                done_count,
                failed_count,
            }
        })
        .collect();

    ActivityReport {
        days,
        stats,
        recent_activity,
    }
}

fn progress_precedes_aim(entries: &[&LogEntry]) -> bool {
    let first_of = |kind: EntryKind| entries.iter().position(|entry| entry.kind() == kind);
    match (first_of(EntryKind::Progress), first_of(EntryKind::Aim)) {
        (Some(progress), Some(aim)) => progress < aim,
        (Some(_), None) => true,
        _ => false,
    }
}

fn count_kind(entries: &[&LogEntry], kind: EntryKind) -> usize {
    entries.iter().filter(|entry| entry.kind() == kind).count()
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::{build_report, percentage, summarize_day, RECENT_ACTIVITY_LIMIT};
    use crate::model::entry::{DayNumber, LogEntry, ProgressReport};
    use chrono::{TimeZone, Utc};

    fn day(value: i64) -> DayNumber {
        DayNumber::new(value).unwrap()
    }

    fn aim(d: i64, secs: i64, note: &str) -> LogEntry {
        LogEntry::aim(day(d), note.to_string(), Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn progress(d: i64, secs: i64, done: usize, failed: usize) -> LogEntry {
        let report = ProgressReport::new(
            (0..done).map(|i| format!("done-{i}")).collect(),
            (0..failed).map(|i| format!("failed-{i}")).collect(),
            "reflection",
        );
        LogEntry::progress(day(d), report, Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn percentage_never_divides_by_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(6, 8), 75.0);
    }

    #[test]
    fn summarize_day_takes_first_entries_and_full_range() {
        let entries = vec![
            aim(1, 10, "first aim"),
            aim(2, 11, "other day"),
            aim(1, 12, "second aim"),
            progress(1, 13, 1, 0),
            progress(1, 14, 5, 5),
        ];

        let summary = summarize_day(&entries, day(1));
        assert_eq!(summary.aim_note.as_deref(), Some("first aim"));
        assert_eq!(summary.progress.unwrap().done.len(), 1);
        assert_eq!(summary.entry_count, 4);
        let range = summary.time_range.unwrap();
        assert_eq!(range.start.timestamp(), 10);
        assert_eq!(range.end.timestamp(), 14);
    }

    #[test]
    fn report_sorts_days_numerically_and_flags_incomplete_days() {
        let entries = vec![
            aim(10, 1, "ten"),
            progress(9, 2, 1, 0),
            aim(2, 3, "two"),
            progress(2, 4, 2, 1),
        ];

        let report = build_report(&entries);
        let order: Vec<u32> = report.days.iter().map(|d| d.summary.day.get()).collect();
        assert_eq!(order, vec![2, 9, 10]);

        assert!(!report.days[0].incomplete);
        assert!(report.days[1].incomplete);
        assert!(!report.days[2].incomplete);
        assert_eq!(report.stats.days_with_aim, 2);
        assert_eq!(report.stats.days_with_progress, 2);
    }

    #[test]
    fn progress_recorded_before_its_aim_is_incomplete() {
        let entries = vec![progress(1, 1, 1, 0), aim(1, 2, "late aim"), aim(2, 3, "on time")];
        let report = build_report(&entries);

        assert!(report.days[0].incomplete);
        assert_eq!(report.days[0].aim_entries, 1);
        assert_eq!(report.days[0].summary.aim_note.as_deref(), Some("late aim"));
        assert!(!report.days[1].incomplete);
    }

    #[test]
    fn recent_activity_keeps_last_entries_in_order() {
        let entries: Vec<LogEntry> = (0..15).map(|i| progress(1, i, 1, 0)).collect();
        let report = build_report(&entries);

        assert_eq!(report.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(report.recent_activity[0].timestamp.timestamp(), 5);
        assert_eq!(report.recent_activity[9].timestamp.timestamp(), 14);
        assert_eq!(report.recent_activity[9].done_count, 1);
    }
}
