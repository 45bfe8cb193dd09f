use daylog_core::{ActivityService, EntryKind, FileActivityLogRepository, ProgressReport, StoreConfig};
use tempfile::TempDir;

fn open_service(dir: &TempDir) -> ActivityService<FileActivityLogRepository> {
    ActivityService::open(&StoreConfig::new(dir.path().join("activity.log")))
}

fn tasks(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}-{i}")).collect()
}

#[test]
fn success_rate_is_percentage_of_completed_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_service(&dir);

    service.record_intent("day one", 1).unwrap();
    service
        .record_outcome(&ProgressReport::new(tasks("d", 4), tasks("f", 1), "ok"), None)
        .unwrap();
    service.record_intent("day two", 2).unwrap();
    service
        .record_outcome(&ProgressReport::new(tasks("d", 2), tasks("f", 1), "ok"), None)
        .unwrap();

    let report = service.summarize_all().unwrap();
    assert_eq!(report.stats.completed_tasks, 6);
    assert_eq!(report.stats.failed_tasks, 2);
    assert_eq!(report.stats.success_rate, 75.0);
    assert_eq!(report.stats.total_days, 2);
    assert_eq!(report.stats.total_entries, 4);
}

#[test]
fn success_rate_is_zero_without_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_service(&dir);

    let empty = service.summarize_all().unwrap();
    assert_eq!(empty.stats.success_rate, 0.0);
    assert_eq!(empty.stats.total_days, 0);
    assert_eq!(empty.stats.aim_coverage_pct, 0.0);
    assert!(empty.days.is_empty());
    assert!(empty.recent_activity.is_empty());

    service
        .record_outcome(&ProgressReport::new(Vec::new(), Vec::new(), "quiet day"), Some(1))
        .unwrap();
    let report = service.summarize_all().unwrap();
    assert_eq!(report.stats.success_rate, 0.0);
}

#[test]
fn days_sort_numerically_with_per_day_counts() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_service(&dir);

    service.record_intent("ten", 10).unwrap();
    service.record_intent("nine", 9).unwrap();
    service
        .record_outcome(&ProgressReport::new(tasks("d", 1), Vec::new(), "a"), Some(10))
        .unwrap();
    service
        .record_outcome(&ProgressReport::new(tasks("d", 2), Vec::new(), "b"), Some(10))
        .unwrap();
    service
        .record_outcome(&ProgressReport::new(Vec::new(), Vec::new(), "orphan"), Some(3))
        .unwrap();

    let report = service.summarize_all().unwrap();
    let days: Vec<u32> = report.days.iter().map(|day| day.summary.day.get()).collect();
    assert_eq!(days, vec![3, 9, 10]);

    let ten = &report.days[2];
    assert_eq!(ten.aim_entries, 1);
    assert_eq!(ten.progress_entries, 2);
    assert_eq!(ten.summary.entry_count, 3);
    assert_eq!(ten.summary.progress.as_ref().unwrap().summary, "a");
    assert!(!ten.incomplete);

    assert!(report.days[0].incomplete);
    assert_eq!(report.stats.days_with_aim, 2);
    assert_eq!(report.stats.days_with_progress, 2);
    assert_eq!(report.stats.completed_tasks, 3);

    let last = report.recent_activity.last().unwrap();
    assert_eq!(last.kind, EntryKind::Progress);
    assert_eq!(last.day.get(), 3);
}

#[test]
fn report_is_rederivable_from_read_all() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_service(&dir);
    service.record_intent("aim", 1).unwrap();
    service
        .record_outcome(&ProgressReport::new(tasks("d", 1), tasks("f", 1), "s"), None)
        .unwrap();

    let from_service = service.summarize_all().unwrap();
    let from_entries = daylog_core::report::build_report(&service.read_all().unwrap());
    assert_eq!(from_service, from_entries);
}

#[test]
fn report_serializes_with_snake_case_fields() {
    let dir = tempfile::tempdir().unwrap();
    let service = open_service(&dir);
    service.record_intent("aim", 1).unwrap();

    let json = serde_json::to_value(service.summarize_all().unwrap()).unwrap();
    assert_eq!(json["days"][0]["day"], 1);
    assert_eq!(json["days"][0]["aim_note"], "aim");
    assert!(json["days"][0]["progress"].is_null());
    assert_eq!(json["stats"]["days_with_aim"], 1);
    assert_eq!(json["recent_activity"][0]["kind"], "AIM");
}
