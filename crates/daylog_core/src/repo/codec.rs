//! Line codec for the activity log store.
//!
//! # Responsibility
//! - Encode one `LogEntry` as one self-delimited JSON line.
//! - Decode lines tolerantly, returning `None` for anything unusable.
//!
//! # Invariants
//! - Encoded lines never contain a raw newline.
//! - Decoding never fails loudly; drift from older tools is skipped or aliased.

use crate::model::entry::{DayNumber, EntryId, EntryKind, EntryPayload, LogEntry, ProgressReport};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version written on every new line.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    schema_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EntryId>,
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: EntryKind,
    day: i64,
    note: Value,
}

/// Serializes an entry to a single line without the trailing newline.
pub fn encode_entry(entry: &LogEntry) -> Result<String, serde_json::Error> {
    let note = match &entry.payload {
        EntryPayload::Aim(note) => Value::String(note.clone()),
        EntryPayload::Progress(report) => serde_json::to_value(report)?,
    };
    let record = EntryRecord {
        schema_version: Some(SCHEMA_VERSION),
        id: entry.id,
        timestamp: entry.timestamp,
        kind: entry.kind(),
        day: i64::from(entry.day.get()),
        note,
    };
    serde_json::to_string(&record)
}

/// Decodes one stored line.
///
/// Returns `None` for blank lines, non-JSON, unknown kinds, invalid days,
/// newer schema versions and payloads of the wrong shape.
pub fn decode_line(line: &str) -> Option<LogEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let record: EntryRecord = match serde_json::from_str(trimmed) {
        Ok(record) => record,
        Err(err) => {
            debug!("event=line_skipped module=codec reason=parse error={err}");
            return None;
        }
    };

    if let Some(version) = record.schema_version {
        if version > SCHEMA_VERSION {
            debug!(
                "event=line_skipped module=codec reason=schema_version version={version} supported={SCHEMA_VERSION}"
            );
            return None;
        }
    }

    let day = match DayNumber::new(record.day) {
        Ok(day) => day,
        Err(_) => {
            debug!(
                "event=line_skipped module=codec reason=invalid_day day={}",
                record.day
            );
            return None;
        }
    };

    let payload = match record.kind {
        EntryKind::Aim => match record.note {
            Value::String(note) => EntryPayload::Aim(note),
            _ => {
                debug!("event=line_skipped module=codec reason=aim_payload_shape");
                return None;
            }
        },
        EntryKind::Progress => match serde_json::from_value::<ProgressReport>(record.note) {
            Ok(report) => EntryPayload::Progress(report),
            Err(err) => {
                debug!("event=line_skipped module=codec reason=progress_payload_shape error={err}");
                return None;
            }
        },
    };

    Some(LogEntry {
        id: record.id,
        timestamp: record.timestamp,
        day,
        payload,
    })
}
