//! Activity log entry model.
//!
//! # Responsibility
//! - Define the canonical record appended for AIM and PROGRESS events.
//! - Own input validation for both write paths.
//!
//! # Invariants
//! - `DayNumber` is always >= 1.
//! - AIM notes are trimmed, non-empty and at most `MAX_NOTE_CHARS` chars.
//! - PROGRESS summaries are trimmed and non-empty.
//! - Entries are never mutated after they are appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum AIM note length, counted in chars after trimming.
pub const MAX_NOTE_CHARS: usize = 1000;

/// Stable identifier assigned to an entry at write time.
pub type EntryId = Uuid;

/// Validation error for caller-supplied entry input.
///
/// Always raised before any storage I/O is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// AIM note is empty after trimming.
    EmptyNote,
    /// AIM note exceeds the allowed length.
    NoteTooLong { chars: usize, max: usize },
    /// Day number is not a positive `u32`.
    InvalidDay(i64),
    /// PROGRESS summary is empty after trimming.
    EmptySummary,
    /// Loose PROGRESS input is not a JSON object.
    NotAnObject,
    /// Loose PROGRESS input misses a required key.
    MissingField(&'static str),
    /// Loose PROGRESS input has a field of the wrong type.
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "AIM note cannot be empty"),
            Self::NoteTooLong { chars, max } => {
                write!(f, "AIM note cannot exceed {max} characters (got {chars})")
            }
            Self::InvalidDay(day) => write!(f, "day number must be a positive integer, got {day}"),
            Self::EmptySummary => write!(f, "progress summary cannot be empty"),
            Self::NotAnObject => write!(f, "progress details must be an object"),
            Self::MissingField(field) => {
                write!(f, "progress details missing required key: {field}")
            }
            Self::InvalidFieldType { field, expected } => {
                write!(f, "progress details `{field}` must be {expected}")
            }
        }
    }
}

impl Error for EntryValidationError {}

/// Logical work-session identifier. Not a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct DayNumber(u32);

impl DayNumber {
    /// The day used when nothing else is known.
    pub const FIRST: DayNumber = DayNumber(1);

    /// Validates a raw day value.
    pub fn new(value: i64) -> Result<Self, EntryValidationError> {
        match u32::try_from(value) {
            Ok(day) if day >= 1 => Ok(Self(day)),
            _ => Err(EntryValidationError::InvalidDay(value)),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for DayNumber {
    type Error = EntryValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayNumber> for u32 {
    fn from(value: DayNumber) -> Self {
        value.0
    }
}

impl Display for DayNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry category. Serialized in upper case to match existing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Intent recorded at the start of a session.
    #[serde(rename = "AIM")]
    Aim,
    /// Outcome recorded at the end of a session.
    #[serde(rename = "PROGRESS")]
    Progress,
}

/// End-of-session outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Completed task labels.
    pub done: Vec<String>,
    /// Failed task labels.
    pub failed: Vec<String>,
    /// Free-text reflection. Older stores wrote this as `grateful`.
    #[serde(alias = "grateful")]
    pub summary: String,
}

impl ProgressReport {
    pub fn new(done: Vec<String>, failed: Vec<String>, summary: impl Into<String>) -> Self {
        Self {
            done,
            failed,
            summary: summary.into(),
        }
    }

    /// Builds a report from untyped input, validating its shape strictly.
    ///
    /// # Errors
    /// - `NotAnObject` when `value` is not a JSON object.
    /// - `MissingField` when `done`, `failed` or `summary` is absent.
    /// - `InvalidFieldType` when arrays hold non-strings or `summary` is not a string.
    /// - `EmptySummary` when `summary` trims to nothing.
    pub fn from_json(value: &Value) -> Result<Self, EntryValidationError> {
        let object = value.as_object().ok_or(EntryValidationError::NotAnObject)?;
        for key in ["done", "failed", "summary"] {
            if !object.contains_key(key) {
                return Err(EntryValidationError::MissingField(key));
            }
        }

        let done = string_array(&object["done"], "done")?;
        let failed = string_array(&object["failed"], "failed")?;
        let summary = object["summary"]
            .as_str()
            .ok_or(EntryValidationError::InvalidFieldType {
                field: "summary",
                expected: "a string",
            })?;

        let report = Self::new(done, failed, summary);
        report.normalized()
    }

    /// Returns a copy with a trimmed summary, rejecting an empty one.
    pub fn normalized(&self) -> Result<Self, EntryValidationError> {
        let summary = self.summary.trim();
        if summary.is_empty() {
            return Err(EntryValidationError::EmptySummary);
        }
        Ok(Self {
            done: self.done.clone(),
            failed: self.failed.clone(),
            summary: summary.to_string(),
        })
    }
}

fn string_array(value: &Value, field: &'static str) -> Result<Vec<String>, EntryValidationError> {
    let invalid = EntryValidationError::InvalidFieldType {
        field,
        expected: "an array of strings",
    };
    let items = value.as_array().ok_or_else(|| invalid.clone())?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid.clone()))
        .collect()
}

/// Trims and validates an AIM note.
pub fn normalize_note(note: &str) -> Result<String, EntryValidationError> {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        return Err(EntryValidationError::EmptyNote);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_NOTE_CHARS {
        return Err(EntryValidationError::NoteTooLong {
            chars,
            max: MAX_NOTE_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Kind-specific entry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPayload {
    Aim(String),
    Progress(ProgressReport),
}

impl EntryPayload {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Aim(_) => EntryKind::Aim,
            Self::Progress(_) => EntryKind::Progress,
        }
    }
}

/// One appended activity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// `None` for lines written by tools that did not assign ids.
    pub id: Option<EntryId>,
    pub timestamp: DateTime<Utc>,
    pub day: DayNumber,
    pub payload: EntryPayload,
}

impl LogEntry {
    /// Creates an AIM entry with a fresh id. `note` must already be normalized.
    pub fn aim(day: DayNumber, note: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            timestamp,
            day,
            payload: EntryPayload::Aim(note),
        }
    }

    /// Creates a PROGRESS entry with a fresh id. `report` must already be normalized.
    pub fn progress(day: DayNumber, report: ProgressReport, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            timestamp,
            day,
            payload: EntryPayload::Progress(report),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.payload.kind()
    }

    pub fn aim_note(&self) -> Option<&str> {
        match &self.payload {
            EntryPayload::Aim(note) => Some(note.as_str()),
            EntryPayload::Progress(_) => None,
        }
    }

    pub fn progress_report(&self) -> Option<&ProgressReport> {
        match &self.payload {
            EntryPayload::Progress(report) => Some(report),
            EntryPayload::Aim(_) => None,
        }
    }
}
