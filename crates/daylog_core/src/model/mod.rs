//! Activity log domain model.
//!
//! # Responsibility
//! - Define the canonical AIM/PROGRESS entry shape shared by store and report.
//! - Keep validation rules next to the types they protect.
//!
//! # Invariants
//! - Entries are append-only; there is no update or delete representation.
//! - Day numbers are logical session ids, never calendar dates.

pub mod entry;
