//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, storage and report derivation into use-case APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod activity_service;
