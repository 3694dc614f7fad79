//! Record identifier utilities.
//!
//! Committed patients and orders are addressed by a *canonical* UUID representation:
//! **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides a small wrapper type ([`RecordId`]) that *guarantees* the canonical
//! format once constructed.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! - Canonical form is *required* for externally supplied identifiers (for example, from CLI
//!   arguments or snapshot files). Use [`RecordId::parse`] to validate an input string.
//! - Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected.

mod service;

// Re-export public types
pub use service::{RecordId, Uuid};

/// Error type for record identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for record identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
