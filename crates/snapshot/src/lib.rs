//! Record-store snapshot wire format.
//!
//! A snapshot is a YAML document holding committed patients, orders and providers. It lets
//! the command line (and tests) hand the detection engine a store without a database.
//!
//! This crate focuses on:
//! - strict serialisation/deserialisation (unknown keys are rejected)
//! - translation between the wire structs and the shared record types
//!
//! Nothing here performs detection; see `intake-core` for that.

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotData};

/// Errors returned by the `intake-snapshot` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`SnapshotError`].
pub type SnapshotResult<T> = Result<T, SnapshotError>;
