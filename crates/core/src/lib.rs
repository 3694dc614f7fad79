//! # Intake Core
//!
//! Data-integrity checks run by the intake application before it commits a record:
//! - provider identifier checksum and diagnosis code grammar ([`validation`])
//! - trigram similarity ([`similarity`])
//! - duplicate patient and order detection ([`detector`])
//! - provider upsert-by-identifier with conflict reporting ([`resolver`])
//!
//! Results are advisory [`Warning`] values. The engine reads committed records through the
//! caller's [`RecordStore`] and never writes to it.
//!
//! **No API concerns**: HTTP handlers, persistence and transactions belong to the caller.

pub mod config;
pub mod constants;
pub mod detector;
pub mod error;
pub mod normalize;
pub mod resolver;
pub mod screen;
pub mod similarity;
pub mod store;
pub mod validation;
pub mod warning;

pub use config::{DetectionConfig, DetectionSettings, EnvOverrides, ScoreWeights};
pub use detector::{DuplicateDetector, PatientMatches};
pub use error::{IntegrityError, IntegrityResult, StoreError};
pub use resolver::{ConflictResolver, ProviderOutcome, ProviderResolution};
pub use screen::IntakeScreen;
pub use similarity::{similarity, TrigramSet};
pub use store::{InMemoryStore, RecordStore, StoreResult};
pub use validation::{
    format_code, validate_code, validate_identifier, DiagnosisCode, DiagnosisCodeError,
    ProviderIdError, ProviderIdentifier,
};
pub use warning::{Severity, Warning};

pub use intake_types::{
    ExistingOrder, ExistingPatientRecord, NonEmptyText, OrderCandidate, PatientCandidate,
    ProviderRecord, TextError,
};
pub use intake_uuid::RecordId;
