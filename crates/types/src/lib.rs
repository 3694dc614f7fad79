//! Shared primitives for the intake integrity workspace.
//!
//! - [`NonEmptyText`]: trimmed text guaranteed to contain at least one non-whitespace character.
//! - The record data model ([`records`]) exchanged between callers, stores and the engine.

pub mod records;

pub use intake_uuid::RecordId;
pub use records::{
    ExistingOrder, ExistingPatientRecord, OrderCandidate, PatientCandidate, ProviderRecord,
};

/// Rejected text input.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("text cannot be empty")]
    Empty,
}

/// Trimmed text with at least one non-whitespace character.
///
/// Used for provider display names, which may never be blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input`, failing with [`TextError::Empty`] if nothing is left.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another piece of text.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}
