//! Identifier and diagnosis-code validation.
//!
//! Both validators are pure and never panic. Their error enums separate *malformed* input
//! (wrong shape) from input that is well formed but semantically invalid (failed checksum,
//! reserved chapter) so callers can word their messages differently: the former is a format
//! mistake, the latter usually a transcription error.

use crate::constants::{PROVIDER_ID_ISSUER_PREFIX, PROVIDER_ID_LEN};
use crate::normalize::{normalize_code, normalize_identifier};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// ============================================================================
// Provider identifier
// ============================================================================

/// Why a provider identifier was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderIdError {
    #[error("provider identifier is empty")]
    Empty,
    #[error("provider identifier must contain only digits")]
    NonNumeric,
    #[error("provider identifier must be 10 digits, got {length}")]
    WrongLength { length: usize },
    #[error("provider identifier failed the check digit test")]
    ChecksumMismatch,
}

impl ProviderIdError {
    /// True when the input had the wrong shape rather than a bad check digit.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ProviderIdError::ChecksumMismatch)
    }
}

/// A provider identifier known to be exactly ten ASCII digits with a valid check digit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderIdentifier(String);

impl ProviderIdentifier {
    /// Normalises and validates `raw`.
    ///
    /// Whitespace and hyphens are stripped first. Remaining characters are checked for
    /// digits, then length, then the check digit: the ten digits are prefixed with the issuer
    /// prefix `80840` and the result must pass the mod-10 (Luhn) test.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProviderIdError`] that applies.
    pub fn parse(raw: &str) -> Result<Self, ProviderIdError> {
        let normalized = normalize_identifier(raw);

        if normalized.is_empty() {
            return Err(ProviderIdError::Empty);
        }

        if !normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProviderIdError::NonNumeric);
        }

        if normalized.len() != PROVIDER_ID_LEN {
            return Err(ProviderIdError::WrongLength {
                length: normalized.len(),
            });
        }

        let prefixed = format!("{PROVIDER_ID_ISSUER_PREFIX}{normalized}");
        if luhn_sum(prefixed.as_bytes()) % 10 != 0 {
            return Err(ProviderIdError::ChecksumMismatch);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a provider identifier.
///
/// # Errors
///
/// See [`ProviderIdentifier::parse`].
pub fn validate_identifier(raw: &str) -> Result<(), ProviderIdError> {
    ProviderIdentifier::parse(raw).map(|_| ())
}

/// Mod-10 sum, doubling every second digit counted from the right.
///
/// Caller guarantees `digits` holds ASCII digits only.
fn luhn_sum(digits: &[u8]) -> u32 {
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum()
}

// ============================================================================
// Diagnosis code
// ============================================================================

/// Chapter letter that is reserved and never valid in a submitted code.
pub const RESERVED_CHAPTER: char = 'U';

// Letter, two digits, optional '.' and 1-4 digits. The reserved chapter is rejected after
// the shape check so it gets its own reason.
static CODE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][0-9]{2}(\.[0-9]{1,4})?$").expect("diagnosis code pattern is valid")
});

/// Why a diagnosis code was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosisCodeError {
    #[error("diagnosis code is empty")]
    Empty,
    #[error(
        "diagnosis code '{0}' must be a letter, two digits and an optional '.' with 1-4 digits"
    )]
    Malformed(String),
    #[error("diagnosis code '{0}' uses the reserved chapter 'U'")]
    ReservedChapter(String),
}

impl DiagnosisCodeError {
    /// True when the input had the wrong shape rather than a reserved chapter.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, DiagnosisCodeError::ReservedChapter(_))
    }
}

/// A trimmed, uppercased diagnosis code that matches the chapter grammar.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiagnosisCode(String);

impl DiagnosisCode {
    /// Normalises (trim, uppercase) and validates `raw`.
    ///
    /// A three-character code such as `J45` is complete on its own; the decimal subcategory
    /// is optional.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisCodeError`] describing the first failed rule.
    pub fn parse(raw: &str) -> Result<Self, DiagnosisCodeError> {
        let normalized = normalize_code(raw);

        if normalized.is_empty() {
            return Err(DiagnosisCodeError::Empty);
        }

        if !CODE_SHAPE.is_match(&normalized) {
            return Err(DiagnosisCodeError::Malformed(normalized));
        }

        if normalized.starts_with(RESERVED_CHAPTER) {
            return Err(DiagnosisCodeError::ReservedChapter(normalized));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagnosisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a diagnosis code.
///
/// # Errors
///
/// See [`DiagnosisCode::parse`].
pub fn validate_code(raw: &str) -> Result<(), DiagnosisCodeError> {
    DiagnosisCode::parse(raw).map(|_| ())
}

/// Best-effort formatting of a diagnosis code. Never fails.
///
/// - A code that is already valid is returned normalised (`" j45.50"` -> `"J45.50"`).
/// - An alphanumeric code longer than three characters without a decimal point gets one
///   inserted after the third character (`"J4550"` -> `"J45.50"`), provided the result is
///   valid.
/// - Anything else is returned exactly as given.
pub fn format_code(raw: &str) -> String {
    if let Ok(code) = DiagnosisCode::parse(raw) {
        return code.0;
    }

    let normalized = normalize_code(raw);
    let needs_decimal = normalized.len() > 3
        && !normalized.contains('.')
        && normalized.chars().all(|c| c.is_ascii_alphanumeric());

    if needs_decimal {
        let (category, subcategory) = normalized.split_at(3);
        if let Ok(code) = DiagnosisCode::parse(&format!("{category}.{subcategory}")) {
            return code.0;
        }
    }

    raw.to_string()
}
