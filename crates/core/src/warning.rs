//! Advisory warnings produced before a record is committed.
//!
//! Warnings are plain values: created per call, never stored and never mutated. The set of
//! variants is closed so callers must handle every kind when rendering a decision UI.

use chrono::{DateTime, Utc};
use intake_uuid::RecordId;
use serde::Serialize;

/// How strongly a warning suggests the caller should stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Warning {
    /// An existing patient carries exactly the candidate's MRN.
    DuplicatePatient {
        existing_patient_id: RecordId,
        mrn: String,
    },
    /// An existing patient scored above the similarity threshold.
    SimilarPatient {
        existing_patient_id: RecordId,
        existing_first_name: String,
        existing_last_name: String,
        existing_mrn: String,
        score: f64,
    },
    /// The same medication was ordered for the patient within the order window.
    DuplicateOrder {
        existing_order_id: RecordId,
        patient_id: RecordId,
        medication_name: String,
        created_at: DateTime<Utc>,
    },
    /// A provider identifier is already registered under a different name.
    ProviderConflict {
        identifier: String,
        expected_name: String,
        actual_name: String,
    },
}

impl Warning {
    pub fn severity(&self) -> Severity {
        match self {
            Warning::DuplicatePatient { .. } | Warning::DuplicateOrder { .. } => Severity::High,
            Warning::SimilarPatient { .. } | Warning::ProviderConflict { .. } => Severity::Medium,
        }
    }

    /// Stable tag, identical to the serialised `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::DuplicatePatient { .. } => "duplicate_patient",
            Warning::SimilarPatient { .. } => "similar_patient",
            Warning::DuplicateOrder { .. } => "duplicate_order",
            Warning::ProviderConflict { .. } => "provider_conflict",
        }
    }

    /// One-line description suitable for display.
    pub fn message(&self) -> String {
        match self {
            Warning::DuplicatePatient {
                existing_patient_id,
                mrn,
            } => format!("patient {existing_patient_id} already has MRN '{mrn}'"),
            Warning::SimilarPatient {
                existing_patient_id,
                existing_first_name,
                existing_last_name,
                score,
                ..
            } => format!(
                "possible duplicate of patient {existing_patient_id} \
                 ({existing_first_name} {existing_last_name}), similarity {score:.2}"
            ),
            Warning::DuplicateOrder {
                existing_order_id,
                medication_name,
                created_at,
                ..
            } => format!(
                "'{medication_name}' was already ordered on {} (order {existing_order_id})",
                created_at.format("%Y-%m-%d")
            ),
            Warning::ProviderConflict {
                identifier,
                expected_name,
                actual_name,
            } => format!(
                "provider {identifier} is registered as '{expected_name}', not '{actual_name}'"
            ),
        }
    }
}
