//! Record data model.
//!
//! Candidates are inputs under evaluation that have not been committed yet. `Existing*`
//! types are immutable snapshots of committed records as read from a record store.

use crate::NonEmptyText;
use chrono::{DateTime, Utc};
use intake_uuid::RecordId;
use serde::{Deserialize, Serialize};

/// A patient about to be created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCandidate {
    pub first_name: String,
    pub last_name: String,
    pub mrn: String,
}

impl PatientCandidate {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        mrn: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            mrn: mrn.into(),
        }
    }
}

/// A previously committed patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingPatientRecord {
    pub id: RecordId,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
}

/// A medication order about to be created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCandidate {
    pub patient_id: RecordId,
    pub medication_name: String,
}

impl OrderCandidate {
    pub fn new(patient_id: RecordId, medication_name: impl Into<String>) -> Self {
        Self {
            patient_id,
            medication_name: medication_name.into(),
        }
    }
}

/// A previously committed medication order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingOrder {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub medication_name: String,
    pub created_at: DateTime<Utc>,
}

/// A provider keyed by its (normalised) 10-digit identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub identifier: String,
    pub display_name: NonEmptyText,
}
