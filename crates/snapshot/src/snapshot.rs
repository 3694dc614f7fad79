//! Snapshot wire models and translation helpers.
//!
//! Expected layout:
//!
//! ```yaml
//! patients:
//!   - id: 90a8d1ea318041d9adb070a834d4e0f6
//!     mrn: "MRN-001"
//!     firstName: Sarah
//!     lastName: Williams
//! orders:
//!   - id: 5b0c1f7e2c3d4e5f8a9b0c1d2e3f4a5b
//!     patientId: 90a8d1ea318041d9adb070a834d4e0f6
//!     medicationName: Amoxicillin
//!     createdAt: 2026-01-23T13:58:04Z
//! providers:
//!   - identifier: "1234567893"
//!     displayName: Jane Doe
//! ```
//!
//! Patients are listed oldest first; a store built from a snapshot treats the last entry as
//! the most recent record.

use crate::{SnapshotError, SnapshotResult};
use chrono::{DateTime, Utc};
use intake_types::{ExistingOrder, ExistingPatientRecord, NonEmptyText, ProviderRecord};
use intake_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level contents of a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotData {
    /// Committed patients, oldest first.
    pub patients: Vec<ExistingPatientRecord>,
    pub orders: Vec<ExistingOrder>,
    pub providers: Vec<ProviderRecord>,
}

// ============================================================================
// Public Snapshot operations
// ============================================================================

/// Snapshot operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct Snapshot;

impl Snapshot {
    /// Parse a snapshot from YAML text.
    ///
    /// Uses `serde_path_to_error` so schema mismatches name the failing field
    /// (e.g. `orders.0.createdAt`).
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Translation`] if the YAML does not match the wire schema or a
    /// field (record id, timestamp, display name) cannot be translated.
    pub fn parse(yaml_text: &str) -> SnapshotResult<SnapshotData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, SnapshotWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(SnapshotError::Translation(format!(
                    "Snapshot schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }

    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be read, otherwise as [`Snapshot::parse`].
    pub fn load(path: &Path) -> SnapshotResult<SnapshotData> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Render a snapshot as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Translation`] if serialisation fails.
    pub fn render(data: &SnapshotData) -> SnapshotResult<String> {
        let wire = domain_to_wire(data);
        serde_yaml::to_string(&wire)
            .map_err(|e| SnapshotError::Translation(format!("Failed to serialise snapshot: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct SnapshotWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patients: Vec<PatientWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<OrderWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    pub id: String,
    pub mrn: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct OrderWire {
    pub id: String,
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "medicationName")]
    pub medication_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ProviderWire {
    pub identifier: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn parse_record_id(field: &str, index: usize, value: &str) -> SnapshotResult<RecordId> {
    RecordId::parse(value)
        .map_err(|e| SnapshotError::Translation(format!("Invalid {field} at index {index}: {e}")))
}

fn wire_to_domain(wire: SnapshotWire) -> SnapshotResult<SnapshotData> {
    let patients = wire
        .patients
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            Ok(ExistingPatientRecord {
                id: parse_record_id("patients.id", i, &p.id)?,
                mrn: p.mrn,
                first_name: p.first_name,
                last_name: p.last_name,
            })
        })
        .collect::<SnapshotResult<Vec<_>>>()?;

    let orders = wire
        .orders
        .into_iter()
        .enumerate()
        .map(|(i, o)| {
            let created_at = o.created_at.parse::<DateTime<Utc>>().map_err(|e| {
                SnapshotError::Translation(format!(
                    "Invalid orders.createdAt at index {i}: '{}': {e}",
                    o.created_at
                ))
            })?;
            Ok(ExistingOrder {
                id: parse_record_id("orders.id", i, &o.id)?,
                patient_id: parse_record_id("orders.patientId", i, &o.patient_id)?,
                medication_name: o.medication_name,
                created_at,
            })
        })
        .collect::<SnapshotResult<Vec<_>>>()?;

    let providers = wire
        .providers
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let display_name = NonEmptyText::new(&p.display_name).map_err(|_| {
                SnapshotError::InvalidInput(format!(
                    "providers.displayName at index {i} cannot be empty"
                ))
            })?;
            Ok(ProviderRecord {
                identifier: p.identifier,
                display_name,
            })
        })
        .collect::<SnapshotResult<Vec<_>>>()?;

    Ok(SnapshotData {
        patients,
        orders,
        providers,
    })
}

fn domain_to_wire(data: &SnapshotData) -> SnapshotWire {
    SnapshotWire {
        patients: data
            .patients
            .iter()
            .map(|p| PatientWire {
                id: p.id.to_string(),
                mrn: p.mrn.clone(),
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
            })
            .collect(),
        orders: data
            .orders
            .iter()
            .map(|o| OrderWire {
                id: o.id.to_string(),
                patient_id: o.patient_id.to_string(),
                medication_name: o.medication_name.clone(),
                created_at: o.created_at.to_rfc3339(),
            })
            .collect(),
        providers: data
            .providers
            .iter()
            .map(|p| ProviderWire {
                identifier: p.identifier.clone(),
                display_name: p.display_name.to_string(),
            })
            .collect(),
    }
}
