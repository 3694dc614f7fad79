//! Read-only record-store capability consumed by the engine.
//!
//! The engine only ever *reads* through [`RecordStore`]. Transaction boundaries, isolation and
//! writes belong to the caller. [`InMemoryStore`] is a thread-safe reference implementation
//! used by the command line (loaded from a snapshot) and by tests.

use crate::error::StoreError;
use crate::normalize::normalize_identifier;
use crate::IntegrityResult;
use intake_snapshot::{Snapshot, SnapshotData};
use intake_types::{ExistingOrder, ExistingPatientRecord, ProviderRecord};
use intake_uuid::RecordId;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The three read operations the engine needs from a record store.
pub trait RecordStore: Send + Sync {
    /// Up to `limit` patients, most recently committed first.
    fn find_recent_patients(&self, limit: usize) -> StoreResult<Vec<ExistingPatientRecord>>;

    /// Every order committed for `patient_id`, in any order.
    fn find_orders_for_patient(&self, patient_id: &RecordId) -> StoreResult<Vec<ExistingOrder>>;

    /// The provider registered under an already-normalised `identifier`, if any.
    fn find_provider_by_identifier(&self, identifier: &str) -> StoreResult<Option<ProviderRecord>>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn find_recent_patients(&self, limit: usize) -> StoreResult<Vec<ExistingPatientRecord>> {
        (**self).find_recent_patients(limit)
    }

    fn find_orders_for_patient(&self, patient_id: &RecordId) -> StoreResult<Vec<ExistingOrder>> {
        (**self).find_orders_for_patient(patient_id)
    }

    fn find_provider_by_identifier(&self, identifier: &str) -> StoreResult<Option<ProviderRecord>> {
        (**self).find_provider_by_identifier(identifier)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    // Oldest first.
    patients: Vec<ExistingPatientRecord>,
    orders: Vec<ExistingOrder>,
    // Keyed by normalised identifier.
    providers: HashMap<String, ProviderRecord>,
}

/// In-memory record store.
///
/// Recency is insertion order: the last inserted patient is the most recent.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding everything in `snapshot`, keeping its patient order.
    pub fn from_snapshot(snapshot: SnapshotData) -> Self {
        let providers = snapshot
            .providers
            .into_iter()
            .map(|p| (normalize_identifier(&p.identifier), p))
            .collect();

        Self {
            state: RwLock::new(StoreState {
                patients: snapshot.patients,
                orders: snapshot.orders,
                providers,
            }),
        }
    }

    /// Load a YAML snapshot file into a new store.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Snapshot`](crate::IntegrityError::Snapshot) if the file cannot
    /// be read or parsed.
    pub fn load_snapshot(path: &Path) -> IntegrityResult<Self> {
        let data = Snapshot::load(path)?;
        tracing::info!(
            patients = data.patients.len(),
            orders = data.orders.len(),
            providers = data.providers.len(),
            "snapshot loaded"
        );
        Ok(Self::from_snapshot(data))
    }

    /// Commit a patient. It becomes the most recent record.
    pub fn insert_patient(&self, record: ExistingPatientRecord) -> StoreResult<()> {
        self.write()?.patients.push(record);
        Ok(())
    }

    pub fn insert_order(&self, order: ExistingOrder) -> StoreResult<()> {
        self.write()?.orders.push(order);
        Ok(())
    }

    /// Commit a provider, replacing any record under the same normalised identifier.
    ///
    /// Returns the replaced record.
    pub fn insert_provider(&self, provider: ProviderRecord) -> StoreResult<Option<ProviderRecord>> {
        let key = normalize_identifier(&provider.identifier);
        Ok(self.write()?.providers.insert(key, provider))
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }
}

impl RecordStore for InMemoryStore {
    fn find_recent_patients(&self, limit: usize) -> StoreResult<Vec<ExistingPatientRecord>> {
        Ok(self
            .read()?
            .patients
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn find_orders_for_patient(&self, patient_id: &RecordId) -> StoreResult<Vec<ExistingOrder>> {
        Ok(self
            .read()?
            .orders
            .iter()
            .filter(|o| &o.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn find_provider_by_identifier(&self, identifier: &str) -> StoreResult<Option<ProviderRecord>> {
        Ok(self.read()?.providers.get(identifier).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use intake_types::NonEmptyText;

    fn patient(mrn: &str) -> ExistingPatientRecord {
        ExistingPatientRecord {
            id: RecordId::new(),
            mrn: mrn.into(),
            first_name: "Test".into(),
            last_name: "Patient".into(),
        }
    }

    #[test]
    fn recent_patients_are_newest_first_and_bounded() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store
                .insert_patient(patient(&format!("MRN-{i}")))
                .expect("insert");
        }

        let recent = store.find_recent_patients(3).expect("fetch");
        let mrns: Vec<_> = recent.iter().map(|p| p.mrn.as_str()).collect();
        assert_eq!(mrns, vec!["MRN-4", "MRN-3", "MRN-2"]);
        assert_eq!(store.find_recent_patients(usize::MAX).expect("fetch").len(), 5);
    }

    #[test]
    fn orders_are_filtered_by_patient() {
        let store = InMemoryStore::new();
        let alice = RecordId::new();
        let bob = RecordId::new();
        for (patient_id, med) in [(alice, "Aspirin"), (bob, "Ibuprofen"), (alice, "Insulin")] {
            store
                .insert_order(ExistingOrder {
                    id: RecordId::new(),
                    patient_id,
                    medication_name: med.into(),
                    created_at: Utc::now(),
                })
                .expect("insert");
        }

        let orders = store.find_orders_for_patient(&alice).expect("fetch");
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.patient_id == alice));
    }

    #[test]
    fn providers_are_indexed_by_normalised_identifier() {
        let store = InMemoryStore::new();
        let replaced = store
            .insert_provider(ProviderRecord {
                identifier: "123-456-7893".into(),
                display_name: NonEmptyText::new("Jane Doe").expect("name"),
            })
            .expect("insert");
        assert!(replaced.is_none());

        let found = store
            .find_provider_by_identifier("1234567893")
            .expect("fetch")
            .expect("provider present");
        assert_eq!(found.display_name.as_str(), "Jane Doe");
        assert!(store
            .find_provider_by_identifier("0000000000")
            .expect("fetch")
            .is_none());
    }

    #[test]
    fn load_snapshot_reports_parse_failures() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("snapshot.yaml");
        std::fs::write(&path, "patients: not-a-list\n").expect("write snapshot");

        let err = InMemoryStore::load_snapshot(&path).expect_err("invalid snapshot");
        assert!(matches!(err, crate::IntegrityError::Snapshot(_)));
    }
}
