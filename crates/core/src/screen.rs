//! Single entry point used before committing a record.
//!
//! [`IntakeScreen`] composes the detector and the resolver into one ordered `Warning` stream
//! per create attempt. It holds only the shared configuration and can be cloned freely across
//! request handlers.

use crate::config::DetectionConfig;
use crate::detector::DuplicateDetector;
use crate::resolver::{ConflictResolver, ProviderResolution};
use crate::store::RecordStore;
use crate::warning::Warning;
use crate::IntegrityResult;
use chrono::{DateTime, Utc};
use intake_types::{OrderCandidate, PatientCandidate};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct IntakeScreen {
    detector: DuplicateDetector,
}

impl IntakeScreen {
    pub fn new(cfg: Arc<DetectionConfig>) -> Self {
        Self {
            detector: DuplicateDetector::new(cfg),
        }
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    /// Warnings for a new patient: exact MRN duplicates first, then similar patients by
    /// descending score.
    pub fn screen_patient<S>(
        &self,
        candidate: &PatientCandidate,
        store: &S,
    ) -> IntegrityResult<Vec<Warning>>
    where
        S: RecordStore + ?Sized,
    {
        Ok(self
            .detector
            .find_patient_matches(candidate, store)?
            .into_warnings())
    }

    pub fn screen_order<S>(
        &self,
        candidate: &OrderCandidate,
        store: &S,
    ) -> IntegrityResult<Vec<Warning>>
    where
        S: RecordStore + ?Sized,
    {
        self.detector.find_duplicate_orders(candidate, store)
    }

    pub fn screen_order_at<S>(
        &self,
        candidate: &OrderCandidate,
        store: &S,
        now: DateTime<Utc>,
    ) -> IntegrityResult<Vec<Warning>>
    where
        S: RecordStore + ?Sized,
    {
        self.detector.find_duplicate_orders_at(candidate, store, now)
    }

    pub fn screen_provider<S>(
        &self,
        identifier: &str,
        display_name: &str,
        store: &S,
    ) -> IntegrityResult<ProviderResolution>
    where
        S: RecordStore + ?Sized,
    {
        ConflictResolver::resolve_provider(identifier, display_name, store)
    }
}
