//! Duplicate detection for patients and medication orders.
//!
//! ## Patients
//!
//! A candidate patient is compared against a bounded window of the most recent committed
//! patients (see [`DetectionConfig::candidate_window`]). Records outside that window are never
//! examined, so on large datasets an old duplicate can be missed. The bound keeps the check
//! fast enough to run inline before an interactive create.
//!
//! Within the window:
//! - a record whose MRN equals the candidate's MRN exactly is a *hard* duplicate and is never
//!   scored for similarity;
//! - every other record gets a composite score
//!   `w_first * sim(first) + w_last * sim(last) + w_mrn * sim(mrn prefix)` and is reported when
//!   the score exceeds the configured threshold.
//!
//! ## Orders
//!
//! An order duplicates an existing one when both are for the same patient, the medication
//! names match after trimming and case folding, and the existing order was created within the
//! configured window before "now".
//!
//! Detection holds no mutable state. Any number of calls may run concurrently against the same
//! store; the only failure mode is a store error.

use crate::config::DetectionConfig;
use crate::similarity::TrigramSet;
use crate::store::RecordStore;
use crate::warning::Warning;
use crate::IntegrityResult;
use chrono::{DateTime, Utc};
use intake_types::{ExistingPatientRecord, OrderCandidate, PatientCandidate};
use std::sync::Arc;

/// Patient matches found in the candidate window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientMatches {
    /// `DuplicatePatient` warnings for exact MRN matches.
    pub duplicates: Vec<Warning>,
    /// `SimilarPatient` warnings, highest score first.
    pub similar: Vec<Warning>,
}

impl PatientMatches {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.similar.is_empty()
    }

    /// Hard duplicates first, then similar patients.
    pub fn into_warnings(self) -> Vec<Warning> {
        let mut warnings = self.duplicates;
        warnings.extend(self.similar);
        warnings
    }
}

// Precomputed trigrams of the candidate's compared fields.
struct CandidateGrams {
    first_name: TrigramSet,
    last_name: TrigramSet,
    mrn_prefix: TrigramSet,
}

/// Stateless duplicate detector parameterised by a [`DetectionConfig`].
#[derive(Clone, Debug)]
pub struct DuplicateDetector {
    cfg: Arc<DetectionConfig>,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(Arc::new(DetectionConfig::default()))
    }
}

impl DuplicateDetector {
    pub fn new(cfg: Arc<DetectionConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.cfg
    }

    /// `SimilarPatient` warnings for records in the candidate window.
    ///
    /// Records sharing the candidate's exact MRN are excluded; they are a separate concern
    /// (see [`DuplicateDetector::find_patient_matches`]).
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Store`](crate::IntegrityError::Store) if the store cannot be
    /// read. Finding nothing is `Ok` with an empty vector.
    pub fn find_similar_patients<S>(
        &self,
        candidate: &PatientCandidate,
        store: &S,
    ) -> IntegrityResult<Vec<Warning>>
    where
        S: RecordStore + ?Sized,
    {
        Ok(self.find_patient_matches(candidate, store)?.similar)
    }

    /// Exact-MRN and similar patients in the candidate window, from a single store read.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Store`](crate::IntegrityError::Store) if the store cannot be
    /// read.
    pub fn find_patient_matches<S>(
        &self,
        candidate: &PatientCandidate,
        store: &S,
    ) -> IntegrityResult<PatientMatches>
    where
        S: RecordStore + ?Sized,
    {
        let window = self.cfg.candidate_window();
        let records = store.find_recent_patients(window)?;
        tracing::debug!(
            window,
            fetched = records.len(),
            "comparing patient candidate against recent records"
        );

        let matches = self.match_patients(candidate, &records);
        tracing::debug!(
            duplicates = matches.duplicates.len(),
            similar = matches.similar.len(),
            "patient comparison finished"
        );
        Ok(matches)
    }

    /// Composite similarity of `candidate` and `existing` in `[0.0, 1.0]`.
    ///
    /// Does not special-case equal MRNs.
    pub fn score_patient(
        &self,
        candidate: &PatientCandidate,
        existing: &ExistingPatientRecord,
    ) -> f64 {
        self.score_against(&self.candidate_grams(candidate), existing)
    }

    /// `DuplicateOrder` warnings for `candidate`, using the current time.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Store`](crate::IntegrityError::Store) if the store cannot be
    /// read.
    pub fn find_duplicate_orders<S>(
        &self,
        candidate: &OrderCandidate,
        store: &S,
    ) -> IntegrityResult<Vec<Warning>>
    where
        S: RecordStore + ?Sized,
    {
        self.find_duplicate_orders_at(candidate, store, Utc::now())
    }

    /// `DuplicateOrder` warnings for `candidate` as of `now`.
    ///
    /// Each existing order for the same patient whose medication name matches (trimmed, case
    /// insensitive) and whose creation time is no earlier than `now - order_window` yields
    /// exactly one warning.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Store`](crate::IntegrityError::Store) if the store cannot be
    /// read.
    pub fn find_duplicate_orders_at<S>(
        &self,
        candidate: &OrderCandidate,
        store: &S,
        now: DateTime<Utc>,
    ) -> IntegrityResult<Vec<Warning>>
    where
        S: RecordStore + ?Sized,
    {
        let orders = store.find_orders_for_patient(&candidate.patient_id)?;
        // A window reaching past the earliest representable instant covers every order.
        let cutoff = now
            .checked_sub_signed(self.cfg.order_window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let medication = fold_medication_name(&candidate.medication_name);

        let warnings: Vec<Warning> = orders
            .into_iter()
            .filter(|o| o.patient_id == candidate.patient_id)
            .filter(|o| o.created_at >= cutoff)
            .filter(|o| fold_medication_name(&o.medication_name) == medication)
            .map(|o| Warning::DuplicateOrder {
                existing_order_id: o.id,
                patient_id: o.patient_id,
                medication_name: o.medication_name,
                created_at: o.created_at,
            })
            .collect();

        tracing::debug!(
            patient_id = %candidate.patient_id,
            matches = warnings.len(),
            "duplicate order check finished"
        );
        Ok(warnings)
    }

    fn match_patients(
        &self,
        candidate: &PatientCandidate,
        records: &[ExistingPatientRecord],
    ) -> PatientMatches {
        let grams = self.candidate_grams(candidate);
        let threshold = self.cfg.similarity_threshold();
        let mut matches = PatientMatches::default();
        let mut scored = Vec::new();

        for record in records {
            if record.mrn == candidate.mrn {
                matches.duplicates.push(Warning::DuplicatePatient {
                    existing_patient_id: record.id,
                    mrn: record.mrn.clone(),
                });
                continue;
            }

            let score = self.score_against(&grams, record);
            if score > threshold {
                scored.push((score, record));
            }
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        matches.similar = scored
            .into_iter()
            .map(|(score, record)| Warning::SimilarPatient {
                existing_patient_id: record.id,
                existing_first_name: record.first_name.clone(),
                existing_last_name: record.last_name.clone(),
                existing_mrn: record.mrn.clone(),
                score,
            })
            .collect();

        matches
    }

    fn candidate_grams(&self, candidate: &PatientCandidate) -> CandidateGrams {
        CandidateGrams {
            first_name: TrigramSet::new(candidate.first_name.trim()),
            last_name: TrigramSet::new(candidate.last_name.trim()),
            mrn_prefix: TrigramSet::new(self.mrn_prefix(&candidate.mrn)),
        }
    }

    fn score_against(&self, grams: &CandidateGrams, existing: &ExistingPatientRecord) -> f64 {
        let w = self.cfg.weights();
        let first = grams
            .first_name
            .jaccard(&TrigramSet::new(existing.first_name.trim()));
        let last = grams
            .last_name
            .jaccard(&TrigramSet::new(existing.last_name.trim()));
        let mrn = grams
            .mrn_prefix
            .jaccard(&TrigramSet::new(self.mrn_prefix(&existing.mrn)));

        (w.first_name * first + w.last_name * last + w.mrn * mrn).clamp(0.0, 1.0)
    }

    fn mrn_prefix<'a>(&self, mrn: &'a str) -> &'a str {
        let mrn = mrn.trim();
        match mrn.char_indices().nth(self.cfg.mrn_prefix_len()) {
            Some((end, _)) => &mrn[..end],
            None => mrn,
        }
    }
}

fn fold_medication_name(name: &str) -> String {
    name.trim().to_lowercase()
}
