//! Provider upsert-by-identifier semantics.
//!
//! A provider is keyed by its identifier. Reusing an identifier with a different display name
//! never overwrites the stored name; the stored record is returned together with a
//! [`Warning::ProviderConflict`] and the caller decides whether to proceed.

use crate::normalize::{normalize_display_name, normalize_identifier};
use crate::store::RecordStore;
use crate::warning::Warning;
use crate::{IntegrityError, IntegrityResult};
use intake_types::{NonEmptyText, ProviderRecord};

/// What [`ConflictResolver::resolve_provider`] decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// No provider had the identifier; the record is new and should be committed.
    Created,
    /// A provider with the identifier and the same name already exists.
    Existing,
    /// A provider with the identifier exists under a different name.
    Conflict,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderResolution {
    pub record: ProviderRecord,
    pub outcome: ProviderOutcome,
    pub warnings: Vec<Warning>,
}

impl ProviderResolution {
    /// True when the caller must persist `record`.
    pub fn is_new(&self) -> bool {
        self.outcome == ProviderOutcome::Created
    }
}

/// Provider resolution operations. All methods are associated functions.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Resolve a provider by identifier.
    ///
    /// `identifier` has separators stripped and `display_name` is trimmed and title-cased
    /// before any comparison. Names are compared case-insensitively after both sides are
    /// normalised. The store is only read; a newly created record is returned for the caller
    /// to commit.
    ///
    /// # Errors
    ///
    /// - [`IntegrityError::InvalidInput`] if the identifier or name is blank after normalisation
    /// - [`IntegrityError::Store`] if the store cannot be read
    pub fn resolve_provider<S>(
        identifier: &str,
        display_name: &str,
        store: &S,
    ) -> IntegrityResult<ProviderResolution>
    where
        S: RecordStore + ?Sized,
    {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(IntegrityError::InvalidInput(
                "provider identifier cannot be empty".into(),
            ));
        }

        let display_name = NonEmptyText::new(normalize_display_name(display_name)).map_err(|_| {
            IntegrityError::InvalidInput("provider display name cannot be empty".into())
        })?;

        let Some(existing) = store.find_provider_by_identifier(&identifier)? else {
            tracing::info!(identifier = %identifier, "proposing new provider record");
            return Ok(ProviderResolution {
                record: ProviderRecord {
                    identifier,
                    display_name,
                },
                outcome: ProviderOutcome::Created,
                warnings: Vec::new(),
            });
        };

        let stored = normalize_display_name(existing.display_name.as_str());
        if display_name.eq_ignore_case(&stored) {
            return Ok(ProviderResolution {
                record: existing,
                outcome: ProviderOutcome::Existing,
                warnings: Vec::new(),
            });
        }

        tracing::warn!(
            identifier = %identifier,
            "provider identifier reused with a different display name"
        );
        let warning = Warning::ProviderConflict {
            identifier,
            expected_name: existing.display_name.to_string(),
            actual_name: display_name.to_string(),
        };
        Ok(ProviderResolution {
            record: existing,
            outcome: ProviderOutcome::Conflict,
            warnings: vec![warning],
        })
    }
}
