//! Constants used throughout the intake core crate.

/// Issuer prefix prepended to a provider identifier before the mod-10 check.
pub const PROVIDER_ID_ISSUER_PREFIX: &str = "80840";

/// Number of digits in a provider identifier.
pub const PROVIDER_ID_LEN: usize = 10;

/// Default weight of the first-name similarity in the composite patient score.
pub const DEFAULT_FIRST_NAME_WEIGHT: f64 = 0.3;

/// Default weight of the last-name similarity in the composite patient score.
pub const DEFAULT_LAST_NAME_WEIGHT: f64 = 0.5;

/// Default weight of the MRN-prefix similarity in the composite patient score.
pub const DEFAULT_MRN_WEIGHT: f64 = 0.2;

/// Composite score a patient must exceed to be reported as similar.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Number of most recent patients compared against a candidate.
pub const DEFAULT_CANDIDATE_WINDOW: usize = 100;

/// Leading MRN characters compared by the composite score.
pub const DEFAULT_MRN_PREFIX_LEN: usize = 4;

/// Days an existing order counts towards duplicate-order detection.
pub const DEFAULT_ORDER_WINDOW_DAYS: i64 = 30;

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Environment variable overriding the similarity threshold.
pub const ENV_SIMILARITY_THRESHOLD: &str = "INTAKE_SIMILARITY_THRESHOLD";

/// Environment variable overriding the candidate window size.
pub const ENV_CANDIDATE_WINDOW: &str = "INTAKE_CANDIDATE_WINDOW";

/// Environment variable overriding the duplicate-order window in days.
pub const ENV_ORDER_WINDOW_DAYS: &str = "INTAKE_ORDER_WINDOW_DAYS";
