//! Detection policy configuration.
//!
//! Every weight, threshold and window used by the detector lives here so the engine can be
//! exercised against several policies. Configuration is resolved once at process startup and
//! passed into the detector as `Arc<DetectionConfig>`; nothing in this crate reads process
//! environment variables itself.
//!
//! # Environment Variables
//!
//! Binaries may apply these overrides through [`EnvOverrides`]:
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `INTAKE_SIMILARITY_THRESHOLD` | f64 | `0.7` | Composite score a similar patient must exceed |
//! | `INTAKE_CANDIDATE_WINDOW` | usize | `100` | Most recent patients compared per candidate |
//! | `INTAKE_ORDER_WINDOW_DAYS` | i64 | `30` | Age limit for duplicate-order matches |

use crate::constants::{
    DEFAULT_CANDIDATE_WINDOW, DEFAULT_FIRST_NAME_WEIGHT, DEFAULT_LAST_NAME_WEIGHT,
    DEFAULT_MRN_PREFIX_LEN, DEFAULT_MRN_WEIGHT, DEFAULT_ORDER_WINDOW_DAYS,
    DEFAULT_SIMILARITY_THRESHOLD, ENV_CANDIDATE_WINDOW, ENV_ORDER_WINDOW_DAYS,
    ENV_SIMILARITY_THRESHOLD, WEIGHT_SUM_TOLERANCE,
};
use crate::{IntegrityError, IntegrityResult};
use chrono::Duration;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Raw, unvalidated policy values.
///
/// This is the shape accepted from YAML; every key is optional and falls back to its default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionSettings {
    pub first_name_weight: f64,
    pub last_name_weight: f64,
    pub mrn_weight: f64,
    pub similarity_threshold: f64,
    pub candidate_window: usize,
    pub mrn_prefix_len: usize,
    pub order_window_days: i64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            first_name_weight: DEFAULT_FIRST_NAME_WEIGHT,
            last_name_weight: DEFAULT_LAST_NAME_WEIGHT,
            mrn_weight: DEFAULT_MRN_WEIGHT,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            candidate_window: DEFAULT_CANDIDATE_WINDOW,
            mrn_prefix_len: DEFAULT_MRN_PREFIX_LEN,
            order_window_days: DEFAULT_ORDER_WINDOW_DAYS,
        }
    }
}

/// Weights of the composite patient score. Always sum to 1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub first_name: f64,
    pub last_name: f64,
    pub mrn: f64,
}

/// Validated detection policy.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionConfig {
    weights: ScoreWeights,
    similarity_threshold: f64,
    candidate_window: usize,
    mrn_prefix_len: usize,
    order_window: Duration,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights {
                first_name: DEFAULT_FIRST_NAME_WEIGHT,
                last_name: DEFAULT_LAST_NAME_WEIGHT,
                mrn: DEFAULT_MRN_WEIGHT,
            },
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            candidate_window: DEFAULT_CANDIDATE_WINDOW,
            mrn_prefix_len: DEFAULT_MRN_PREFIX_LEN,
            order_window: Duration::days(DEFAULT_ORDER_WINDOW_DAYS),
        }
    }
}

impl DetectionConfig {
    /// Validate `settings` and build a `DetectionConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::InvalidConfig`] if:
    /// - any weight is negative or not finite, or the weights do not sum to 1.0
    /// - the similarity threshold is outside `[0.0, 1.0]`
    /// - the candidate window, MRN prefix length or order window is zero
    pub fn new(settings: DetectionSettings) -> IntegrityResult<Self> {
        let weights = [
            ("first_name_weight", settings.first_name_weight),
            ("last_name_weight", settings.last_name_weight),
            ("mrn_weight", settings.mrn_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(IntegrityError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number, got {weight}"
                )));
            }
        }

        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(IntegrityError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }

        let threshold = settings.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(IntegrityError::InvalidConfig(format!(
                "similarity_threshold must be within [0.0, 1.0], got {threshold}"
            )));
        }

        if settings.candidate_window == 0 {
            return Err(IntegrityError::InvalidConfig(
                "candidate_window must be greater than zero".into(),
            ));
        }

        if settings.mrn_prefix_len == 0 {
            return Err(IntegrityError::InvalidConfig(
                "mrn_prefix_len must be greater than zero".into(),
            ));
        }

        if settings.order_window_days <= 0 {
            return Err(IntegrityError::InvalidConfig(format!(
                "order_window_days must be greater than zero, got {}",
                settings.order_window_days
            )));
        }

        let order_window = Duration::try_days(settings.order_window_days).ok_or_else(|| {
            IntegrityError::InvalidConfig(format!(
                "order_window_days is out of range: {}",
                settings.order_window_days
            ))
        })?;

        Ok(Self {
            weights: ScoreWeights {
                first_name: settings.first_name_weight,
                last_name: settings.last_name_weight,
                mrn: settings.mrn_weight,
            },
            similarity_threshold: threshold,
            candidate_window: settings.candidate_window,
            mrn_prefix_len: settings.mrn_prefix_len,
            order_window,
        })
    }

    /// Parse and validate a YAML policy document.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::ConfigYaml`] for unknown keys or wrong types, otherwise as
    /// [`DetectionConfig::new`].
    pub fn from_yaml(yaml_text: &str) -> IntegrityResult<Self> {
        Self::new(settings_from_yaml(yaml_text)?)
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Number of most recent patients compared against a candidate.
    ///
    /// Patients older than this window are never considered. This bounds latency for the
    /// interactive create path at the cost of recall on large datasets.
    pub fn candidate_window(&self) -> usize {
        self.candidate_window
    }

    pub fn mrn_prefix_len(&self) -> usize {
        self.mrn_prefix_len
    }

    pub fn order_window(&self) -> Duration {
        self.order_window
    }
}

/// Parse a YAML policy document without validating it.
///
/// An empty document yields the defaults.
pub fn settings_from_yaml(yaml_text: &str) -> IntegrityResult<DetectionSettings> {
    if yaml_text.trim().is_empty() {
        return Ok(DetectionSettings::default());
    }
    serde_yaml::from_str(yaml_text).map_err(IntegrityError::ConfigYaml)
}

/// Read a YAML policy file without validating it.
pub fn settings_from_file(path: &Path) -> IntegrityResult<DetectionSettings> {
    let text = std::fs::read_to_string(path).map_err(IntegrityError::ConfigRead)?;
    settings_from_yaml(&text)
}

/// Raw environment values a binary collected at startup.
#[derive(Clone, Debug, Default)]
pub struct EnvOverrides {
    pub similarity_threshold: Option<String>,
    pub candidate_window: Option<String>,
    pub order_window_days: Option<String>,
}

impl EnvOverrides {
    /// Apply every present, non-blank override to `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::InvalidConfig`] naming the variable that failed to parse.
    pub fn apply(&self, settings: &mut DetectionSettings) -> IntegrityResult<()> {
        let similarity_threshold = self.similarity_threshold.as_deref();
        if let Some(v) = parse_env_value(ENV_SIMILARITY_THRESHOLD, similarity_threshold)? {
            settings.similarity_threshold = v;
        }
        let candidate_window = self.candidate_window.as_deref();
        if let Some(v) = parse_env_value(ENV_CANDIDATE_WINDOW, candidate_window)? {
            settings.candidate_window = v;
        }
        let order_window_days = self.order_window_days.as_deref();
        if let Some(v) = parse_env_value(ENV_ORDER_WINDOW_DAYS, order_window_days)? {
            settings.order_window_days = v;
        }
        Ok(())
    }
}

/// Parse an optional environment value.
///
/// `None` or empty/whitespace values yield `Ok(None)`.
pub fn parse_env_value<T>(name: &str, value: Option<&str>) -> IntegrityResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.map(str::trim).filter(|v| !v.is_empty());
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| {
                IntegrityError::InvalidConfig(format!("{name}='{v}' could not be parsed: {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_default_settings() {
        let from_settings =
            DetectionConfig::new(DetectionSettings::default()).expect("defaults are valid");
        assert_eq!(from_settings, DetectionConfig::default());

        let cfg = DetectionConfig::default();
        assert_eq!(cfg.similarity_threshold(), 0.7);
        assert_eq!(cfg.candidate_window(), 100);
        assert_eq!(cfg.order_window(), Duration::days(30));
        assert_eq!(cfg.weights().last_name, 0.5);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let settings = DetectionSettings {
            first_name_weight: 0.5,
            ..DetectionSettings::default()
        };
        let err = DetectionConfig::new(settings).expect_err("weights sum to 1.2");
        assert!(matches!(err, IntegrityError::InvalidConfig(msg) if msg.contains("sum to 1.0")));
    }

    #[test]
    fn rejects_negative_weight() {
        let settings = DetectionSettings {
            first_name_weight: -0.1,
            last_name_weight: 0.9,
            mrn_weight: 0.2,
            ..DetectionSettings::default()
        };
        let err = DetectionConfig::new(settings).expect_err("negative weight");
        assert!(
            matches!(err, IntegrityError::InvalidConfig(msg) if msg.contains("first_name_weight"))
        );
    }

    #[test]
    fn rejects_nan_weight() {
        let settings = DetectionSettings {
            mrn_weight: f64::NAN,
            ..DetectionSettings::default()
        };
        assert!(DetectionConfig::new(settings).is_err());
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        for threshold in [-0.01, 1.01, f64::NAN] {
            let settings = DetectionSettings {
                similarity_threshold: threshold,
                ..DetectionSettings::default()
            };
            assert!(DetectionConfig::new(settings).is_err(), "{threshold}");
        }
    }

    #[test]
    fn rejects_zero_windows() {
        let zero_window = DetectionSettings {
            candidate_window: 0,
            ..DetectionSettings::default()
        };
        assert!(DetectionConfig::new(zero_window).is_err());

        let zero_prefix = DetectionSettings {
            mrn_prefix_len: 0,
            ..DetectionSettings::default()
        };
        assert!(DetectionConfig::new(zero_prefix).is_err());

        let zero_days = DetectionSettings {
            order_window_days: 0,
            ..DetectionSettings::default()
        };
        assert!(DetectionConfig::new(zero_days).is_err());
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let cfg = DetectionConfig::from_yaml(
            "similarity_threshold: 0.8\nfirst_name_weight: 0.25\nlast_name_weight: 0.55\n",
        )
        .expect("valid yaml policy");
        assert_eq!(cfg.similarity_threshold(), 0.8);
        assert_eq!(cfg.weights().first_name, 0.25);
        assert_eq!(cfg.weights().mrn, 0.2);
        assert_eq!(cfg.candidate_window(), 100);
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let err = DetectionConfig::from_yaml("threshold: 0.8\n").expect_err("unknown key");
        assert!(matches!(err, IntegrityError::ConfigYaml(_)));
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let cfg = DetectionConfig::from_yaml("   \n").expect("empty document");
        assert_eq!(cfg, DetectionConfig::default());
    }

    #[test]
    fn settings_from_file_reads_yaml() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, "candidate_window: 250\n").expect("write policy");

        let settings = settings_from_file(&path).expect("read policy");
        assert_eq!(settings.candidate_window, 250);

        let err = settings_from_file(&dir.path().join("missing.yaml")).expect_err("missing");
        assert!(matches!(err, IntegrityError::ConfigRead(_)));
    }

    #[test]
    fn env_overrides_apply_present_values() {
        let mut settings = DetectionSettings::default();
        let overrides = EnvOverrides {
            similarity_threshold: Some(" 0.85 ".into()),
            candidate_window: Some("".into()),
            order_window_days: Some("7".into()),
        };
        overrides.apply(&mut settings).expect("valid overrides");

        assert_eq!(settings.similarity_threshold, 0.85);
        assert_eq!(settings.candidate_window, 100);
        assert_eq!(settings.order_window_days, 7);
    }

    #[test]
    fn env_override_parse_failure_names_variable() {
        let mut settings = DetectionSettings::default();
        let overrides = EnvOverrides {
            candidate_window: Some("lots".into()),
            ..EnvOverrides::default()
        };
        let err = overrides.apply(&mut settings).expect_err("unparseable window");
        assert!(matches!(
            err,
            IntegrityError::InvalidConfig(msg) if msg.contains("INTAKE_CANDIDATE_WINDOW")
        ));
    }
}
