//! JSON configuration for reports and fairness assessments.
//!
//! Every section has a [`Default`] reproducing the student-performance setup, so a config file
//! only needs the keys it changes:
//!
//! ```json
//! {
//!   "outcome_attributes": ["G3"],
//!   "fairness": { "favorable": { "at_least": 12 } }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TabulationError, TabulationResult};
use crate::fairness::{FairnessThresholds, FavorableOutcome};
use crate::tabulation::{Bucket, BucketSpec, ProtectedAttribute};
use crate::types::Category;

/// One protected attribute as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedAttributeConfig {
    /// Dataset field.
    pub field: String,
    /// Reported name; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Closed integer buckets, in ascending order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<Bucket>>,
}

impl ProtectedAttributeConfig {
    /// Name the attribute is reported under.
    pub fn reported_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.field)
    }

    /// Validated bucket spec, if the attribute is bucketed.
    pub fn bucket_spec(&self) -> TabulationResult<Option<BucketSpec>> {
        self.buckets
            .as_ref()
            .map(|buckets| {
                BucketSpec::new(buckets.clone()).map_err(|e| TabulationError::Config {
                    message: format!("protected attribute '{}': {e}", self.reported_name()),
                })
            })
            .transpose()
    }

    /// Resolve into a [`ProtectedAttribute`].
    pub fn resolve(&self) -> TabulationResult<ProtectedAttribute> {
        Ok(match self.bucket_spec()? {
            Some(spec) => ProtectedAttribute::bucketed(&self.field, self.reported_name(), spec),
            None => ProtectedAttribute::categorical(&self.field).with_name(self.reported_name()),
        })
    }
}

/// A privileged/unprivileged pair to compare on one protected attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessComparison {
    /// Reported name of the protected attribute (e.g. `age_group`).
    pub attribute: String,
    pub privileged: Category,
    pub unprivileged: Category,
}

impl FairnessComparison {
    pub fn new(
        attribute: impl Into<String>,
        privileged: impl Into<Category>,
        unprivileged: impl Into<Category>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            privileged: privileged.into(),
            unprivileged: unprivileged.into(),
        }
    }
}

/// Fairness assessment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    /// Outcome attribute the metrics are computed on.
    pub outcome: String,
    pub favorable: FavorableOutcome,
    pub thresholds: FairnessThresholds,
    pub comparisons: Vec<FairnessComparison>,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            outcome: "G3".to_string(),
            favorable: FavorableOutcome::default(),
            thresholds: FairnessThresholds::default(),
            comparisons: vec![
                FairnessComparison::new("sex", "M", "F"),
                FairnessComparison::new("age_group", "18-22", "15-17"),
            ],
        }
    }
}

/// Top-level configuration consumed by [`crate::tabulation::TabulationEngine::report`] and
/// [`crate::tabulation::TabulationEngine::assess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabulationConfig {
    pub protected_attributes: Vec<ProtectedAttributeConfig>,
    pub outcome_attributes: Vec<String>,
    pub fairness: FairnessConfig,
}

impl Default for TabulationConfig {
    fn default() -> Self {
        let age = BucketSpec::student_age_two_groups();
        Self {
            protected_attributes: vec![
                ProtectedAttributeConfig {
                    field: "sex".to_string(),
                    name: None,
                    buckets: None,
                },
                ProtectedAttributeConfig {
                    field: "age".to_string(),
                    name: Some("age_group".to_string()),
                    buckets: Some(age.buckets().to_vec()),
                },
            ],
            outcome_attributes: vec!["G1".to_string(), "G2".to_string(), "G3".to_string()],
            fairness: FairnessConfig::default(),
        }
    }
}

impl TabulationConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(json: &str) -> TabulationResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> TabulationResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the config without touching any data.
    pub fn validate(&self) -> TabulationResult<()> {
        if self.protected_attributes.is_empty() {
            return Err(config_error("at least one protected attribute is required"));
        }
        if self.outcome_attributes.is_empty() {
            return Err(config_error("at least one outcome attribute is required"));
        }
        for (i, outcome) in self.outcome_attributes.iter().enumerate() {
            if self.outcome_attributes[..i].contains(outcome) {
                return Err(config_error(format!("outcome attribute '{outcome}' is listed twice")));
            }
        }

        let mut names: Vec<&str> = Vec::with_capacity(self.protected_attributes.len());
        for attr in &self.protected_attributes {
            let name = attr.reported_name();
            if names.contains(&name) {
                return Err(config_error(format!("protected attribute '{name}' is listed twice")));
            }
            attr.bucket_spec()?;
            names.push(name);
        }

        if self.fairness.outcome.is_empty() {
            return Err(config_error("fairness outcome must not be empty"));
        }
        let bands = [
            ("statistical_parity", self.fairness.thresholds.statistical_parity),
            ("disparate_impact", self.fairness.thresholds.disparate_impact),
        ];
        for (metric, band) in bands {
            if band.lower.is_nan() || band.upper.is_nan() || band.lower > band.upper {
                return Err(config_error(format!(
                    "{metric} band [{}, {}] is empty",
                    band.lower, band.upper
                )));
            }
        }
        for comparison in &self.fairness.comparisons {
            if !names.contains(&comparison.attribute.as_str()) {
                return Err(config_error(format!(
                    "fairness comparison references unknown protected attribute '{}'",
                    comparison.attribute
                )));
            }
            if comparison.privileged == comparison.unprivileged {
                return Err(config_error(format!(
                    "fairness comparison on '{}' uses '{}' as both groups",
                    comparison.attribute, comparison.privileged
                )));
            }
        }
        Ok(())
    }

    /// Protected attributes with validated bucket specs, in config order.
    pub fn protected(&self) -> TabulationResult<Vec<ProtectedAttribute>> {
        self.protected_attributes
            .iter()
            .map(ProtectedAttributeConfig::resolve)
            .collect()
    }
}

fn config_error(message: impl Into<String>) -> TabulationError {
    TabulationError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::TabulationConfig;
    use crate::error::TabulationError;
    use crate::fairness::FavorableOutcome;
    use crate::tabulation::BucketSpec;
    use crate::types::Category;

    #[test]
    fn default_config_is_the_student_setup() {
        let config = TabulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.outcome_attributes, vec!["G1", "G2", "G3"]);

        let protected = config.protected().unwrap();
        let names: Vec<_> = protected.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["sex", "age_group"]);
        assert_eq!(protected[1].field(), "age");
        assert_eq!(
            protected[1].bucket_spec(),
            Some(&BucketSpec::student_age_two_groups())
        );
        assert_eq!(config.fairness.favorable, FavorableOutcome::AtLeast(10));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = TabulationConfig::from_json_str(
            r#"{"outcome_attributes": ["G3"], "fairness": {"favorable": {"at_least": 12}}}"#,
        )
        .unwrap();
        assert_eq!(config.outcome_attributes, vec!["G3"]);
        assert_eq!(config.protected_attributes.len(), 2);
        assert_eq!(config.fairness.outcome, "G3");
        assert_eq!(config.fairness.favorable, FavorableOutcome::AtLeast(12));
        assert_eq!(config.fairness.comparisons.len(), 2);
    }

    #[test]
    fn parses_custom_buckets_and_comparisons() {
        let config = TabulationConfig::from_json_str(
            r#"{
                "protected_attributes": [
                    {"field": "age", "name": "age_band", "buckets": [
                        {"label": "15-16", "lower": 15, "upper": 16},
                        {"label": "17-19", "lower": 17, "upper": 19},
                        {"label": "20-22", "lower": 20, "upper": 22}
                    ]}
                ],
                "outcome_attributes": ["G1"],
                "fairness": {
                    "outcome": "G1",
                    "comparisons": [{"attribute": "age_band", "privileged": "20-22", "unprivileged": "15-16"}]
                }
            }"#,
        )
        .unwrap();
        let protected = config.protected().unwrap();
        assert_eq!(protected[0].name(), "age_band");
        assert_eq!(
            protected[0].bucket_spec(),
            Some(&BucketSpec::student_age_three_groups())
        );
        assert_eq!(config.fairness.comparisons[0].privileged, Category::from("20-22"));
    }

    #[test]
    fn overlapping_buckets_are_a_config_error() {
        let err = TabulationConfig::from_json_str(
            r#"{"protected_attributes": [{"field": "age", "buckets": [
                {"label": "a", "lower": 15, "upper": 18},
                {"label": "b", "lower": 18, "upper": 22}
            ]}], "fairness": {"comparisons": []}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TabulationError::Config { ref message } if message.contains("overlaps")));
    }

    #[test]
    fn comparison_must_name_a_protected_attribute() {
        let err = TabulationConfig::from_json_str(
            r#"{"protected_attributes": [{"field": "sex"}],
                "fairness": {"comparisons": [{"attribute": "age_group", "privileged": "18-22", "unprivileged": "15-17"}]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown protected attribute 'age_group'"));
    }

    #[test]
    fn empty_lists_are_rejected() {
        let err = TabulationConfig::from_json_str(r#"{"outcome_attributes": []}"#).unwrap_err();
        assert!(matches!(err, TabulationError::Config { .. }));

        let err = TabulationConfig::from_json_str(r#"{"protected_attributes": []}"#).unwrap_err();
        assert!(matches!(err, TabulationError::Config { .. }));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = TabulationConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, TabulationError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TabulationConfig::from_json_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, TabulationError::Io(_)));
    }
}
