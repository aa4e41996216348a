//! `fairness-crosstab` cross-tabulates protected attributes (sex, age group) against outcome
//! fields of an in-memory [`types::DataSet`], to check whether outcomes are distributed evenly
//! across groups.
//!
//! The primary entrypoint is [`tabulation::tabulate`], which counts records per
//! (group, outcome value) for one or more outcome attributes and adds row, column and grand
//! totals. An integer grouping attribute can be bucketed first through a
//! [`tabulation::BucketSpec`].
//!
//! ## Data model
//!
//! A [`types::DataSet`] is a [`types::Schema`] plus rows of typed [`types::Value`]s. Rows are
//! validated against the schema when the dataset is built: arity, types, and no nulls. Supported
//! logical types are:
//!
//! - [`types::DataType::Int64`]
//! - [`types::DataType::Float64`] (never usable as a category)
//! - [`types::DataType::Bool`]
//! - [`types::DataType::Utf8`]
//!
//! Loading data from files is left to the caller.
//!
//! ## Age buckets
//!
//! Buckets are closed integer ranges that must be contiguous. The canonical student grouping is
//! `15-17` and `18-22` ([`tabulation::BucketSpec::student_age_two_groups`]). Values outside the
//! spec fail with [`TabulationError::Domain`] rather than being dropped.
//!
//! ```rust
//! use fairness_crosstab::tabulation::{bucket_label, BucketSpec};
//!
//! let spec = BucketSpec::student_age_two_groups();
//! assert_eq!(bucket_label(17, &spec).unwrap(), "15-17");
//! assert_eq!(bucket_label(18, &spec).unwrap(), "18-22");
//! assert!(bucket_label(23, &spec).is_err());
//! ```
//!
//! ## Reports and fairness metrics
//!
//! ```rust
//! use fairness_crosstab::config::TabulationConfig;
//! use fairness_crosstab::tabulation::TabulationEngine;
//! use fairness_crosstab::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), fairness_crosstab::TabulationError> {
//! let schema = Schema::new(vec![
//!     Field::new("sex", DataType::Utf8),
//!     Field::new("age", DataType::Int64),
//!     Field::new("G3", DataType::Int64),
//! ]);
//! let rows = [("F", 15, 12), ("F", 18, 8), ("M", 17, 9), ("M", 22, 14)]
//!     .into_iter()
//!     .map(|(sex, age, g3)| vec![Value::text(sex), Value::Int64(age), Value::Int64(g3)])
//!     .collect();
//! let ds = DataSet::new(schema, rows)?;
//!
//! let config = TabulationConfig::from_json_str(r#"{"outcome_attributes": ["G3"]}"#)?;
//! let engine = TabulationEngine::default();
//!
//! let report = engine.report(&ds, &config)?;
//! println!("{report}");
//!
//! for assessment in engine.assess(&ds, &config)? {
//!     println!(
//!         "{}: SPD={:.3} DI={:.3}",
//!         assessment.protected_attribute,
//!         assessment.statistical_parity.value,
//!         assessment.disparate_impact.value,
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`tabulation`]: bucketing, cross-tabulation, frequency tables and reports
//! - [`fairness`]: statistical parity difference and disparate impact
//! - [`config`]: JSON configuration with student-performance defaults
//! - [`observer`]: hooks for logging tabulation runs
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types used across the crate

pub mod config;
pub mod error;
pub mod fairness;
pub mod observer;
pub mod tabulation;
pub mod types;

pub use error::{TabulationError, TabulationResult};
