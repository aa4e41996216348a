//! Cross-tabulation of a grouping attribute against outcome attributes.
//!
//! Currently implemented:
//!
//! - [`tabulate()`]: counts per (group, outcome value) with row/column/grand totals
//! - [`frequency()`]: single-attribute value counts
//! - [`BucketSpec`] / [`bucket_label()`]: integer bucketing (e.g. age into age groups)
//! - [`FrequencyReport`]: every protected attribute against every outcome attribute
//! - [`TabulationEngine`]: the same operations reported to a [`crate::observer::TabulationObserver`]
//!
//! ## Example: sex and age group against a grade
//!
//! ```rust
//! use fairness_crosstab::tabulation::{tabulate, BucketSpec};
//! use fairness_crosstab::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("sex", DataType::Utf8),
//!     Field::new("age", DataType::Int64),
//!     Field::new("G3", DataType::Int64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::text("F"), Value::Int64(15), Value::Int64(11)],
//!         vec![Value::text("M"), Value::Int64(19), Value::Int64(11)],
//!         vec![Value::text("F"), Value::Int64(18), Value::Int64(6)],
//!     ],
//! )
//! .unwrap();
//!
//! let by_sex = tabulate(&ds, "sex", &["G3"], None).unwrap();
//! assert_eq!(by_sex.outcome("G3").unwrap().count("F", 11), 1);
//!
//! let spec = BucketSpec::student_age_two_groups();
//! let by_age = tabulate(&ds, "age", &["G3"], Some(&spec))
//!     .unwrap()
//!     .with_group_attribute("age_group");
//! let g3 = by_age.outcome("G3").unwrap();
//! assert_eq!(g3.row_total("18-22"), Some(2));
//! assert_eq!(g3.column_total(11), Some(2));
//! assert_eq!(g3.grand_total(), 3);
//! ```

pub mod bucket;
pub mod crosstab;
pub mod engine;
pub mod frequency;
mod groups;
pub mod report;

pub use bucket::{bucket_label, Bucket, BucketSpec};
pub use crosstab::{CrossTab, OutcomeTable};
pub use engine::{tabulate, TabulationEngine, TabulationOptions};
pub use frequency::{frequency, FrequencyEntry, FrequencyTable};
pub use report::{FrequencyReport, ProtectedAttribute, ReportSection};
