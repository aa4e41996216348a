//! Group fairness metrics over a cross-tabulated outcome.
//!
//! Both metrics compare the rate of favorable outcomes between an unprivileged and a privileged
//! group, taken from one [`OutcomeTable`]:
//!
//! - statistical parity difference: `rate(unprivileged) - rate(privileged)`, fair near `0`
//! - disparate impact: `rate(unprivileged) / rate(privileged)`, fair near `1`
//!
//! A rate is the share of a group's records whose outcome value is favorable.
//!
//! ```rust
//! use fairness_crosstab::fairness::{statistical_parity_difference, FavorableOutcome};
//! use fairness_crosstab::tabulation::tabulate;
//! use fairness_crosstab::types::{Category, DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("sex", DataType::Utf8),
//!     Field::new("G3", DataType::Int64),
//! ]);
//! let rows = [("F", 12), ("F", 8), ("M", 14), ("M", 15)]
//!     .into_iter()
//!     .map(|(sex, g3)| vec![Value::text(sex), Value::Int64(g3)])
//!     .collect();
//! let ds = DataSet::new(schema, rows).unwrap();
//!
//! let ct = tabulate(&ds, "sex", &["G3"], None).unwrap();
//! let spd = statistical_parity_difference(
//!     ct.outcome("G3").unwrap(),
//!     &Category::from("M"),
//!     &Category::from("F"),
//!     &FavorableOutcome::AtLeast(10),
//! )
//! .unwrap();
//! assert!((spd - (-0.5)).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{TabulationError, TabulationResult};
use crate::tabulation::OutcomeTable;
use crate::types::Category;

/// Rule deciding which outcome values count as favorable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavorableOutcome {
    /// Integer outcomes greater than or equal to the threshold (e.g. a pass mark).
    AtLeast(i64),
    /// Any of the listed values.
    OneOf(Vec<Category>),
}

impl FavorableOutcome {
    /// True when `value` is favorable under this rule.
    pub fn is_favorable(&self, value: &Category) -> bool {
        match (self, value) {
            (FavorableOutcome::AtLeast(threshold), Category::Int(v)) => v >= threshold,
            (FavorableOutcome::AtLeast(_), _) => false,
            (FavorableOutcome::OneOf(values), v) => values.contains(v),
        }
    }
}

impl Default for FavorableOutcome {
    /// Pass mark on the 0–20 grade scale.
    fn default() -> Self {
        FavorableOutcome::AtLeast(10)
    }
}

/// Closed interval `[lower, upper]` within which a metric is considered fair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub lower: f64,
    pub upper: f64,
}

impl ThresholdBand {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Fairness bands for both metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessThresholds {
    pub statistical_parity: ThresholdBand,
    pub disparate_impact: ThresholdBand,
}

impl Default for FairnessThresholds {
    fn default() -> Self {
        Self {
            statistical_parity: ThresholdBand::new(-0.1, 0.1),
            disparate_impact: ThresholdBand::new(0.99, 1.01),
        }
    }
}

/// A metric value together with the band it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValue {
    pub value: f64,
    pub band: ThresholdBand,
    pub within_threshold: bool,
}

impl MetricValue {
    fn checked(value: f64, band: ThresholdBand) -> Self {
        Self {
            value,
            band,
            within_threshold: band.contains(value),
        }
    }
}

/// Both fairness metrics for one privileged/unprivileged comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessAssessment {
    pub protected_attribute: String,
    pub outcome_attribute: String,
    pub privileged: Category,
    pub unprivileged: Category,
    pub privileged_rate: f64,
    pub unprivileged_rate: f64,
    pub statistical_parity: MetricValue,
    pub disparate_impact: MetricValue,
}

impl FairnessAssessment {
    /// True when both metrics are inside their bands.
    pub fn is_fair(&self) -> bool {
        self.statistical_parity.within_threshold && self.disparate_impact.within_threshold
    }
}

/// Share of `group`'s records with a favorable outcome.
///
/// Fails with [`TabulationError::UnknownGroup`] if `group` is not a row of `table`, and with
/// [`TabulationError::UndefinedMetric`] if the group has no records.
pub fn group_rate(table: &OutcomeTable, group: &Category, favorable: &FavorableOutcome) -> TabulationResult<f64> {
    let row = table.row(group).ok_or_else(|| TabulationError::UnknownGroup {
        group: group.to_string(),
    })?;

    let total: u64 = row.iter().sum();
    if total == 0 {
        return Err(TabulationError::UndefinedMetric {
            metric: "favorable rate".to_string(),
            reason: format!("group '{group}' has no records"),
        });
    }

    let favorable_count: u64 = table
        .columns()
        .iter()
        .zip(row)
        .filter(|(value, _)| favorable.is_favorable(value))
        .map(|(_, count)| *count)
        .sum();

    Ok(favorable_count as f64 / total as f64)
}

/// `rate(unprivileged) - rate(privileged)`.
pub fn statistical_parity_difference(
    table: &OutcomeTable,
    privileged: &Category,
    unprivileged: &Category,
    favorable: &FavorableOutcome,
) -> TabulationResult<f64> {
    let privileged_rate = group_rate(table, privileged, favorable)?;
    let unprivileged_rate = group_rate(table, unprivileged, favorable)?;
    Ok(unprivileged_rate - privileged_rate)
}

/// `rate(unprivileged) / rate(privileged)`.
///
/// Undefined when the privileged group has no favorable outcomes.
pub fn disparate_impact(
    table: &OutcomeTable,
    privileged: &Category,
    unprivileged: &Category,
    favorable: &FavorableOutcome,
) -> TabulationResult<f64> {
    let privileged_rate = group_rate(table, privileged, favorable)?;
    let unprivileged_rate = group_rate(table, unprivileged, favorable)?;
    ratio(unprivileged_rate, privileged_rate, privileged)
}

/// Compute both metrics and check them against `thresholds`.
pub fn assess(
    table: &OutcomeTable,
    privileged: &Category,
    unprivileged: &Category,
    favorable: &FavorableOutcome,
    thresholds: &FairnessThresholds,
) -> TabulationResult<FairnessAssessment> {
    let privileged_rate = group_rate(table, privileged, favorable)?;
    let unprivileged_rate = group_rate(table, unprivileged, favorable)?;
    let di = ratio(unprivileged_rate, privileged_rate, privileged)?;

    Ok(FairnessAssessment {
        protected_attribute: table.group_attribute().to_owned(),
        outcome_attribute: table.attribute().to_owned(),
        privileged: privileged.clone(),
        unprivileged: unprivileged.clone(),
        privileged_rate,
        unprivileged_rate,
        statistical_parity: MetricValue::checked(
            unprivileged_rate - privileged_rate,
            thresholds.statistical_parity,
        ),
        disparate_impact: MetricValue::checked(di, thresholds.disparate_impact),
    })
}

fn ratio(unprivileged_rate: f64, privileged_rate: f64, privileged: &Category) -> TabulationResult<f64> {
    if privileged_rate == 0.0 {
        return Err(TabulationError::UndefinedMetric {
            metric: "disparate impact".to_string(),
            reason: format!("privileged group '{privileged}' has no favorable outcomes"),
        });
    }
    Ok(unprivileged_rate / privileged_rate)
}
