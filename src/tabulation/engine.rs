//! Cross-tabulation entrypoints.
//!
//! [`tabulate`] is the pure operation. [`TabulationEngine`] runs the same operations and reports
//! each run to an optional [`TabulationObserver`], and drives whole reports and fairness
//! assessments from a [`TabulationConfig`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::TabulationConfig;
use crate::error::{TabulationError, TabulationResult};
use crate::fairness::{assess, FairnessAssessment};
use crate::observer::{Operation, TabulationEvent, TabulationObserver, TabulationStats};
use crate::types::{Category, DataSet};

use super::bucket::BucketSpec;
use super::crosstab::{CrossTab, OutcomeTable};
use super::frequency::{frequency, FrequencyTable};
use super::groups::{categorical_index, category_at, GroupColumn};
use super::report::{FrequencyReport, ReportSection};

/// Cross-tabulate `group_attribute` against each of `outcome_attributes`.
///
/// When `bucket_spec` is given, the group attribute must be an `Int64` field and each value is
/// mapped to its bucket label first; rows then follow the bucket spec's declared order and every bucket
/// gets a row, even if empty. Without buckets, rows follow canonical [`Category`] order.
///
/// A single pass over the records accumulates counts keyed by (group, outcome value) for every
/// outcome attribute. Margins are summed from the resulting cells.
///
/// # Errors
///
/// - [`TabulationError::Schema`] if a named attribute is not in the schema (before any counting)
/// - [`TabulationError::InvalidArgument`] if `outcome_attributes` is empty or repeats a name
/// - [`TabulationError::TypeMismatch`] if an attribute cannot be used as a category
/// - [`TabulationError::Domain`] if a bucketed value lies outside every bucket
///
/// An empty dataset is not an error; every count is zero.
///
/// # Example
///
/// ```rust
/// use fairness_crosstab::tabulation::{tabulate, Bucket, BucketSpec};
/// use fairness_crosstab::types::{DataSet, DataType, Field, Schema, Value};
///
/// let schema = Schema::new(vec![
///     Field::new("age", DataType::Int64),
///     Field::new("G1", DataType::Int64),
/// ]);
/// let rows = [(15, 10), (17, 12), (18, 8), (22, 15)]
///     .into_iter()
///     .map(|(age, g1)| vec![Value::Int64(age), Value::Int64(g1)])
///     .collect();
/// let ds = DataSet::new(schema, rows).unwrap();
///
/// let spec = BucketSpec::new(vec![
///     Bucket::new("15-17", 15, 17),
///     Bucket::new("18-22", 18, 22),
/// ])
/// .unwrap();
///
/// let ct = tabulate(&ds, "age", &["G1"], Some(&spec)).unwrap();
/// let g1 = ct.outcome("G1").unwrap();
/// assert_eq!(g1.count("15-17", 10), 1);
/// assert_eq!(g1.row_total("18-22"), Some(2));
/// assert_eq!(g1.grand_total(), 4);
/// ```
pub fn tabulate(
    dataset: &DataSet,
    group_attribute: &str,
    outcome_attributes: &[&str],
    bucket_spec: Option<&BucketSpec>,
) -> TabulationResult<CrossTab> {
    let schema = dataset.schema();
    let group = GroupColumn::resolve(schema, group_attribute, bucket_spec)?;

    if outcome_attributes.is_empty() {
        return Err(TabulationError::InvalidArgument {
            message: "at least one outcome attribute is required".to_string(),
        });
    }
    for (i, name) in outcome_attributes.iter().enumerate() {
        if outcome_attributes[..i].contains(name) {
            return Err(TabulationError::InvalidArgument {
                message: format!("outcome attribute '{name}' is listed twice"),
            });
        }
    }
    let outcome_idxs = outcome_attributes
        .iter()
        .map(|name| categorical_index(schema, name))
        .collect::<TabulationResult<Vec<_>>>()?;

    let mut slots = group.slots();
    let mut counts: Vec<HashMap<(usize, Category), u64>> = vec![HashMap::new(); outcome_idxs.len()];

    for record in dataset.records() {
        let slot = group.slot_of(&record, &mut slots)?;
        for ((&idx, name), cells) in outcome_idxs.iter().zip(outcome_attributes).zip(&mut counts) {
            let value = category_at(&record, idx, name)?;
            *cells.entry((slot, value)).or_insert(0) += 1;
        }
    }

    let (groups, rank) = slots.into_ordered();
    let tables = counts
        .into_iter()
        .zip(outcome_attributes)
        .map(|(cells, name)| build_table(group_attribute, name, &groups, &rank, cells))
        .collect();

    Ok(CrossTab::new(group_attribute.to_owned(), groups, tables))
}

fn build_table(
    group_attribute: &str,
    attribute: &str,
    groups: &[Category],
    rank: &[usize],
    counts: HashMap<(usize, Category), u64>,
) -> OutcomeTable {
    let columns: Vec<Category> = counts
        .keys()
        .map(|(_, value)| value.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells = vec![vec![0u64; columns.len()]; groups.len()];
    for ((slot, value), n) in counts {
        if let Ok(c) = columns.binary_search(&value) {
            cells[rank[slot]][c] += n;
        }
    }

    OutcomeTable::from_cells(
        group_attribute.to_owned(),
        attribute.to_owned(),
        groups.to_vec(),
        columns,
        cells,
    )
}

/// Options controlling [`TabulationEngine`] behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone, Default)]
pub struct TabulationOptions {
    /// Optional observer for logging/metrics.
    pub observer: Option<Arc<dyn TabulationObserver>>,
}

impl fmt::Debug for TabulationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabulationOptions")
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Runs tabulations with observer hooks.
#[derive(Debug, Default)]
pub struct TabulationEngine {
    opts: TabulationOptions,
}

impl TabulationEngine {
    /// Create a new engine with the given options.
    pub fn new(opts: TabulationOptions) -> Self {
        Self { opts }
    }

    /// Attach an observer for tabulation events.
    pub fn with_observer(mut self, observer: Arc<dyn TabulationObserver>) -> Self {
        self.opts.observer = Some(observer);
        self
    }

    /// Observed form of [`tabulate`].
    pub fn tabulate(
        &self,
        dataset: &DataSet,
        group_attribute: &str,
        outcome_attributes: &[&str],
        bucket_spec: Option<&BucketSpec>,
    ) -> TabulationResult<CrossTab> {
        self.run(
            Operation::Tabulate,
            group_attribute,
            dataset.row_count(),
            || tabulate(dataset, group_attribute, outcome_attributes, bucket_spec),
            |ct| TabulationStats {
                rows: dataset.row_count(),
                groups: ct.groups().len(),
                cells: ct.outcomes().iter().map(|t| t.nonzero_cells().count()).sum(),
            },
        )
    }

    /// Observed form of [`frequency`].
    pub fn frequency(
        &self,
        dataset: &DataSet,
        attribute: &str,
        bucket_spec: Option<&BucketSpec>,
    ) -> TabulationResult<FrequencyTable> {
        self.run(
            Operation::Frequency,
            attribute,
            dataset.row_count(),
            || frequency(dataset, attribute, bucket_spec),
            |table| TabulationStats {
                rows: dataset.row_count(),
                groups: table.entries().len(),
                cells: table.entries().iter().filter(|e| e.count > 0).count(),
            },
        )
    }

    /// Build the frequency report described by `config`: for every protected attribute, one
    /// frequency table plus its cross-tabulation against every outcome attribute.
    pub fn report(&self, dataset: &DataSet, config: &TabulationConfig) -> TabulationResult<FrequencyReport> {
        config.validate()?;
        let outcomes: Vec<&str> = config.outcome_attributes.iter().map(String::as_str).collect();

        let mut sections = Vec::with_capacity(config.protected_attributes.len());
        for protected in config.protected()? {
            let spec = protected.bucket_spec();
            let frequency = self
                .frequency(dataset, protected.field(), spec)?
                .with_attribute(protected.name());
            let crosstab = self
                .tabulate(dataset, protected.field(), &outcomes, spec)?
                .with_group_attribute(protected.name());
            sections.push(ReportSection::new(&protected, frequency, crosstab));
        }
        Ok(FrequencyReport::from_sections(sections))
    }

    /// Compute every fairness comparison listed in `config.fairness`.
    pub fn assess(&self, dataset: &DataSet, config: &TabulationConfig) -> TabulationResult<Vec<FairnessAssessment>> {
        config.validate()?;
        let protected = config.protected()?;
        let fairness = &config.fairness;

        let mut out = Vec::with_capacity(fairness.comparisons.len());
        for comparison in &fairness.comparisons {
            let attr = protected
                .iter()
                .find(|p| p.name() == comparison.attribute)
                .ok_or_else(|| TabulationError::Config {
                    message: format!(
                        "fairness comparison references unknown protected attribute '{}'",
                        comparison.attribute
                    ),
                })?;
            let ct = self
                .tabulate(dataset, attr.field(), &[fairness.outcome.as_str()], attr.bucket_spec())?
                .with_group_attribute(attr.name());
            let table = ct.outcome(&fairness.outcome).ok_or_else(|| TabulationError::Config {
                message: format!("outcome '{}' missing from tabulation", fairness.outcome),
            })?;
            out.push(assess(
                table,
                &comparison.privileged,
                &comparison.unprivileged,
                &fairness.favorable,
                &fairness.thresholds,
            )?);
        }
        Ok(out)
    }

    fn run<T>(
        &self,
        operation: Operation,
        attribute: &str,
        rows: usize,
        f: impl FnOnce() -> TabulationResult<T>,
        stats: impl FnOnce(&T) -> TabulationStats,
    ) -> TabulationResult<T> {
        let start = Instant::now();
        self.emit(TabulationEvent::Started {
            operation,
            attribute: attribute.to_owned(),
            rows,
        });

        let result = f();

        match &result {
            Ok(out) => self.emit(TabulationEvent::Finished {
                operation,
                attribute: attribute.to_owned(),
                elapsed: start.elapsed(),
                stats: stats(out),
            }),
            Err(e) => self.emit(TabulationEvent::Failed {
                operation,
                attribute: attribute.to_owned(),
                error: e.to_string(),
            }),
        }
        result
    }

    fn emit(&self, event: TabulationEvent) {
        if let Some(obs) = &self.opts.observer {
            obs.on_event(&event);
        }
    }
}
