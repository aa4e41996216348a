//! Single-attribute frequency tables (value counts).

use std::fmt;

use serde::Serialize;

use crate::error::TabulationResult;
use crate::types::{Category, DataSet};

use super::bucket::BucketSpec;
use super::groups::GroupColumn;

/// One row of a [`FrequencyTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: Category,
    pub count: u64,
}

/// Number of records per value of one attribute.
///
/// Entries follow the same order as cross-tabulation groups: the bucket spec's declared order
/// when bucketed (including empty buckets), canonical [`Category`] order otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    attribute: String,
    entries: Vec<FrequencyEntry>,
    total: u64,
}

impl FrequencyTable {
    /// Name of the counted attribute.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Entries in order.
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    /// Count for `value`; zero if it never occurred.
    pub fn count(&self, value: impl Into<Category>) -> u64 {
        let value = value.into();
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map_or(0, |e| e.count)
    }

    /// Rename the attribute, e.g. `age` to `age_group` once it has been bucketed.
    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attribute = name.to_owned();
        self
    }

    /// Sum of all counts (the number of records).
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl fmt::Display for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.entries.iter().map(|e| e.value.to_string()).collect();
        let width = labels
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(self.attribute.len());
        let count_width = self.total.to_string().len();

        write!(f, "{}", self.attribute)?;
        for (label, entry) in labels.iter().zip(&self.entries) {
            write!(f, "\n{label:<width$} {:>count_width$}", entry.count)?;
        }
        Ok(())
    }
}

/// Count records per value of `attribute`, optionally bucketed.
///
/// Fails with the same schema, type and domain errors as [`super::tabulate`].
pub fn frequency(
    dataset: &DataSet,
    attribute: &str,
    bucket_spec: Option<&BucketSpec>,
) -> TabulationResult<FrequencyTable> {
    let column = GroupColumn::resolve(dataset.schema(), attribute, bucket_spec)?;
    let mut slots = column.slots();
    let mut counts: Vec<u64> = Vec::new();

    for record in dataset.records() {
        let slot = column.slot_of(&record, &mut slots)?;
        if slot >= counts.len() {
            counts.resize(slot + 1, 0);
        }
        counts[slot] += 1;
    }

    let (labels, rank) = slots.into_ordered();
    let mut ordered = vec![0u64; labels.len()];
    for (slot, count) in counts.into_iter().enumerate() {
        ordered[rank[slot]] = count;
    }

    let entries: Vec<FrequencyEntry> = labels
        .into_iter()
        .zip(ordered)
        .map(|(value, count)| FrequencyEntry { value, count })
        .collect();
    let total = entries.iter().map(|e| e.count).sum();

    Ok(FrequencyTable {
        attribute: attribute.to_owned(),
        entries,
        total,
    })
}
