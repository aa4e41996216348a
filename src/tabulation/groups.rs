//! Group resolution shared by cross-tabulation and frequency tables.

use std::collections::HashMap;

use crate::error::{TabulationError, TabulationResult};
use crate::types::{Category, DataType, Record, Schema, Value};

use super::bucket::BucketSpec;

/// A grouping column: either used as-is or mapped through a [`BucketSpec`].
pub(crate) struct GroupColumn<'a> {
    name: &'a str,
    idx: usize,
    buckets: Option<&'a BucketSpec>,
}

impl<'a> GroupColumn<'a> {
    /// Look up `name` in the schema and check its type can be grouped on.
    pub(crate) fn resolve(
        schema: &Schema,
        name: &'a str,
        buckets: Option<&'a BucketSpec>,
    ) -> TabulationResult<Self> {
        let (idx, field) = schema.require(name)?;
        match (buckets, field.data_type) {
            (Some(_), DataType::Int64) | (None, DataType::Int64 | DataType::Bool | DataType::Utf8) => {}
            (Some(_), other) => {
                return Err(TabulationError::TypeMismatch {
                    field: name.to_owned(),
                    expected: "Int64 for a bucketed attribute".to_string(),
                    found: other.to_string(),
                });
            }
            (None, other) => return Err(not_categorical(name, other)),
        }
        Ok(Self { name, idx, buckets })
    }

    /// Empty slot table. Bucketed columns are pre-seeded with every label in declared order so
    /// that slot `i` is bucket `i` and empty buckets still get a row.
    pub(crate) fn slots(&self) -> GroupSlots {
        let mut slots = GroupSlots {
            labels: Vec::new(),
            index: HashMap::new(),
            declared: self.buckets.is_some(),
        };
        if let Some(spec) = self.buckets {
            for label in spec.labels() {
                slots.insert(Category::from(label));
            }
        }
        slots
    }

    /// Slot of the group `record` belongs to.
    pub(crate) fn slot_of(&self, record: &Record<'_>, slots: &mut GroupSlots) -> TabulationResult<usize> {
        match self.buckets {
            Some(spec) => match value_at(record, self.idx, self.name)? {
                Value::Int64(v) => spec.index_for(*v),
                other => Err(TabulationError::TypeMismatch {
                    field: self.name.to_owned(),
                    expected: "Int64".to_string(),
                    found: format!("{other:?} at row {}", record.index()),
                }),
            },
            None => {
                let label = category_at(record, self.idx, self.name)?;
                Ok(slots.insert(label))
            }
        }
    }
}

/// Group labels discovered (or declared) during a pass.
pub(crate) struct GroupSlots {
    labels: Vec<Category>,
    index: HashMap<Category, usize>,
    declared: bool,
}

impl GroupSlots {
    fn insert(&mut self, label: Category) -> usize {
        if let Some(&slot) = self.index.get(&label) {
            return slot;
        }
        let slot = self.labels.len();
        self.index.insert(label.clone(), slot);
        self.labels.push(label);
        slot
    }

    /// Final row order plus a `slot -> row` mapping.
    ///
    /// Declared (bucketed) labels keep their order; discovered labels are sorted canonically.
    pub(crate) fn into_ordered(self) -> (Vec<Category>, Vec<usize>) {
        if self.declared {
            let rank = (0..self.labels.len()).collect();
            return (self.labels, rank);
        }

        let mut by_label: Vec<(Category, usize)> = self
            .labels
            .into_iter()
            .enumerate()
            .map(|(slot, label)| (label, slot))
            .collect();
        by_label.sort();

        let mut rank = vec![0; by_label.len()];
        let mut labels = Vec::with_capacity(by_label.len());
        for (row, (label, slot)) in by_label.into_iter().enumerate() {
            rank[slot] = row;
            labels.push(label);
        }
        (labels, rank)
    }
}

/// Schema index of a field whose values are used as categories (outcome values).
pub(crate) fn categorical_index(schema: &Schema, name: &str) -> TabulationResult<usize> {
    let (idx, field) = schema.require(name)?;
    match field.data_type {
        DataType::Float64 => Err(not_categorical(name, field.data_type)),
        _ => Ok(idx),
    }
}

/// Category of the value at `idx` in `record`.
pub(crate) fn category_at(record: &Record<'_>, idx: usize, field: &str) -> TabulationResult<Category> {
    let value = value_at(record, idx, field)?;
    Category::from_value(value).ok_or_else(|| match value {
        Value::Null => TabulationError::MissingValue {
            row: record.index(),
            field: field.to_owned(),
        },
        other => TabulationError::TypeMismatch {
            field: field.to_owned(),
            expected: "a categorical value (Int64, Bool or Utf8)".to_string(),
            found: format!("{other:?} at row {}", record.index()),
        },
    })
}

fn value_at<'r>(record: &Record<'r>, idx: usize, field: &str) -> TabulationResult<&'r Value> {
    record.value_at(idx).ok_or_else(|| TabulationError::InvalidRecord {
        row: record.index(),
        message: format!("no value for field '{field}'"),
    })
}

fn not_categorical(field: &str, found: DataType) -> TabulationError {
    TabulationError::TypeMismatch {
        field: field.to_owned(),
        expected: "a categorical type (Int64, Bool or Utf8)".to_string(),
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::GroupSlots;
    use crate::types::Category;
    use std::collections::HashMap;

    #[test]
    fn discovered_labels_are_sorted_and_ranked() {
        let mut slots = GroupSlots {
            labels: Vec::new(),
            index: HashMap::new(),
            declared: false,
        };
        assert_eq!(slots.insert(Category::from("M")), 0);
        assert_eq!(slots.insert(Category::from("F")), 1);
        assert_eq!(slots.insert(Category::from("M")), 0);

        let (labels, rank) = slots.into_ordered();
        assert_eq!(labels, vec![Category::from("F"), Category::from("M")]);
        assert_eq!(rank, vec![1, 0]);
    }

    #[test]
    fn declared_labels_keep_their_order() {
        let mut slots = GroupSlots {
            labels: Vec::new(),
            index: HashMap::new(),
            declared: true,
        };
        slots.insert(Category::from("18-22"));
        slots.insert(Category::from("15-17"));

        let (labels, rank) = slots.into_ordered();
        assert_eq!(labels, vec![Category::from("18-22"), Category::from("15-17")]);
        assert_eq!(rank, vec![0, 1]);
    }
}
