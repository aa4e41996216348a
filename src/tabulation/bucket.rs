//! Age bucketing: mapping an integer value to the label of the range that contains it.
//!
//! Every [`Bucket`] is a closed integer range `[lower, upper]`. A [`BucketSpec`] is an
//! ascending list of buckets that must be contiguous (`next.lower == prev.upper + 1`), so every
//! integer between the first `lower` and the last `upper` maps to exactly one label. A value on
//! a boundary belongs to the bucket that names it.

use serde::{Deserialize, Serialize};

use crate::error::{TabulationError, TabulationResult};

/// A labeled closed range `[lower, upper]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Label reported for values in this range.
    pub label: String,
    /// Smallest value in the range (inclusive).
    pub lower: i64,
    /// Largest value in the range (inclusive).
    pub upper: i64,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(label: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            label: label.into(),
            lower,
            upper,
        }
    }

    /// True when `value` lies in `[lower, upper]`.
    pub fn contains(&self, value: i64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// An ordered, gap-free, non-overlapping list of [`Bucket`]s.
///
/// Built once and validated at construction; bucketing never re-derives boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSpec {
    buckets: Vec<Bucket>,
}

impl BucketSpec {
    /// Build a spec from explicit buckets, listed in ascending order.
    ///
    /// Fails with [`TabulationError::InvalidBucketSpec`] if the list is empty, a label is empty
    /// or repeated, a bucket has `lower > upper`, or two consecutive buckets overlap or leave a gap.
    pub fn new(buckets: Vec<Bucket>) -> TabulationResult<Self> {
        if buckets.is_empty() {
            return Err(invalid("bucket spec must contain at least one bucket"));
        }

        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.label.is_empty() {
                return Err(invalid(format!("bucket #{i} has an empty label")));
            }
            if bucket.lower > bucket.upper {
                return Err(invalid(format!(
                    "bucket '{}' has lower bound {} above upper bound {}",
                    bucket.label, bucket.lower, bucket.upper
                )));
            }
            if buckets[..i].iter().any(|b| b.label == bucket.label) {
                return Err(invalid(format!("duplicate bucket label '{}'", bucket.label)));
            }
        }

        for pair in buckets.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            match prev.upper.checked_add(1) {
                Some(expected) if next.lower == expected => {}
                Some(expected) if next.lower > expected => {
                    return Err(invalid(format!(
                        "gap between '{}' (ends at {}) and '{}' (starts at {})",
                        prev.label, prev.upper, next.label, next.lower
                    )));
                }
                _ => {
                    return Err(invalid(format!(
                        "'{}' [{}, {}] overlaps or precedes '{}' [{}, {}]",
                        next.label, next.lower, next.upper, prev.label, prev.lower, prev.upper
                    )));
                }
            }
        }

        Ok(Self { buckets })
    }

    /// Build a spec from right-closed bin edges: bucket `i` covers `(edges[i], edges[i + 1]]`.
    ///
    /// `edges = [14, 17, 22]` with labels `["15-17", "18-22"]` yields `[15, 17]` and `[18, 22]`.
    pub fn from_edges(edges: &[i64], labels: &[&str]) -> TabulationResult<Self> {
        if edges.len() < 2 {
            return Err(invalid("at least two bin edges are required"));
        }
        if labels.len() != edges.len() - 1 {
            return Err(invalid(format!(
                "{} edges need {} labels, got {}",
                edges.len(),
                edges.len() - 1,
                labels.len()
            )));
        }

        let mut buckets = Vec::with_capacity(labels.len());
        for (pair, label) in edges.windows(2).zip(labels) {
            if pair[1] <= pair[0] {
                return Err(invalid(format!(
                    "bin edges must be strictly increasing ({} then {})",
                    pair[0], pair[1]
                )));
            }
            // pair[0] < pair[1] <= i64::MAX, so the increment cannot overflow.
            buckets.push(Bucket::new(*label, pair[0] + 1, pair[1]));
        }
        Self::new(buckets)
    }

    /// Canonical student age grouping: `15-17` and `18-22`.
    pub fn student_age_two_groups() -> Self {
        Self {
            buckets: vec![Bucket::new("15-17", 15, 17), Bucket::new("18-22", 18, 22)],
        }
    }

    /// Alternative three-way student age grouping: `15-16`, `17-19` and `20-22`.
    pub fn student_age_three_groups() -> Self {
        Self {
            buckets: vec![
                Bucket::new("15-16", 15, 16),
                Bucket::new("17-19", 17, 19),
                Bucket::new("20-22", 20, 22),
            ],
        }
    }

    /// Buckets in declared order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Labels in declared order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.label.as_str())
    }

    /// Smallest value covered by any bucket.
    pub fn min(&self) -> i64 {
        self.buckets[0].lower
    }

    /// Largest value covered by any bucket.
    pub fn max(&self) -> i64 {
        self.buckets[self.buckets.len() - 1].upper
    }

    /// Position of the bucket containing `value`, if any.
    pub fn position_of(&self, value: i64) -> Option<usize> {
        let idx = self.buckets.partition_point(|b| b.upper < value);
        self.buckets
            .get(idx)
            .filter(|b| b.lower <= value)
            .map(|_| idx)
    }

    /// Position of the bucket containing `value`.
    ///
    /// Fails with [`TabulationError::Domain`] when `value` is outside `[min, max]`.
    pub fn index_for(&self, value: i64) -> TabulationResult<usize> {
        self.position_of(value).ok_or_else(|| TabulationError::Domain {
            value,
            min: self.min(),
            max: self.max(),
        })
    }

    /// Label of the bucket containing `value`.
    ///
    /// Fails with [`TabulationError::Domain`] when `value` is outside `[min, max]`.
    pub fn label_for(&self, value: i64) -> TabulationResult<&str> {
        let idx = self.index_for(value)?;
        Ok(self.buckets[idx].label.as_str())
    }
}

/// Map `value` to its bucket label under `spec`.
///
/// Free-function form of [`BucketSpec::label_for`].
pub fn bucket_label(value: i64, spec: &BucketSpec) -> TabulationResult<&str> {
    spec.label_for(value)
}

fn invalid(message: impl Into<String>) -> TabulationError {
    TabulationError::InvalidBucketSpec {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{bucket_label, Bucket, BucketSpec};
    use crate::error::TabulationError;

    #[test]
    fn boundaries_belong_to_the_bucket_that_names_them() {
        let spec = BucketSpec::student_age_two_groups();
        assert_eq!(spec.label_for(15).unwrap(), "15-17");
        assert_eq!(spec.label_for(17).unwrap(), "15-17");
        assert_eq!(spec.label_for(18).unwrap(), "18-22");
        assert_eq!(spec.label_for(22).unwrap(), "18-22");
    }

    #[test]
    fn values_outside_domain_are_domain_errors() {
        let spec = BucketSpec::student_age_two_groups();
        for value in [14, 23, i64::MIN, i64::MAX] {
            match bucket_label(value, &spec).unwrap_err() {
                TabulationError::Domain { value: v, min, max } => {
                    assert_eq!(v, value);
                    assert_eq!((min, max), (15, 22));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn every_value_in_domain_has_exactly_one_bucket() {
        let spec = BucketSpec::student_age_three_groups();
        for value in spec.min()..=spec.max() {
            let hits = spec.buckets().iter().filter(|b| b.contains(value)).count();
            assert_eq!(hits, 1, "value {value}");
            assert!(spec.label_for(value).is_ok());
        }
    }

    #[test]
    fn from_edges_matches_right_closed_bins() {
        let spec = BucketSpec::from_edges(&[14, 17, 22], &["15-17", "18-22"]).unwrap();
        assert_eq!(spec, BucketSpec::student_age_two_groups());

        let spec = BucketSpec::from_edges(&[14, 16, 19, 22], &["15-16", "17-19", "20-22"]).unwrap();
        assert_eq!(spec, BucketSpec::student_age_three_groups());
    }

    #[test]
    fn from_edges_rejects_bad_input() {
        assert!(BucketSpec::from_edges(&[14], &[]).is_err());
        assert!(BucketSpec::from_edges(&[14, 17, 22], &["only-one"]).is_err());
        let err = BucketSpec::from_edges(&[14, 14], &["x"]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn new_rejects_gaps_and_overlaps() {
        let gap = BucketSpec::new(vec![Bucket::new("a", 15, 16), Bucket::new("b", 18, 22)]);
        assert!(gap.unwrap_err().to_string().contains("gap between 'a'"));

        let overlap = BucketSpec::new(vec![Bucket::new("a", 15, 17), Bucket::new("b", 17, 22)]);
        assert!(overlap.unwrap_err().to_string().contains("overlaps"));

        let unordered = BucketSpec::new(vec![Bucket::new("b", 18, 22), Bucket::new("a", 15, 17)]);
        assert!(unordered.is_err());
    }

    #[test]
    fn new_rejects_empty_and_malformed_buckets() {
        assert!(BucketSpec::new(Vec::new()).is_err());
        assert!(BucketSpec::new(vec![Bucket::new("", 1, 2)]).is_err());
        assert!(BucketSpec::new(vec![Bucket::new("x", 3, 2)]).is_err());
        let dup = BucketSpec::new(vec![Bucket::new("x", 1, 2), Bucket::new("x", 3, 4)]);
        assert!(dup.unwrap_err().to_string().contains("duplicate bucket label"));
    }

    #[test]
    fn single_value_buckets_and_extreme_bounds() {
        let spec = BucketSpec::new(vec![
            Bucket::new("low", i64::MIN, 0),
            Bucket::new("zero", 1, 1),
            Bucket::new("high", 2, i64::MAX),
        ])
        .unwrap();
        assert_eq!(spec.label_for(i64::MIN).unwrap(), "low");
        assert_eq!(spec.label_for(1).unwrap(), "zero");
        assert_eq!(spec.label_for(i64::MAX).unwrap(), "high");
        assert_eq!(spec.labels().collect::<Vec<_>>(), vec!["low", "zero", "high"]);
    }
}
