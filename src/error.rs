use thiserror::Error;

/// Convenience result type for tabulation operations.
pub type TabulationResult<T> = Result<T, TabulationError>;

/// Error type returned by dataset construction, bucketing, tabulation and fairness metrics.
///
/// Every error aborts the operation that produced it; no partial results are returned.
#[derive(Debug, Error)]
pub enum TabulationError {
    /// A required field is not part of the dataset schema.
    #[error("schema error: field '{field}' not found (fields={available:?})")]
    Schema {
        field: String,
        available: Vec<String>,
    },

    /// A value falls outside the range covered by a [`crate::tabulation::BucketSpec`].
    #[error("domain error: value {value} is outside the bucket domain [{min}, {max}]")]
    Domain {
        value: i64,
        min: i64,
        max: i64,
    },

    /// A bucket specification has gaps, overlaps, bad bounds or duplicate labels.
    #[error("invalid bucket spec: {message}")]
    InvalidBucketSpec { message: String },

    /// A row does not match the shape of the schema.
    #[error("invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// A row holds [`crate::types::Value::Null`] for a field.
    #[error("missing value at row {row} for field '{field}'")]
    MissingValue { row: usize, field: String },

    /// A value or field has a type the operation cannot use.
    #[error("type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// An argument is unusable regardless of the data (e.g. no outcome attributes).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A group label is not a row of the cross-tabulation.
    #[error("unknown group '{group}'")]
    UnknownGroup { group: String },

    /// A fairness metric cannot be computed for the given counts.
    #[error("{metric} is undefined: {reason}")]
    UndefinedMetric { metric: String, reason: String },

    /// Configuration content is well-formed JSON but semantically invalid.
    #[error("config error: {message}")]
    Config { message: String },

    /// Underlying I/O error while reading a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
