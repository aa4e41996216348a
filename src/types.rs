//! Core data model types.
//!
//! A [`DataSet`] is an ordered list of rows sharing a [`Schema`] (a list of typed [`Field`]s).
//! Rows are validated once, when the dataset is built: every row must carry one non-null value
//! of the declared type per field. Aggregation code can then rely on the shape without
//! re-checking it.
//!
//! [`Category`] is the ordered, hashable key used for group labels and outcome values in
//! cross-tabulations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TabulationError, TabulationResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int64 => "Int64",
            DataType::Float64 => "Float64",
            DataType::Bool => "Bool",
            DataType::Utf8 => "Utf8",
        };
        f.write_str(name)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of every row in a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the index and field for `name`, or [`TabulationError::Schema`] if it is absent.
    pub fn require(&self, name: &str) -> TabulationResult<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
            .ok_or_else(|| TabulationError::Schema {
                field: name.to_owned(),
                available: self.field_names().map(str::to_owned).collect(),
            })
    }
}

/// A single typed value in a [`DataSet`] row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value. Rejected by [`DataSet::new`].
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// The data type of this value, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// Convenience constructor for string values.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Utf8(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// A categorical key: a group label or an outcome value in a cross-tabulation.
///
/// The derived ordering is the canonical order used for unbucketed groups and for outcome
/// columns: booleans first, then integers ascending, then text in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Category {
    /// Convert a dataset value into a category.
    ///
    /// Returns `None` for floats (not categorical) and nulls.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(Category::Int(*v)),
            Value::Bool(v) => Some(Category::Bool(*v)),
            Value::Utf8(s) => Some(Category::Text(s.clone())),
            Value::Float64(_) | Value::Null => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Bool(v) => write!(f, "{v}"),
            Category::Int(v) => write!(f, "{v}"),
            Category::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::Text(s.to_owned())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::Text(s)
    }
}

impl From<i64> for Category {
    fn from(v: i64) -> Self {
        Category::Int(v)
    }
}

impl From<i32> for Category {
    fn from(v: i32) -> Self {
        Category::Int(i64::from(v))
    }
}

impl From<bool> for Category {
    fn from(v: bool) -> Self {
        Category::Bool(v)
    }
}

/// A borrowed view of one row of a [`DataSet`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    schema: &'a Schema,
    values: &'a [Value],
    index: usize,
}

impl<'a> Record<'a> {
    /// Zero-based position of this record in its dataset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of the named field, if the field exists.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.schema.index_of(name).and_then(|idx| self.values.get(idx))
    }

    /// Value at a schema position.
    pub fn value_at(&self, idx: usize) -> Option<&'a Value> {
        self.values.get(idx)
    }

    /// All values in schema order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored row-major in the same order as the [`Schema`] fields. The dataset is
/// read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows, validating every row against the schema.
    ///
    /// Fails with:
    ///
    /// - [`TabulationError::InvalidArgument`] if the schema repeats a field name
    /// - [`TabulationError::InvalidRecord`] if a row has the wrong number of values
    /// - [`TabulationError::MissingValue`] if a row holds [`Value::Null`]
    /// - [`TabulationError::TypeMismatch`] if a value does not match its field's type
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> TabulationResult<Self> {
        for (i, field) in schema.fields.iter().enumerate() {
            if schema.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(TabulationError::InvalidArgument {
                    message: format!("duplicate field '{}' in schema", field.name),
                });
            }
        }

        let expected_len = schema.fields.len();
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != expected_len {
                return Err(TabulationError::InvalidRecord {
                    row: row_idx,
                    message: format!(
                        "row has {} values but schema has {} fields",
                        row.len(),
                        expected_len
                    ),
                });
            }
            for (field, value) in schema.fields.iter().zip(row.iter()) {
                match value.data_type() {
                    None => {
                        return Err(TabulationError::MissingValue {
                            row: row_idx,
                            field: field.name.clone(),
                        });
                    }
                    Some(dt) if dt != field.data_type => {
                        return Err(TabulationError::TypeMismatch {
                            field: field.name.clone(),
                            expected: field.data_type.to_string(),
                            found: format!("{dt} at row {row_idx}"),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self { schema, rows })
    }

    /// Create a dataset with no rows.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Schema shared by every row.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major value storage.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Record view of row `index`.
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|values| Record {
            schema: &self.schema,
            values,
            index,
        })
    }

    /// Iterate records in order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().enumerate().map(|(index, values)| Record {
            schema: &self.schema,
            values,
            index,
        })
    }
}
