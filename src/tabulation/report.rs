//! Frequency report: every protected attribute against every outcome attribute.

use std::fmt;

use serde::Serialize;

use crate::error::TabulationResult;
use crate::types::DataSet;

use super::bucket::BucketSpec;
use super::crosstab::CrossTab;
use super::engine::tabulate;
use super::frequency::{frequency, FrequencyTable};

/// An attribute checked for disparate treatment, optionally bucketed.
///
/// `field` is the dataset field; `name` is how it is reported (e.g. `age` reported as
/// `age_group` once bucketed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedAttribute {
    field: String,
    name: String,
    buckets: Option<BucketSpec>,
}

impl ProtectedAttribute {
    /// A categorical attribute reported under its own name.
    pub fn categorical(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            name: field.clone(),
            field,
            buckets: None,
        }
    }

    /// An integer attribute grouped through `spec` and reported as `name`.
    pub fn bucketed(field: impl Into<String>, name: impl Into<String>, spec: BucketSpec) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            buckets: Some(spec),
        }
    }

    /// Report the attribute under `name` instead.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// `sex`, and `age` bucketed into `age_group` (15-17, 18-22).
    pub fn student_defaults() -> Vec<Self> {
        vec![
            Self::categorical("sex"),
            Self::bucketed("age", "age_group", BucketSpec::student_age_two_groups()),
        ]
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bucket_spec(&self) -> Option<&BucketSpec> {
        self.buckets.as_ref()
    }
}

/// Frequency table and cross-tabulation for one protected attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    attribute: String,
    field: String,
    frequency: FrequencyTable,
    crosstab: CrossTab,
}

impl ReportSection {
    pub(crate) fn new(protected: &ProtectedAttribute, frequency: FrequencyTable, crosstab: CrossTab) -> Self {
        Self {
            attribute: protected.name().to_owned(),
            field: protected.field().to_owned(),
            frequency,
            crosstab,
        }
    }

    /// Reported attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Underlying dataset field.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn frequency(&self) -> &FrequencyTable {
        &self.frequency
    }

    pub fn crosstab(&self) -> &CrossTab {
        &self.crosstab
    }
}

/// One [`ReportSection`] per protected attribute, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyReport {
    sections: Vec<ReportSection>,
}

impl FrequencyReport {
    /// Tabulate every protected attribute against every outcome attribute.
    ///
    /// Any error aborts the whole report.
    pub fn build(
        dataset: &DataSet,
        protected: &[ProtectedAttribute],
        outcomes: &[&str],
    ) -> TabulationResult<Self> {
        let mut sections = Vec::with_capacity(protected.len());
        for attr in protected {
            let freq = frequency(dataset, attr.field(), attr.bucket_spec())?.with_attribute(attr.name());
            let crosstab = tabulate(dataset, attr.field(), outcomes, attr.bucket_spec())?
                .with_group_attribute(attr.name());
            sections.push(ReportSection::new(attr, freq, crosstab));
        }
        Ok(Self { sections })
    }

    pub(crate) fn from_sections(sections: Vec<ReportSection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    /// Section for a reported attribute name.
    pub fn section(&self, attribute: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.attribute == attribute)
    }

    /// Serialize the report for a presentation layer.
    pub fn to_json_pretty(&self) -> TabulationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for FrequencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            writeln!(f, "Frequency table for {}:", section.attribute)?;
            writeln!(f, "{}", section.frequency)?;
            writeln!(f)?;
            write!(f, "{}", section.crosstab)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FrequencyReport, ProtectedAttribute};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn students() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("sex", DataType::Utf8),
            Field::new("age", DataType::Int64),
            Field::new("G1", DataType::Int64),
            Field::new("G2", DataType::Int64),
        ]);
        let rows = [("F", 15, 10, 11), ("M", 18, 12, 12), ("F", 21, 8, 9)]
            .into_iter()
            .map(|(sex, age, g1, g2)| {
                vec![
                    Value::text(sex),
                    Value::Int64(age),
                    Value::Int64(g1),
                    Value::Int64(g2),
                ]
            })
            .collect();
        DataSet::new(schema, rows).unwrap()
    }

    #[test]
    fn report_has_one_section_per_protected_attribute() {
        let report = FrequencyReport::build(
            &students(),
            &ProtectedAttribute::student_defaults(),
            &["G1", "G2"],
        )
        .unwrap();

        assert_eq!(report.sections().len(), 2);
        let age = report.section("age_group").unwrap();
        assert_eq!(age.field(), "age");
        assert_eq!(age.frequency().attribute(), "age_group");
        assert_eq!(age.frequency().count("18-22"), 2);
        assert_eq!(age.crosstab().group_attribute(), "age_group");
        assert_eq!(age.crosstab().outcomes().len(), 2);
        assert_eq!(age.crosstab().outcome("G2").unwrap().count("15-17", 11), 1);
        assert!(report.section("age").is_none());
    }

    #[test]
    fn display_mirrors_frequency_printout() {
        let report = FrequencyReport::build(
            &students(),
            &[ProtectedAttribute::categorical("sex")],
            &["G1"],
        )
        .unwrap();
        let text = report.to_string();
        assert!(text.starts_with("Frequency table for sex:\nsex\nF   2\nM   1\n\nsex vs G1:\n"));
        assert!(text.ends_with("All 1  1  1   3"));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = FrequencyReport::build(
            &students(),
            &[ProtectedAttribute::categorical("sex")],
            &["G1"],
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["sections"][0]["attribute"], "sex");
        assert_eq!(json["sections"][0]["frequency"]["total"], 3);
        assert_eq!(json["sections"][0]["crosstab"]["tables"][0]["grand_total"], 3);
    }
}
