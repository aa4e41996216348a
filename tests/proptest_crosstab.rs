use fairness_crosstab::TabulationError;
use fairness_crosstab::tabulation::{bucket_label, frequency, tabulate, Bucket, BucketSpec};
use fairness_crosstab::types::{DataSet, DataType, Field, Schema, Value};
use proptest::prelude::*;
use proptest::test_runner::FileFailurePersistence;

fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config
}

fn schema() -> Schema {
    Schema::new(vec![
        Field::new("sex", DataType::Utf8),
        Field::new("age", DataType::Int64),
        Field::new("G1", DataType::Int64),
        Field::new("G3", DataType::Int64),
    ])
}

fn arb_student() -> impl Strategy<Value = Vec<Value>> {
    (prop_oneof![Just("F"), Just("M")], 15i64..=22, 0i64..=20, 0i64..=20).prop_map(
        |(sex, age, g1, g3)| {
            vec![
                Value::text(sex),
                Value::Int64(age),
                Value::Int64(g1),
                Value::Int64(g3),
            ]
        },
    )
}

fn arb_dataset(max_rows: usize) -> impl Strategy<Value = DataSet> {
    prop::collection::vec(arb_student(), 0..=max_rows)
        .prop_map(|rows| DataSet::new(schema(), rows).expect("generated rows match schema"))
}

/// Contiguous buckets built from a start value and a list of widths.
fn arb_bucket_spec() -> impl Strategy<Value = BucketSpec> {
    (-50i64..50, prop::collection::vec(1i64..10, 1..6)).prop_map(|(start, widths)| {
        let mut lower = start;
        let buckets = widths
            .into_iter()
            .enumerate()
            .map(|(i, width)| {
                let upper = lower + width - 1;
                let bucket = Bucket::new(format!("b{i}"), lower, upper);
                lower = upper + 1;
                bucket
            })
            .collect();
        BucketSpec::new(buckets).expect("contiguous buckets are valid")
    })
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn margins_match_cells(ds in arb_dataset(40), bucketed in any::<bool>()) {
        let spec = BucketSpec::student_age_two_groups();
        let ct = if bucketed {
            tabulate(&ds, "age", &["G1", "G3"], Some(&spec)).expect("tabulate by age group")
        } else {
            tabulate(&ds, "sex", &["G1", "G3"], None).expect("tabulate by sex")
        };

        for table in ct.outcomes() {
            let cells = table.cells();
            for (row, total) in cells.iter().zip(table.row_totals()) {
                prop_assert_eq!(row.iter().sum::<u64>(), *total);
            }
            for (c, total) in table.column_totals().iter().enumerate() {
                prop_assert_eq!(cells.iter().map(|row| row[c]).sum::<u64>(), *total);
            }
            prop_assert_eq!(table.row_totals().iter().sum::<u64>(), table.grand_total());
            prop_assert_eq!(table.column_totals().iter().sum::<u64>(), table.grand_total());
            prop_assert_eq!(table.grand_total(), ds.row_count() as u64);
        }
    }

    #[test]
    fn frequency_matches_crosstab_row_totals(ds in arb_dataset(40)) {
        let spec = BucketSpec::student_age_three_groups();
        let freq = frequency(&ds, "age", Some(&spec)).expect("frequency");
        let ct = tabulate(&ds, "age", &["G1"], Some(&spec)).expect("tabulate");
        let g1 = ct.outcome("G1").expect("G1 table");

        let counts: Vec<u64> = freq.entries().iter().map(|e| e.count).collect();
        prop_assert_eq!(counts.as_slice(), g1.row_totals());
        prop_assert_eq!(freq.total(), ds.row_count() as u64);
    }

    #[test]
    fn tabulate_is_idempotent(ds in arb_dataset(30)) {
        let first = tabulate(&ds, "sex", &["G1", "G3"], None).expect("first run");
        let second = tabulate(&ds, "sex", &["G1", "G3"], None).expect("second run");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn bucketer_is_total_on_its_domain(spec in arb_bucket_spec(), offset in 0i64..60) {
        let value = spec.min() + offset;
        if value <= spec.max() {
            let label = bucket_label(value, &spec).expect("value inside domain");
            let containing: Vec<_> = spec.buckets().iter().filter(|b| b.contains(value)).collect();
            prop_assert_eq!(containing.len(), 1);
            prop_assert_eq!(containing[0].label.as_str(), label);
        } else {
            let is_domain_error = matches!(bucket_label(value, &spec), Err(TabulationError::Domain { .. }));
            prop_assert!(is_domain_error);
        }
    }

    #[test]
    fn values_below_the_domain_are_rejected(spec in arb_bucket_spec(), below in 1i64..100) {
        let is_domain_error = matches!(
            bucket_label(spec.min() - below, &spec),
            Err(TabulationError::Domain { .. })
        );
        prop_assert!(is_domain_error);
    }
}
