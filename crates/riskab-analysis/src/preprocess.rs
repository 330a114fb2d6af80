//! Dataset cleaning helpers
//!
//! Preparation steps applied before the hypothesis tests run: inspecting and
//! removing missing values, imputing categorical gaps and capping outliers.
//! Unlike the test runner, these functions mutate the dataset and may change
//! its row count.

use std::{cmp::Ordering, collections::HashMap};

use log::debug;
use riskab_stats::quantile::compute_quantile;

use crate::dataset::{Dataset, DatasetError, Value};

/// Multiplier of the interquartile range used for outlier bounds.
pub const IQR_FACTOR: f64 = 1.5;

/// Percentage of missing values per column, in column order.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn missing_percentage(dataset: &Dataset) -> Vec<(String, f64)> {
    let rows = dataset.num_rows();
    dataset
        .columns()
        .iter()
        .map(|column| {
            let pct = if rows == 0 {
                0.0
            } else {
                column.missing_count() as f64 / rows as f64 * 100.0
            };
            (column.name().to_owned(), pct)
        })
        .collect()
}

/// Drops rows with a missing value in any column whose missing percentage is
/// below `threshold`.
///
/// Columns at or above the threshold are considered too sparse to filter on
/// and are left for imputation or removal. Returns the number of dropped rows.
pub fn drop_rows_with_missing(dataset: &mut Dataset, threshold: f64) -> usize {
    let sparse_enough = missing_percentage(dataset)
        .into_iter()
        .filter(|(_, pct)| *pct > 0.0 && *pct < threshold)
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    if sparse_enough.is_empty() {
        return 0;
    }

    let has_missing = (0..dataset.num_rows())
        .map(|row| {
            dataset
                .columns()
                .iter()
                .filter(|c| sparse_enough.iter().any(|name| name == c.name()))
                .any(|c| c.values()[row].is_missing())
        })
        .collect::<Vec<_>>();

    let before = dataset.num_rows();
    dataset.retain_rows(|row| !has_missing[row]);
    let dropped = before - dataset.num_rows();
    debug!(
        "dropped {dropped} rows with missing values in {}",
        sparse_enough.join(", ")
    );
    dropped
}

/// Replaces missing values of `column` with its most frequent value.
///
/// Ties go to the smallest value: numbers in numeric order come before text,
/// and text compares lexicographically. Returns the fill value, or `None`
/// when the column has no non-missing values.
pub fn fill_missing_with_mode(
    dataset: &mut Dataset,
    column: &str,
) -> Result<Option<Value>, DatasetError> {
    let values = dataset.column(column)?.values();

    // label -> (count, first row)
    let mut counts = HashMap::<String, (usize, usize)>::new();
    for (row, value) in values.iter().enumerate() {
        if let Some(label) = value.category() {
            counts.entry(label).or_insert((0, row)).0 += 1;
        }
    }
    let Some(&(_, first_row)) = counts
        .values()
        .max_by(|(count_a, row_a), (count_b, row_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| compare_values(&values[*row_b], &values[*row_a]))
        })
    else {
        return Ok(None);
    };
    let mode = values[first_row].clone();

    let mut filled = 0;
    for value in dataset.column_mut(column)?.values_mut() {
        if value.is_missing() {
            *value = mode.clone();
            filled += 1;
        }
    }
    debug!("filled {filled} missing values in '{column}' with '{mode}'");
    Ok(Some(mode))
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Number(_), _) | (Value::Text(_), Value::Missing) => Ordering::Less,
        (Value::Missing, Value::Missing) => Ordering::Equal,
        _ => Ordering::Greater,
    }
}

/// Outlier bounds `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`, `None` for no values.
///
/// # Examples
///
/// ```
/// use riskab_analysis::preprocess::iqr_bounds;
///
/// let (lower, upper) = iqr_bounds(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!((lower, upper), (-1.0, 7.0));
/// ```
#[must_use]
pub fn iqr_bounds(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = compute_quantile(&sorted, 0.25);
    let q3 = compute_quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - IQR_FACTOR * iqr, q3 + IQR_FACTOR * iqr))
}

/// Clips each numeric column in `columns` to its IQR outlier bounds.
///
/// Missing values are left untouched. Returns the number of clipped values.
pub fn cap_outliers<S>(dataset: &mut Dataset, columns: &[S]) -> Result<usize, DatasetError>
where
    S: AsRef<str>,
{
    let mut clipped = 0;
    for name in columns {
        let name = name.as_ref();
        let Some((lower, upper)) = iqr_bounds(&dataset.numeric_column(name)?) else {
            continue;
        };
        let mut column_clipped = 0;
        for value in dataset.column_mut(name)?.values_mut() {
            let Value::Number(n) = value else {
                continue;
            };
            if *n < lower || *n > upper {
                *n = n.clamp(lower, upper);
                column_clipped += 1;
            }
        }
        debug!("capped {column_clipped} values of '{name}' to [{lower}, {upper}]");
        clipped += column_clipped;
    }
    Ok(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "Gender",
                [
                    Value::from("Male"),
                    Value::Missing,
                    Value::from("Female"),
                    Value::from("Female"),
                    Value::from("Male"),
                ],
            ),
            Column::new(
                "TotalPremium",
                [Some(10.0), Some(11.0), None, Some(12.0), Some(1000.0)],
            ),
            Column::new("Bank", vec![Value::Missing; 5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_percentage() {
        let pct = missing_percentage(&sample());
        assert_eq!(
            pct,
            vec![
                ("Gender".to_owned(), 20.0),
                ("TotalPremium".to_owned(), 20.0),
                ("Bank".to_owned(), 100.0),
            ]
        );
    }

    #[test]
    fn test_drop_rows_with_missing_ignores_sparse_columns() {
        let mut dataset = sample();
        let dropped = drop_rows_with_missing(&mut dataset, 50.0);
        assert_eq!(dropped, 2);
        assert_eq!(dataset.num_rows(), 3);
        assert_eq!(dataset.column("Bank").unwrap().missing_count(), 3);
    }

    #[test]
    fn test_fill_missing_with_mode_breaks_ties_by_smallest_value() {
        let mut dataset = sample();
        let mode = fill_missing_with_mode(&mut dataset, "Gender").unwrap();
        assert_eq!(mode, Some(Value::from("Female")));
        assert_eq!(dataset.column("Gender").unwrap().missing_count(), 0);
        assert_eq!(dataset.column("Gender").unwrap().values()[1], Value::from("Female"));
    }

    #[test]
    fn test_fill_missing_with_mode_prefers_most_frequent() {
        let mut dataset = Dataset::new(vec![Column::new(
            "PostalCode",
            [
                Value::from("B"),
                Value::Number(2000.0),
                Value::Missing,
                Value::from("A"),
                Value::Number(122.0),
                Value::from("B"),
            ],
        )])
        .unwrap();
        let mode = fill_missing_with_mode(&mut dataset, "PostalCode").unwrap();
        assert_eq!(mode, Some(Value::from("B")));

        let mut dataset = Dataset::new(vec![Column::new(
            "PostalCode",
            [Value::from("A"), Value::Number(2000.0), Value::Missing, Value::Number(122.0)],
        )])
        .unwrap();
        let mode = fill_missing_with_mode(&mut dataset, "PostalCode").unwrap();
        assert_eq!(mode, Some(Value::Number(122.0)));
    }

    #[test]
    fn test_fill_missing_with_mode_all_missing() {
        let mut dataset = sample();
        assert_eq!(fill_missing_with_mode(&mut dataset, "Bank").unwrap(), None);
    }

    #[test]
    fn test_cap_outliers() {
        let mut dataset = sample();
        let clipped = cap_outliers(&mut dataset, &["TotalPremium"]).unwrap();
        assert_eq!(clipped, 1);

        let (_, upper) = iqr_bounds(&[10.0, 11.0, 12.0, 1000.0]).unwrap();
        let values = dataset.column("TotalPremium").unwrap().values();
        assert_eq!(values[4], Value::Number(upper));
        assert_eq!(values[2], Value::Missing);
        assert_eq!(values[0], Value::Number(10.0));
    }

    #[test]
    fn test_cap_outliers_unknown_column() {
        let mut dataset = sample();
        assert!(matches!(
            cap_outliers(&mut dataset, &["Claims"]),
            Err(DatasetError::ColumnNotFound { .. })
        ));
    }
}
