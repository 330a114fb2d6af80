//! Group partitioning and validity gating
//!
//! Turns a `(dataset, group_key, value_column)` triple into numeric groups and
//! filters out groups the variance-based tests cannot use.
//!
//! ```text
//! Dataset ──group_by(key)──▶ RowGroup* ──numeric_values(column)──▶ Group*
//!                                                                    │
//!                                              ValidityGate::apply ◀─┘
//!                                                    │
//!                              Ok(valid groups) or Err(GateFailure)
//! ```
//!
//! A group is valid when it holds at least `min_group_size` observations and
//! its sample variance exceeds `variance_epsilon`. Gate failures are expected
//! statistical edge cases, so they are not errors: the test runner records
//! them in the [`TestResult`](crate::result::TestResult) instead.

use log::debug;
use riskab_stats::descriptive::{mean, sample_variance};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::{Dataset, DatasetError},
    result::GroupSummary,
};

/// Numeric observations of one column for one key value.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: String,
    pub values: Vec<f64>,
}

impl Group {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample variance, `None` for fewer than 2 observations.
    #[must_use]
    pub fn variance(&self) -> Option<f64> {
        sample_variance(&self.values)
    }

    #[must_use]
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            key: self.key.clone(),
            count: self.len(),
            mean: mean(&self.values),
            variance: self.variance(),
        }
    }
}

/// Splits `value_column` into groups keyed by `group_key`.
///
/// Groups follow first-encountered key order. Missing values are dropped per
/// group, so a group may end up empty when all of its values are missing.
pub fn partition(
    dataset: &Dataset,
    group_key: &str,
    value_column: &str,
) -> Result<Vec<Group>, DatasetError> {
    // Fail on a missing value column even when the key column is empty.
    dataset.column(value_column)?;
    dataset
        .group_by(group_key)?
        .into_iter()
        .map(|rows| {
            Ok::<_, DatasetError>(Group {
                values: dataset.numeric_values(value_column, &rows.rows)?,
                key: rows.key,
            })
        })
        .collect()
}

/// Selects the group of rows whose `group_key` is labelled `label`.
///
/// Unlike [`partition`], the returned group may be empty.
pub fn select(
    dataset: &Dataset,
    group_key: &str,
    value_column: &str,
    label: &str,
) -> Result<Group, DatasetError> {
    let rows = dataset.select_rows(group_key, label)?;
    Ok(Group {
        key: label.to_owned(),
        values: dataset.numeric_values(value_column, &rows)?,
    })
}

/// How the gate treats size-valid groups with zero variance.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroVariancePolicy {
    /// Drop degenerate groups and test the remaining ones.
    #[default]
    Discard,
    /// Fail the whole test if any group is degenerate.
    Reject,
}

/// Why a set of groups cannot be tested.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GateFailure {
    #[display("Not enough valid groups: {valid} valid, at least {required} required.")]
    InsufficientGroups { valid: usize, required: usize },
    #[display("One or more groups have zero variance: {}.", groups.join(", "))]
    DegenerateVariance { groups: Vec<String> },
}

/// Validity rules applied to groups before a test runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityGate {
    /// Minimum observations per group; values below 2 are treated as 2.
    pub min_group_size: usize,
    /// A group whose sample variance is at most this value is degenerate.
    /// Negative values are treated as 0.
    pub variance_epsilon: f64,
    pub zero_variance: ZeroVariancePolicy,
}

impl Default for ValidityGate {
    fn default() -> Self {
        Self {
            min_group_size: 2,
            variance_epsilon: 0.0,
            zero_variance: ZeroVariancePolicy::Discard,
        }
    }
}

impl ValidityGate {
    /// Filters `groups`, requiring at least `required` valid groups to remain.
    ///
    /// Groups smaller than the minimum size are dropped first. Groups with a
    /// degenerate variance are then dropped (or fail the gate under
    /// [`ZeroVariancePolicy::Reject`]). When too few groups remain, the
    /// failure is [`GateFailure::DegenerateVariance`] if any group was dropped
    /// for its variance, [`GateFailure::InsufficientGroups`] otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskab_analysis::partition::{GateFailure, Group, ValidityGate};
    ///
    /// let gate = ValidityGate::default();
    /// let groups = vec![
    ///     Group { key: "A".into(), values: vec![1.0, 2.0] },
    ///     Group { key: "B".into(), values: vec![3.0] },
    /// ];
    /// assert_eq!(
    ///     gate.apply(groups, 2),
    ///     Err(GateFailure::InsufficientGroups { valid: 1, required: 2 })
    /// );
    /// ```
    pub fn apply(&self, groups: Vec<Group>, required: usize) -> Result<Vec<Group>, GateFailure> {
        let min_size = self.min_group_size.max(2);
        let mut sized = Vec::with_capacity(groups.len());
        for group in groups {
            if group.len() < min_size {
                debug!(
                    "dropping group '{}': {} observations, need {min_size}",
                    group.key,
                    group.len()
                );
                continue;
            }
            sized.push(group);
        }

        let epsilon = self.variance_epsilon.max(0.0);
        let (valid, degenerate): (Vec<_>, Vec<_>) = sized
            .into_iter()
            .partition(|g| g.variance().is_some_and(|v| v > epsilon));
        let degenerate = degenerate.into_iter().map(|g| g.key).collect::<Vec<_>>();
        if !degenerate.is_empty() {
            debug!("degenerate variance in groups: {}", degenerate.join(", "));
        }

        match self.zero_variance {
            ZeroVariancePolicy::Reject => {
                let sized_count = valid.len() + degenerate.len();
                if sized_count < required {
                    return Err(GateFailure::InsufficientGroups {
                        valid: sized_count,
                        required,
                    });
                }
                if !degenerate.is_empty() {
                    return Err(GateFailure::DegenerateVariance { groups: degenerate });
                }
            }
            ZeroVariancePolicy::Discard => {
                if valid.len() < required {
                    return Err(if degenerate.is_empty() {
                        GateFailure::InsufficientGroups {
                            valid: valid.len(),
                            required,
                        }
                    } else {
                        GateFailure::DegenerateVariance { groups: degenerate }
                    });
                }
            }
        }

        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    fn group(key: &str, values: &[f64]) -> Group {
        Group {
            key: key.to_owned(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_partition_drops_missing_per_group() {
        let dataset = Dataset::new(vec![
            Column::new("Province", ["A", "B", "A", "B", "A"]),
            Column::new(
                "TotalPremium",
                [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)],
            ),
        ])
        .unwrap();
        let groups = partition(&dataset, "Province", "TotalPremium").unwrap();
        assert_eq!(groups, vec![group("A", &[1.0, 5.0]), group("B", &[2.0, 4.0])]);
    }

    #[test]
    fn test_partition_requires_value_column() {
        let dataset = Dataset::new(vec![Column::new("Province", [Value::Missing])]).unwrap();
        let err = partition(&dataset, "Province", "TotalPremium").unwrap_err();
        assert!(matches!(err, DatasetError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_select_may_be_empty() {
        let dataset = Dataset::new(vec![
            Column::new("Gender", ["Male", "Male"]),
            Column::new("TotalPremium", [1.0, 2.0]),
        ])
        .unwrap();
        let female = select(&dataset, "Gender", "TotalPremium", "Female").unwrap();
        assert!(female.is_empty());
        let male = select(&dataset, "Gender", "TotalPremium", "Male").unwrap();
        assert_eq!(male.values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_gate_keeps_valid_groups_in_order() {
        let gate = ValidityGate::default();
        let groups = vec![
            group("A", &[1.0, 2.0]),
            group("B", &[5.0]),
            group("C", &[3.0, 4.0, 8.0]),
        ];
        let valid = gate.apply(groups, 2).unwrap();
        let keys = valid.iter().map(|g| g.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, ["A", "C"]);
    }

    #[test]
    fn test_gate_discards_zero_variance_group() {
        let gate = ValidityGate::default();
        let groups = vec![
            group("A", &[1.0, 2.0]),
            group("B", &[5.0, 5.0]),
            group("C", &[3.0, 4.0]),
        ];
        let valid = gate.apply(groups, 2).unwrap();
        assert_eq!(valid.len(), 2);
    }

    #[test]
    fn test_gate_all_zero_variance() {
        let gate = ValidityGate::default();
        let groups = vec![group("A", &[100.0; 3]), group("B", &[100.0; 3])];
        assert_eq!(
            gate.apply(groups, 2),
            Err(GateFailure::DegenerateVariance {
                groups: vec!["A".to_owned(), "B".to_owned()]
            })
        );
    }

    #[test]
    fn test_gate_reject_policy() {
        let gate = ValidityGate {
            zero_variance: ZeroVariancePolicy::Reject,
            ..ValidityGate::default()
        };
        let groups = vec![
            group("A", &[1.0, 2.0]),
            group("B", &[5.0, 5.0]),
            group("C", &[3.0, 4.0]),
        ];
        assert_eq!(
            gate.apply(groups, 2),
            Err(GateFailure::DegenerateVariance {
                groups: vec!["B".to_owned()]
            })
        );

        // Size is checked before variance.
        let groups = vec![group("A", &[5.0, 5.0]), group("B", &[1.0])];
        assert_eq!(
            gate.apply(groups, 2),
            Err(GateFailure::InsufficientGroups {
                valid: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_gate_variance_epsilon() {
        let gate = ValidityGate {
            variance_epsilon: 1e-6,
            ..ValidityGate::default()
        };
        let groups = vec![group("A", &[1.0, 1.000_000_1]), group("B", &[1.0, 3.0])];
        assert!(matches!(
            gate.apply(groups.clone(), 2),
            Err(GateFailure::DegenerateVariance { .. })
        ));
        assert!(ValidityGate::default().apply(groups, 2).is_ok());
    }

    #[test]
    fn test_gate_negative_epsilon_still_catches_constant_groups() {
        let gate = ValidityGate {
            variance_epsilon: -1.0,
            ..ValidityGate::default()
        };
        let groups = vec![group("A", &[0.7; 3]), group("B", &[100.0; 3])];
        assert_eq!(
            gate.apply(groups, 2),
            Err(GateFailure::DegenerateVariance {
                groups: vec!["A".to_owned(), "B".to_owned()]
            })
        );
    }

    #[test]
    fn test_gate_min_group_size() {
        let gate = ValidityGate {
            min_group_size: 3,
            ..ValidityGate::default()
        };
        let groups = vec![group("A", &[1.0, 2.0]), group("B", &[1.0, 2.0, 3.0])];
        assert_eq!(
            gate.apply(groups, 2),
            Err(GateFailure::InsufficientGroups {
                valid: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            GateFailure::DegenerateVariance {
                groups: vec!["A".to_owned(), "B".to_owned()]
            }
            .to_string(),
            "One or more groups have zero variance: A, B."
        );
    }
}
