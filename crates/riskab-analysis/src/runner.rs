//! Hypothesis test runner
//!
//! [`HypothesisTester`] owns a dataset and a [`TestConfig`] and exposes the
//! four named risk procedures:
//!
//! | procedure                  | test  | groups         | values         |
//! |----------------------------|-------|----------------|----------------|
//! | `group_risk_test`          | ANOVA | province       | total premium  |
//! | `postal_code_risk_test`    | ANOVA | postal code    | total premium  |
//! | `margin_difference_test`   | ANOVA | postal code    | derived margin |
//! | `gender_risk_test`         | Welch | male vs female | total premium  |
//!
//! Every procedure partitions the data, runs the
//! [`ValidityGate`](crate::partition::ValidityGate) and only
//! then calls into `riskab-stats`. Gate failures become error results; a
//! missing column, a non-numeric value or an empty gender selection
//! propagates as [`AnalysisError`].
//!
//! # Examples
//!
//! ```
//! use riskab_analysis::{
//!     config::TestConfig,
//!     dataset::{Column, Dataset},
//!     runner::HypothesisTester,
//! };
//!
//! let dataset = Dataset::new(vec![
//!     Column::new("Province", ["A", "A", "A", "B", "B", "B"]),
//!     Column::new("TotalPremium", [100.0, 110.0, 120.0, 200.0, 210.0, 220.0]),
//! ])
//! .unwrap();
//! let tester = HypothesisTester::new(dataset, TestConfig::default());
//!
//! let result = tester.group_risk_test().unwrap();
//! assert!(result.reject_null());
//! ```

use log::{debug, info};
use riskab_stats::{TestError, anova::OneWayAnova, welch::WelchTTest};

use crate::{
    config::TestConfig,
    dataset::{Dataset, DatasetError},
    partition::{self, Group},
    result::{GroupSummary, TestKind, TestResult},
};

pub const PROVINCE_HYPOTHESIS: &str = "No risk differences across provinces";
pub const POSTAL_CODE_HYPOTHESIS: &str = "No risk differences between postal codes";
pub const MARGIN_HYPOTHESIS: &str = "No significant margin differences between postal codes";
pub const GENDER_HYPOTHESIS: &str = "No significant risk differences between women and men";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("{source}")]
    Dataset { source: DatasetError },
    #[display("no '{label}' rows with values in '{column}'")]
    #[from(skip)]
    EmptyGroup { column: String, label: String },
    #[display("statistical test failed: {source}")]
    Computation { source: TestError },
}

/// The named test procedures, in their reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr, derive_more::Display)]
pub enum Procedure {
    Province,
    PostalCode,
    Margin,
    Gender,
}

impl Procedure {
    pub const ALL: [Self; 4] = [Self::Province, Self::PostalCode, Self::Margin, Self::Gender];
}

#[derive(Debug, Clone)]
pub struct HypothesisTester {
    dataset: Dataset,
    config: TestConfig,
}

impl HypothesisTester {
    #[must_use]
    pub fn new(dataset: Dataset, config: TestConfig) -> Self {
        Self { dataset, config }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    #[must_use]
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// ANOVA on total premium across provinces.
    pub fn group_risk_test(&self) -> Result<TestResult, AnalysisError> {
        let columns = &self.config.columns;
        self.anova_test(
            &columns.province,
            &columns.total_premium,
            PROVINCE_HYPOTHESIS,
        )
    }

    /// ANOVA on total premium across postal codes.
    pub fn postal_code_risk_test(&self) -> Result<TestResult, AnalysisError> {
        let columns = &self.config.columns;
        self.anova_test(
            &columns.postal_code,
            &columns.total_premium,
            POSTAL_CODE_HYPOTHESIS,
        )
    }

    /// ANOVA on margin across postal codes.
    ///
    /// Computes the margin column on the owned dataset first (see
    /// [`Dataset::compute_margin`]); this is the only procedure that mutates
    /// the dataset.
    pub fn margin_difference_test(&mut self) -> Result<TestResult, AnalysisError> {
        let columns = &self.config.columns;
        self.dataset.compute_margin(
            &columns.total_premium,
            &columns.total_claims,
            &columns.margin,
        )?;
        self.anova_test(&columns.postal_code, &columns.margin, MARGIN_HYPOTHESIS)
    }

    /// Welch's t-test on total premium, male against female.
    pub fn gender_risk_test(&self) -> Result<TestResult, AnalysisError> {
        let columns = &self.config.columns;
        let labels = &self.config.gender_labels;
        self.welch_test(
            &columns.gender,
            &columns.total_premium,
            (labels.male.as_str(), labels.female.as_str()),
            GENDER_HYPOTHESIS,
        )
    }

    /// Runs one named procedure.
    pub fn run(&mut self, procedure: Procedure) -> Result<TestResult, AnalysisError> {
        match procedure {
            Procedure::Province => self.group_risk_test(),
            Procedure::PostalCode => self.postal_code_risk_test(),
            Procedure::Margin => self.margin_difference_test(),
            Procedure::Gender => self.gender_risk_test(),
        }
    }

    /// Runs every named procedure in [`Procedure::ALL`] order.
    pub fn run_all(&mut self) -> Result<Vec<TestResult>, AnalysisError> {
        Procedure::ALL.into_iter().map(|p| self.run(p)).collect()
    }

    /// One-way ANOVA on `value_column` across all valid `group_key` groups.
    pub fn anova_test(
        &self,
        group_key: &str,
        value_column: &str,
        null_hypothesis: &str,
    ) -> Result<TestResult, AnalysisError> {
        let groups = partition::partition(&self.dataset, group_key, value_column)?;
        debug!(
            "partitioned '{value_column}' by '{group_key}' into {} groups",
            groups.len()
        );
        let alpha = self.config.significance_level;
        let all_summaries = summaries(&groups);

        let groups = match self.config.gate.apply(groups, 2) {
            Ok(groups) => groups,
            Err(failure) => {
                info!("ANOVA '{value_column}' by '{group_key}' skipped: {failure}");
                return Ok(TestResult::failed(
                    TestKind::Anova,
                    null_hypothesis,
                    alpha,
                    failure,
                    all_summaries,
                ));
            }
        };

        let values = groups.iter().map(|g| g.values.as_slice()).collect::<Vec<_>>();
        let anova = OneWayAnova::new(&values)?;
        info!(
            "ANOVA '{value_column}' by '{group_key}': F={:.4}, p={:.4e} over {} groups",
            anova.f_statistic,
            anova.p_value,
            groups.len()
        );

        Ok(TestResult::completed(
            TestKind::Anova,
            null_hypothesis,
            anova.f_statistic,
            anova.p_value,
            vec![anova.df_between, anova.df_within],
            alpha,
            summaries(&groups),
        ))
    }

    /// Welch's t-test on `value_column` between two labels of `group_key`.
    ///
    /// The sign of the statistic follows `labels.0 - labels.1`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyGroup`] when a label selects no values.
    pub fn welch_test(
        &self,
        group_key: &str,
        value_column: &str,
        labels: (&str, &str),
        null_hypothesis: &str,
    ) -> Result<TestResult, AnalysisError> {
        let alpha = self.config.significance_level;
        let mut selected = Vec::with_capacity(2);
        for label in [labels.0, labels.1] {
            let group = partition::select(&self.dataset, group_key, value_column, label)?;
            if group.is_empty() {
                return Err(AnalysisError::EmptyGroup {
                    column: value_column.to_owned(),
                    label: label.to_owned(),
                });
            }
            selected.push(group);
        }
        let all_summaries = summaries(&selected);

        let groups = match self.config.gate.apply(selected, 2) {
            Ok(groups) => groups,
            Err(failure) => {
                info!("t-test '{value_column}' by '{group_key}' skipped: {failure}");
                return Ok(TestResult::failed(
                    TestKind::TTest,
                    null_hypothesis,
                    alpha,
                    failure,
                    all_summaries,
                ));
            }
        };

        let [first, second] = groups.as_slice() else {
            unreachable!("the gate keeps both groups when it passes");
        };
        let test = WelchTTest::new(&first.values, &second.values)?;
        info!(
            "t-test '{value_column}' {} vs {}: t={:.4}, p={:.4e}",
            first.key, second.key, test.t_statistic, test.p_value
        );

        Ok(TestResult::completed(
            TestKind::TTest,
            null_hypothesis,
            test.t_statistic,
            test.p_value,
            vec![test.df],
            alpha,
            all_summaries,
        ))
    }
}

fn summaries(groups: &[Group]) -> Vec<GroupSummary> {
    groups.iter().map(Group::summary).collect()
}
