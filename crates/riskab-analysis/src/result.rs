//! Uniform result record of a hypothesis test
//!
//! A [`TestResult`] either carries a statistic and p-value, or a diagnostic
//! explaining why the test could not run. The two constructors are the only
//! way to build one, so the record always satisfies:
//!
//! - error set: statistic, p-value and degrees of freedom are absent and
//!   `reject_null` is `false`
//! - error unset: statistic and p-value are present and
//!   `reject_null == (p_value < significance_level)`
//!
//! # Serialization
//!
//! ```json
//! {
//!   "test": "ANOVA",
//!   "null_hypothesis": "No risk differences across provinces",
//!   "statistic": 150.0,
//!   "p_value": 0.00025,
//!   "reject_null": true,
//!   "significance_level": 0.05,
//!   "degrees_of_freedom": [1.0, 4.0],
//!   "groups": [{ "key": "A", "count": 3, "mean": 110.0, "variance": 100.0 }],
//!   "error": null
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of statistical test that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum TestKind {
    /// One-way analysis of variance
    #[serde(rename = "ANOVA")]
    #[display("ANOVA")]
    Anova,
    /// Welch's two-sample t-test
    #[serde(rename = "TTest")]
    #[display("TTest")]
    TTest,
}

/// Size and moments of one group that entered a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    test: TestKind,
    null_hypothesis: String,
    statistic: Option<f64>,
    p_value: Option<f64>,
    reject_null: bool,
    significance_level: f64,
    degrees_of_freedom: Vec<f64>,
    groups: Vec<GroupSummary>,
    error: Option<String>,
}

impl TestResult {
    /// Result of a test that ran; the null is rejected when `p_value < significance_level`.
    #[must_use]
    pub fn completed(
        test: TestKind,
        null_hypothesis: impl Into<String>,
        statistic: f64,
        p_value: f64,
        degrees_of_freedom: Vec<f64>,
        significance_level: f64,
        groups: Vec<GroupSummary>,
    ) -> Self {
        Self {
            test,
            null_hypothesis: null_hypothesis.into(),
            statistic: Some(statistic),
            p_value: Some(p_value),
            reject_null: p_value < significance_level,
            significance_level,
            degrees_of_freedom,
            groups,
            error: None,
        }
    }

    /// Result of a test that could not run, with `reason` as the diagnostic.
    #[must_use]
    pub fn failed(
        test: TestKind,
        null_hypothesis: impl Into<String>,
        significance_level: f64,
        reason: impl fmt::Display,
        groups: Vec<GroupSummary>,
    ) -> Self {
        Self {
            test,
            null_hypothesis: null_hypothesis.into(),
            statistic: None,
            p_value: None,
            reject_null: false,
            significance_level,
            degrees_of_freedom: vec![],
            groups,
            error: Some(reason.to_string()),
        }
    }

    #[must_use]
    pub fn test(&self) -> TestKind {
        self.test
    }

    #[must_use]
    pub fn null_hypothesis(&self) -> &str {
        &self.null_hypothesis
    }

    /// F-statistic for ANOVA, t-statistic for the t-test.
    #[must_use]
    pub fn statistic(&self) -> Option<f64> {
        self.statistic
    }

    #[must_use]
    pub fn p_value(&self) -> Option<f64> {
        self.p_value
    }

    #[must_use]
    pub fn reject_null(&self) -> bool {
        self.reject_null
    }

    #[must_use]
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// `[k - 1, N - k]` for ANOVA, `[df]` for the t-test, empty on error.
    #[must_use]
    pub fn degrees_of_freedom(&self) -> &[f64] {
        &self.degrees_of_freedom
    }

    #[must_use]
    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_reject_decision() {
        let rejected = TestResult::completed(
            TestKind::Anova,
            "h0",
            10.0,
            0.01,
            vec![1.0, 4.0],
            0.05,
            vec![],
        );
        assert!(rejected.reject_null());
        assert!(!rejected.is_error());

        let kept =
            TestResult::completed(TestKind::TTest, "h0", 0.7, 0.05, vec![3.8], 0.05, vec![]);
        assert!(!kept.reject_null(), "p equal to alpha does not reject");
    }

    #[test]
    fn test_failed_has_no_statistic() {
        let result = TestResult::failed(TestKind::Anova, "h0", 0.05, "too few groups", vec![]);
        assert!(result.is_error());
        assert_eq!(result.error(), Some("too few groups"));
        assert_eq!(result.statistic(), None);
        assert_eq!(result.p_value(), None);
        assert!(result.degrees_of_freedom().is_empty());
        assert!(!result.reject_null());
    }

    #[test]
    fn test_serialize_kind_tags() {
        let result = TestResult::failed(TestKind::Anova, "h0", 0.05, "x", vec![]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["test"], "ANOVA");
        assert_eq!(json["statistic"], serde_json::Value::Null);
        assert_eq!(json["reject_null"], false);
        assert_eq!(serde_json::to_value(TestKind::TTest).unwrap(), "TTest");
    }
}
