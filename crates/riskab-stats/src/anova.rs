//! One-way analysis of variance.
//!
//! Tests the null hypothesis that two or more groups share a common mean by
//! comparing the between-group mean square with the within-group mean square.
//!
//! ```text
//! F = (SS_between / (k - 1)) / (SS_within / (N - k))
//! ```
//!
//! The p-value is the upper tail of the F-distribution with `(k - 1, N - k)`
//! degrees of freedom.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::{
    TestError,
    descriptive::{mean, sum_of_squares},
};

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq)]
pub struct OneWayAnova {
    /// Ratio of between-group to within-group mean square.
    pub f_statistic: f64,
    /// Upper-tail probability of `f_statistic`.
    pub p_value: f64,
    /// Numerator degrees of freedom, `k - 1`.
    pub df_between: f64,
    /// Denominator degrees of freedom, `N - k`.
    pub df_within: f64,
    /// Sum of squared deviations of group means from the grand mean, weighted by group size.
    pub ss_between: f64,
    /// Sum of squared deviations of observations from their group mean.
    pub ss_within: f64,
}

impl OneWayAnova {
    /// Runs a one-way ANOVA over `groups`.
    ///
    /// # Errors
    ///
    /// * [`TestError::TooFewGroups`] - fewer than 2 groups were given
    /// * [`TestError::TooFewObservations`] - a group is empty, or the total
    ///   number of observations leaves no within-group degrees of freedom
    /// * [`TestError::ZeroVariance`] - every group is constant, so the
    ///   within-group mean square is zero
    #[expect(clippy::cast_precision_loss)]
    pub fn new<G>(groups: &[G]) -> Result<Self, TestError>
    where
        G: AsRef<[f64]>,
    {
        let k = groups.len();
        if k < 2 {
            return Err(TestError::TooFewGroups { count: k });
        }
        for (group, values) in groups.iter().enumerate() {
            let count = values.as_ref().len();
            if count == 0 {
                return Err(TestError::TooFewObservations {
                    group,
                    count,
                    required: 1,
                });
            }
        }

        let total = groups.iter().map(|g| g.as_ref().len()).sum::<usize>();
        if total <= k {
            return Err(TestError::TooFewObservations {
                group: 0,
                count: total,
                required: k + 1,
            });
        }

        let grand_mean = groups
            .iter()
            .flat_map(|g| g.as_ref().iter())
            .sum::<f64>()
            / total as f64;

        let mut ss_between = 0.0;
        let mut ss_within = 0.0;
        for values in groups {
            let values = values.as_ref();
            let group_mean = mean(values).unwrap_or(grand_mean);
            ss_between += values.len() as f64 * (group_mean - grand_mean).powi(2);
            ss_within += sum_of_squares(values, group_mean);
        }

        if ss_within == 0.0 {
            return Err(TestError::ZeroVariance);
        }

        let df_between = (k - 1) as f64;
        let df_within = (total - k) as f64;
        let f_statistic = (ss_between / df_between) / (ss_within / df_within);

        let distribution =
            FisherSnedecor::new(df_between, df_within).map_err(|e| TestError::Distribution {
                message: e.to_string(),
            })?;
        let p_value = distribution.sf(f_statistic);

        Ok(Self {
            f_statistic,
            p_value,
            df_between,
            df_within,
            ss_between,
            ss_within,
        })
    }
}
