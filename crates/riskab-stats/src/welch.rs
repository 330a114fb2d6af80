//! Welch's unequal-variance two-sample t-test.
//!
//! Each group's own sample variance enters the standard error; variances are
//! never pooled. Degrees of freedom follow the Welch-Satterthwaite
//! approximation:
//!
//! ```text
//! t  = (m1 - m2) / sqrt(v1/n1 + v2/n2)
//! df = (v1/n1 + v2/n2)^2 / ((v1/n1)^2/(n1-1) + (v2/n2)^2/(n2-1))
//! ```
//!
//! The reported p-value is two-sided.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::{
    TestError,
    descriptive::{mean, sample_variance},
};

/// Result of Welch's t-test.
#[derive(Debug, Clone, PartialEq)]
pub struct WelchTTest {
    /// Test statistic; positive when the first group's mean is larger.
    pub t_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// Difference of group means, first minus second.
    pub mean_difference: f64,
    /// Standard error of the mean difference.
    pub std_error: f64,
}

impl WelchTTest {
    /// Runs Welch's t-test comparing `first` against `second`.
    ///
    /// Swapping the arguments negates `t_statistic` and leaves `p_value` and
    /// `df` unchanged.
    ///
    /// # Errors
    ///
    /// * [`TestError::TooFewObservations`] - either group has fewer than 2 values
    /// * [`TestError::ZeroVariance`] - both groups are constant
    #[expect(clippy::cast_precision_loss)]
    pub fn new(first: &[f64], second: &[f64]) -> Result<Self, TestError> {
        let (n1, n2) = (first.len(), second.len());
        let too_few = |group, count| TestError::TooFewObservations {
            group,
            count,
            required: 2,
        };
        let m1 = mean(first).ok_or_else(|| too_few(0, n1))?;
        let m2 = mean(second).ok_or_else(|| too_few(1, n2))?;
        let v1 = sample_variance(first).ok_or_else(|| too_few(0, n1))?;
        let v2 = sample_variance(second).ok_or_else(|| too_few(1, n2))?;

        let se1 = v1 / n1 as f64;
        let se2 = v2 / n2 as f64;
        let se_sum = se1 + se2;
        if se_sum == 0.0 {
            return Err(TestError::ZeroVariance);
        }

        let std_error = se_sum.sqrt();
        let mean_difference = m1 - m2;
        let t_statistic = mean_difference / std_error;
        let df = se_sum.powi(2)
            / (se1.powi(2) / (n1 - 1) as f64 + se2.powi(2) / (n2 - 1) as f64);

        let distribution = StudentsT::new(0.0, 1.0, df).map_err(|e| TestError::Distribution {
            message: e.to_string(),
        })?;
        let p_value = (2.0 * distribution.sf(t_statistic.abs())).min(1.0);

        Ok(Self {
            t_statistic,
            p_value,
            df,
            mean_difference,
            std_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_close_means_do_not_reject() {
        let male = [150.0, 160.0, 170.0];
        let female = [140.0, 155.0, 165.0];
        let test = WelchTTest::new(&male, &female).unwrap();
        // mean diff 6.667, se = sqrt(100/3 + 158.33/3) = 9.280
        assert!((test.t_statistic - 0.718_4).abs() < 1e-3);
        assert!((test.df - 3.806).abs() < 1e-2);
        assert!(test.p_value > 0.4 && test.p_value < 0.6);
    }

    #[test]
    fn test_separated_means_reject() {
        let low = [100.0, 110.0, 120.0, 105.0, 115.0];
        let high = [300.0, 320.0, 310.0, 290.0, 305.0];
        let test = WelchTTest::new(&low, &high).unwrap();
        assert!(test.t_statistic < 0.0);
        assert!(test.p_value < 0.001);
    }

    #[test]
    fn test_swapping_groups_negates_statistic() {
        let mut rng = Pcg64::seed_from_u64(42);
        let a_dist = Normal::new(200.0, 30.0).unwrap();
        let b_dist = Normal::new(210.0, 60.0).unwrap();
        for size in [3, 8, 25] {
            let a = a_dist.sample_iter(&mut rng).take(size).collect::<Vec<f64>>();
            let b = b_dist
                .sample_iter(&mut rng)
                .take(size + 4)
                .collect::<Vec<f64>>();
            let ab = WelchTTest::new(&a, &b).unwrap();
            let ba = WelchTTest::new(&b, &a).unwrap();
            assert!((ab.t_statistic + ba.t_statistic).abs() < 1e-12);
            assert!((ab.p_value - ba.p_value).abs() < 1e-12);
            assert!((ab.df - ba.df).abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_constant_group_is_allowed() {
        let constant = [100.0, 100.0, 100.0];
        let varying = [90.0, 100.0, 110.0];
        let test = WelchTTest::new(&constant, &varying).unwrap();
        assert_eq!(test.t_statistic, 0.0);
        assert!((test.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_both_constant_groups() {
        assert_eq!(
            WelchTTest::new(&[1.0, 1.0], &[2.0, 2.0]),
            Err(TestError::ZeroVariance)
        );
        assert_eq!(
            WelchTTest::new(&[0.7, 0.7], &[0.7, 0.7]),
            Err(TestError::ZeroVariance)
        );
        assert_eq!(
            WelchTTest::new(&[0.1; 3], &[0.7; 3]),
            Err(TestError::ZeroVariance)
        );
    }

    #[test]
    fn test_too_few_observations() {
        assert!(matches!(
            WelchTTest::new(&[1.0, 2.0], &[3.0]),
            Err(TestError::TooFewObservations {
                group: 1,
                count: 1,
                ..
            })
        ));
        assert!(matches!(
            WelchTTest::new(&[], &[3.0, 4.0]),
            Err(TestError::TooFewObservations { group: 0, .. })
        ));
    }
}
