//! Statistical primitives for the riskab project.
//!
//! This crate provides the numeric building blocks used by the hypothesis
//! tests in `riskab-analysis`:
//!
//! - **Descriptive statistics**: count, mean, median, sample variance, etc.
//! - **Quantiles**: linear-interpolation quantiles used for IQR outlier bounds
//! - **One-way ANOVA**: F-test for equality of means across two or more groups
//! - **Welch's t-test**: two-sample test that does not pool variances
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`quantile`]: Quantile computation and storage
//! - [`anova`]: One-way analysis of variance
//! - [`welch`]: Welch's unequal-variance t-test
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use riskab_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, Some(2.5));
//! ```
//!
//! ## Running a one-way ANOVA
//!
//! ```
//! use riskab_stats::anova::OneWayAnova;
//!
//! let groups = [vec![100.0, 110.0, 120.0], vec![200.0, 210.0, 220.0]];
//! let anova = OneWayAnova::new(&groups).unwrap();
//! assert!((anova.f_statistic - 150.0).abs() < 1e-9);
//! assert!(anova.p_value < 0.05);
//! ```
//!
//! ## Running Welch's t-test
//!
//! ```
//! use riskab_stats::welch::WelchTTest;
//!
//! let male = [150.0, 160.0, 170.0];
//! let female = [140.0, 155.0, 165.0];
//! let test = WelchTTest::new(&male, &female).unwrap();
//! assert!(test.p_value > 0.05);
//! ```

pub mod anova;
pub mod descriptive;
pub mod quantile;
pub mod welch;

/// Errors raised by the statistical test routines.
///
/// These describe inputs the numeric routines cannot produce a meaningful
/// statistic for. Callers that want to report such cases instead of failing
/// should validate their groups before calling into this crate.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TestError {
    #[display("at least 2 groups are required, got {count}")]
    TooFewGroups { count: usize },
    #[display("group {group} has {count} observations, at least {required} required")]
    TooFewObservations {
        group: usize,
        count: usize,
        required: usize,
    },
    #[display("within-group variance is zero, the test statistic is undefined")]
    ZeroVariance,
    #[display("invalid distribution parameters: {message}")]
    Distribution { message: String },
}
