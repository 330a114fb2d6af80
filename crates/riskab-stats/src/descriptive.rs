/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency and dispersion
/// for a dataset of `f64` values. The variance uses the unbiased `n - 1`
/// denominator and is therefore undefined for a single observation.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// The number of observations.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The sample variance, `None` when fewer than 2 observations exist.
    pub variance: Option<f64>,
    /// The sample standard deviation, `None` when fewer than 2 observations exist.
    pub std_dev: Option<f64>,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use riskab_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let mean = mean(sorted_values)?;
        let median = if count % 2 == 0 {
            f64::midpoint(sorted_values[count / 2 - 1], sorted_values[count / 2])
        } else {
            sorted_values[count / 2]
        };
        let variance = sample_variance(sorted_values);
        let std_dev = variance.map(f64::sqrt);

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
        })
    }
}

/// Arithmetic mean, `None` for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with the `n - 1` denominator.
///
/// Returns `None` when fewer than 2 values are given. A constant sample yields
/// exactly `0.0` even when its mean is not representable.
///
/// # Examples
///
/// ```
/// use riskab_stats::descriptive::sample_variance;
///
/// assert_eq!(sample_variance(&[100.0, 110.0, 120.0]), Some(100.0));
/// assert_eq!(sample_variance(&[100.0, 100.0, 100.0]), Some(0.0));
/// assert_eq!(sample_variance(&[0.7, 0.7, 0.7]), Some(0.0));
/// assert_eq!(sample_variance(&[1.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    Some(sum_of_squares(values, mean) / (values.len() - 1) as f64)
}

/// Whether every value equals the first one. True for an empty slice.
#[expect(clippy::float_cmp)]
#[must_use]
pub fn is_constant(values: &[f64]) -> bool {
    values.first().is_none_or(|&first| values.iter().all(|&v| v == first))
}

/// Sum of squared deviations from the mean.
///
/// Constant samples return exactly `0.0`; their computed mean may be off by
/// rounding, which would otherwise leave a tiny positive sum.
pub(crate) fn sum_of_squares(values: &[f64], mean: f64) -> f64 {
    if is_constant(values) {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum()
}
