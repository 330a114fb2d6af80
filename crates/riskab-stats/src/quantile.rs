/// Precomputed quantile values for a dataset.
///
/// Quantiles are expressed as fractions in `0.0..=1.0` and computed with
/// linear interpolation between the two closest ranks.
///
/// # Examples
///
/// ```
/// use riskab_stats::quantile::Quantiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let quantiles = Quantiles::new(&values, &[0.25, 0.5, 0.75]);
///
/// assert_eq!(quantiles.get(0.5), Some(3.0));
/// assert_eq!(quantiles.get(0.25), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Quantiles {
    /// Quantile-value pairs in the order they were requested.
    values: Vec<(f64, f64)>,
}

impl Quantiles {
    /// Computes quantiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], quantile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = quantile_points
            .iter()
            .map(|&q| (q, compute_quantile(sorted_values, q)))
            .collect();
        Self { values }
    }

    /// Computes quantiles from unsorted values.
    #[must_use]
    pub fn new(values: &[f64], quantile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, quantile_points)
    }

    /// Gets the value at a specific quantile.
    ///
    /// Returns `None` if the quantile was not precomputed.
    #[must_use]
    pub fn get(&self, quantile: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|(q, _)| (q - quantile).abs() < f64::EPSILON)
            .map(|(_, value)| *value)
    }

    /// Returns an iterator over all (quantile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }
}

/// Computes a single quantile from sorted data by linear interpolation.
///
/// For `n` values the quantile `q` sits at fractional rank `q * (n - 1)`;
/// the result interpolates between the values at the surrounding ranks.
/// `q` is clamped to `0.0..=1.0`.
///
/// # Returns
///
/// The interpolated value. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use riskab_stats::quantile::compute_quantile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_quantile(&values, 0.5), 2.5);
/// assert_eq!(compute_quantile(&values, 0.0), 1.0);
/// assert_eq!(compute_quantile(&values, 1.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_quantile(sorted_values: &[f64], quantile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let rank = quantile.clamp(0.0, 1.0) * (sorted_values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - rank.floor();
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction
}
