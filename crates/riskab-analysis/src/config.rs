//! Test configuration
//!
//! Column names, category labels and validity rules used by the test runner.
//! Every field has a default matching the insurance dataset layout, so a JSON
//! configuration only needs to list what differs:
//!
//! ```json
//! {
//!   "columns": { "province": "Region" },
//!   "significance_level": 0.01,
//!   "gate": { "variance_epsilon": 1e-9 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::partition::ValidityGate;

/// Names of the dataset columns the tests read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub province: String,
    pub postal_code: String,
    pub gender: String,
    pub total_premium: String,
    pub total_claims: String,
    /// Name of the derived `total_premium - total_claims` column
    pub margin: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            province: "Province".to_owned(),
            postal_code: "PostalCode".to_owned(),
            gender: "Gender".to_owned(),
            total_premium: "TotalPremium".to_owned(),
            total_claims: "TotalClaims".to_owned(),
            margin: "Margin".to_owned(),
        }
    }
}

/// Values of the gender column compared by the gender test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderLabels {
    pub male: String,
    pub female: String,
}

impl Default for GenderLabels {
    fn default() -> Self {
        Self {
            male: "Male".to_owned(),
            female: "Female".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub columns: ColumnNames,
    pub gender_labels: GenderLabels,
    /// The null hypothesis is rejected when the p-value is below this level.
    pub significance_level: f64,
    pub gate: ValidityGate,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            gender_labels: GenderLabels::default(),
            significance_level: 0.05,
            gate: ValidityGate::default(),
        }
    }
}

/// A configuration value outside its valid range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("significance level must be in (0, 1), got {value}")]
    SignificanceLevel { value: f64 },
    #[display("variance epsilon must be finite and non-negative, got {value}")]
    VarianceEpsilon { value: f64 },
}

impl TestConfig {
    /// Checks the numeric settings a deserialized configuration may carry.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskab_analysis::config::{ConfigError, TestConfig};
    ///
    /// assert_eq!(TestConfig::default().validate(), Ok(()));
    ///
    /// let config = TestConfig { significance_level: 1.5, ..TestConfig::default() };
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::SignificanceLevel { value: 1.5 })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let alpha = self.significance_level;
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(ConfigError::SignificanceLevel { value: alpha });
        }
        let epsilon = self.gate.variance_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigError::VarianceEpsilon { value: epsilon });
        }
        Ok(())
    }
}
