//! Hypothesis testing of risk differences in insurance portfolio data
//!
//! This crate checks whether categorical groupings of a policy dataset
//! (province, postal code, gender) show statistically distinguishable premium
//! and margin outcomes.
//!
//! # Overview
//!
//! 1. **Load Dataset** ([`dataset::Dataset`]): Column-oriented table of typed values
//! 2. **Clean** ([`preprocess`]): Optional missing-value handling and outlier capping
//! 3. **Partition** ([`partition::partition`]): Split a value column by a categorical key
//! 4. **Gate** ([`partition::ValidityGate`]): Drop groups too small or too flat to test
//! 5. **Test** ([`runner::HypothesisTester`]): Run ANOVA or Welch's t-test and package a
//!    [`result::TestResult`]
//!
//! Expected statistical edge cases (too few groups, zero variance) end up in
//! the result record so that a batch of tests always completes. Structural
//! problems such as a missing column are returned as errors.
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
//!     Column::new("PostalCode", ["1", "1", "1", "1", "1", "1"]),
//!     Column::new("Gender", ["Male", "Female", "Male", "Female", "Male", "Female"]),
//!     Column::new("TotalPremium", [100.0, 110.0, 120.0, 200.0, 210.0, 220.0]),
//!     Column::new("TotalClaims", [0.0, 0.0, 50.0, 0.0, 10.0, 0.0]),
//! ])
//! .unwrap();
//!
//! let mut tester = HypothesisTester::new(dataset, TestConfig::default());
//! for result in tester.run_all().unwrap() {
//!     match result.error() {
//!         Some(reason) => println!("{}: skipped ({reason})", result.null_hypothesis()),
//!         None => println!(
//!             "{}: p = {:.4}, reject = {}",
//!             result.null_hypothesis(),
//!             result.p_value().unwrap(),
//!             result.reject_null()
//!         ),
//!     }
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod partition;
pub mod preprocess;
pub mod result;
pub mod runner;
