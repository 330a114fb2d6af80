use std::path::PathBuf;

use chrono::{DateTime, Utc};
use riskab_analysis::{config::TestConfig, result::TestResult};
use serde::Serialize;

/// Results of one `test` invocation, as written by `--output`
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    /// Timestamp when the report was created (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// Dataset file the tests ran on
    pub dataset: PathBuf,
    /// Number of rows after preprocessing
    pub num_rows: usize,
    /// Configuration the tests ran with
    pub config: TestConfig,
    /// One result per requested test, in request order
    pub results: Vec<TestResult>,
}
