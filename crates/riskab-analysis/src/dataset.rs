//! Column-oriented tabular dataset
//!
//! This module provides the read-only view the hypothesis tests run against.
//! Records are stored column-wise; every column holds exactly one [`Value`]
//! per row, so row `i` of the dataset is the `i`-th value of every column.
//!
//! # Overview
//!
//! - [`Dataset::column`]: column projection, failing with
//!   [`DatasetError::ColumnNotFound`] for unknown names
//! - [`Dataset::numeric_values`]: numeric projection over a row subset with
//!   missing values excluded
//! - [`Dataset::group_by`]: partitioning of rows by a categorical key, in
//!   first-encountered key order
//! - [`Dataset::compute_margin`]: the only mutation the tests perform, adding
//!   the derived `premium - claims` column
//!
//! # Examples
//!
//! ```
//! use riskab_analysis::dataset::{Column, Dataset, Value};
//!
//! let dataset = Dataset::new(vec![
//!     Column::new("Province", ["A", "B", "A"]),
//!     Column::new("TotalPremium", [100.0, 200.0, 110.0]),
//! ])
//! .unwrap();
//!
//! let groups = dataset.group_by("Province").unwrap();
//! assert_eq!(groups[0].key, "A");
//! assert_eq!(groups[0].rows, vec![0, 2]);
//! assert_eq!(
//!     dataset.numeric_values("TotalPremium", &groups[0].rows).unwrap(),
//!     vec![100.0, 110.0]
//! );
//! ```

use std::{collections::HashMap, fmt, io};

use log::debug;

/// Tokens treated as missing when parsing text fields.
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DatasetError {
    #[display("column '{column}' not found in dataset")]
    #[from(skip)]
    ColumnNotFound { column: String },
    #[display("column '{column}' appears more than once")]
    #[from(skip)]
    DuplicateColumn { column: String },
    #[display("column '{column}' has {actual} rows, expected {expected}")]
    #[from(skip)]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[display("column '{column}' holds a non-numeric value at row {row}")]
    #[from(skip)]
    NotNumeric { column: String, row: usize },
    #[display("failed to read CSV data")]
    Csv { source: csv::Error },
}

/// A single cell of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Parses a raw text field.
    ///
    /// Missing tokens (empty, `NA`, `NaN`, `null`, ...) become
    /// [`Value::Missing`], fields parsing as `f64` become [`Value::Number`],
    /// everything else is kept as [`Value::Text`].
    ///
    /// ```
    /// use riskab_analysis::dataset::Value;
    ///
    /// assert_eq!(Value::parse(" 12.5 "), Value::Number(12.5));
    /// assert_eq!(Value::parse("NA"), Value::Missing);
    /// assert_eq!(Value::parse("Gauteng"), Value::Text("Gauteng".to_owned()));
    /// ```
    #[must_use]
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        if MISSING_TOKENS.contains(&field) {
            return Self::Missing;
        }
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(field.to_owned()),
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Label of this value when used as a categorical key.
    ///
    /// Numbers are labelled by their display form, so a postal code parsed
    /// as `2000.0` is labelled `"2000"`.
    #[must_use]
    pub fn category(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            value => Some(value.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new<N, I>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Whether every non-missing value is a number.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .all(|v| matches!(v, Value::Number(_) | Value::Missing))
    }
}

/// Rows sharing one value of a categorical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    /// Label of the key value
    pub key: String,
    /// Indices of the rows holding that key, in ascending order
    pub rows: Vec<usize>,
}

/// Ordered collection of equally sized columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Dataset {
    /// Builds a dataset from columns.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::DuplicateColumn`] - two columns share a name
    /// * [`DatasetError::LengthMismatch`] - the columns differ in length
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let num_rows = columns.first().map_or(0, Column::len);
        for (i, column) in columns.iter().enumerate() {
            if column.len() != num_rows {
                return Err(DatasetError::LengthMismatch {
                    column: column.name.clone(),
                    expected: num_rows,
                    actual: column.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(DatasetError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// Reads a headered CSV table.
    ///
    /// Each field is parsed with [`Value::parse`]. Records with a field count
    /// different from the header are rejected by the CSV reader.
    ///
    /// ```
    /// use riskab_analysis::dataset::{Dataset, Value};
    ///
    /// let data = "Province|TotalPremium\nGauteng|21.9\nLimpopo|\n";
    /// let dataset = Dataset::from_csv_reader(data.as_bytes(), b'|').unwrap();
    /// assert_eq!(dataset.num_rows(), 2);
    /// assert_eq!(dataset.column("TotalPremium").unwrap().values()[1], Value::Missing);
    /// ```
    pub fn from_csv_reader<R>(reader: R, delimiter: u8) -> Result<Self, DatasetError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect::<Vec<_>>();
        let mut values = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (column, field) in values.iter_mut().zip(record.iter()) {
                column.push(Value::parse(field));
            }
        }

        let columns = headers
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column { name, values })
            .collect();
        let dataset = Self::new(columns)?;
        debug!(
            "loaded dataset with {} rows and {} columns",
            dataset.num_rows,
            dataset.columns.len()
        );
        Ok(dataset)
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Returns the column called `name`.
    pub fn column(&self, name: &str) -> Result<&Column, DatasetError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DatasetError::ColumnNotFound {
                column: name.to_owned(),
            })
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Result<&mut Column, DatasetError> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| DatasetError::ColumnNotFound {
                column: name.to_owned(),
            })
    }

    /// Numeric values of column `name` at `rows`, with missing values dropped.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::ColumnNotFound`] - no such column
    /// * [`DatasetError::NotNumeric`] - a selected row holds text
    pub fn numeric_values(&self, name: &str, rows: &[usize]) -> Result<Vec<f64>, DatasetError> {
        let column = self.column(name)?;
        let mut out = Vec::with_capacity(rows.len());
        for &row in rows {
            match &column.values[row] {
                Value::Number(n) => out.push(*n),
                Value::Missing => {}
                Value::Text(_) => {
                    return Err(DatasetError::NotNumeric {
                        column: name.to_owned(),
                        row,
                    });
                }
            }
        }
        Ok(out)
    }

    /// Numeric values of the whole column `name`, with missing values dropped.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, DatasetError> {
        let rows = (0..self.num_rows).collect::<Vec<_>>();
        self.numeric_values(name, &rows)
    }

    /// Partitions row indices by the categorical column `key`.
    ///
    /// Groups appear in the order their key value is first encountered.
    /// Rows with a missing key are skipped, so no group is ever empty.
    pub fn group_by(&self, key: &str) -> Result<Vec<RowGroup>, DatasetError> {
        let column = self.column(key)?;
        let mut index = HashMap::<String, usize>::new();
        let mut groups = Vec::<RowGroup>::new();

        for (row, value) in column.values.iter().enumerate() {
            let Some(label) = value.category() else {
                continue;
            };
            let slot = *index.entry(label).or_insert_with_key(|label| {
                groups.push(RowGroup {
                    key: label.clone(),
                    rows: vec![],
                });
                groups.len() - 1
            });
            groups[slot].rows.push(row);
        }

        Ok(groups)
    }

    /// Row indices whose `key` column is labelled `label`.
    pub fn select_rows(&self, key: &str, label: &str) -> Result<Vec<usize>, DatasetError> {
        let column = self.column(key)?;
        Ok(column
            .values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.category().as_deref() == Some(label))
            .map(|(row, _)| row)
            .collect())
    }

    /// Adds `column`, replacing an existing column of the same name in place.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::LengthMismatch`] if the column length differs
    /// from the row count of a non-empty dataset.
    pub fn insert_column(&mut self, column: Column) -> Result<(), DatasetError> {
        if !self.columns.is_empty() && column.len() != self.num_rows {
            return Err(DatasetError::LengthMismatch {
                column: column.name,
                expected: self.num_rows,
                actual: column.values.len(),
            });
        }
        if self.columns.is_empty() {
            self.num_rows = column.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Computes the derived column `margin = premium - claims`.
    ///
    /// This mutates the dataset: the margin column is added, or recomputed in
    /// place when it already exists. Row count and row order never change, so
    /// calling this repeatedly yields identical margin values. Rows where
    /// either input is missing get a missing margin.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::ColumnNotFound`] - `premium` or `claims` is absent
    /// * [`DatasetError::NotNumeric`] - either input holds text
    pub fn compute_margin(
        &mut self,
        premium: &str,
        claims: &str,
        margin: &str,
    ) -> Result<(), DatasetError> {
        let premium_values = self.column(premium)?.values();
        let claims_values = self.column(claims)?.values();

        let values = premium_values
            .iter()
            .zip(claims_values)
            .enumerate()
            .map(|(row, pair)| match pair {
                (Value::Number(p), Value::Number(c)) => Ok(Value::Number(p - c)),
                (Value::Text(_), _) => Err(DatasetError::NotNumeric {
                    column: premium.to_owned(),
                    row,
                }),
                (_, Value::Text(_)) => Err(DatasetError::NotNumeric {
                    column: claims.to_owned(),
                    row,
                }),
                _ => Ok(Value::Missing),
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("computed derived column '{margin}' = '{premium}' - '{claims}'");
        self.insert_column(Column {
            name: margin.to_owned(),
            values,
        })
    }

    /// Keeps only the rows for which `keep` returns `true`.
    pub(crate) fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize) -> bool,
    {
        let kept = (0..self.num_rows).filter(|&row| keep(row)).collect::<Vec<_>>();
        for column in &mut self.columns {
            column.values = kept.iter().map(|&row| column.values[row].clone()).collect();
        }
        self.num_rows = kept.len();
    }
}
