use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Args;
use riskab_analysis::dataset::Dataset;

/// Destination of a command's JSON or CSV output.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Opens `path` for writing, or stdout when no path is given.
    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(path) = output_path else {
            return Ok(Output::Stdout(io::stdout().lock()));
        };
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    /// Writes `value` as pretty JSON followed by a newline.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        let target = output.display_path();
        serde_json::to_writer_pretty(&mut output, value)
            .with_context(|| format!("Failed to write JSON to {target}"))?;
        writeln!(output)
            .and_then(|()| output.flush())
            .with_context(|| format!("Failed to finish writing {target}"))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Reads a JSON configuration file.
pub fn read_json_config<T, P>(path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Location and format of a delimited dataset file
#[derive(Debug, Clone, Args)]
pub struct DatasetInput {
    /// Path to the dataset file (headered CSV)
    pub dataset: PathBuf,

    /// Field delimiter of the dataset file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

impl DatasetInput {
    /// Read the dataset file
    ///
    /// # Errors
    ///
    /// Returns error if the delimiter is not a single-byte character, or the
    /// file cannot be opened or parsed
    pub fn read(&self) -> anyhow::Result<Dataset> {
        let delimiter = u8::try_from(self.delimiter)
            .with_context(|| format!("Delimiter must be ASCII: {:?}", self.delimiter))?;
        let path = &self.dataset;
        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;
        let dataset = Dataset::from_csv_reader(io::BufReader::new(file), delimiter)
            .with_context(|| format!("Failed to parse dataset file: {}", path.display()))?;
        log::info!(
            "loaded {} rows from {}",
            dataset.num_rows(),
            path.display()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use riskab_analysis::config::TestConfig;

    use super::*;

    #[test]
    fn test_saved_config_reads_back() {
        let path = std::env::temp_dir().join(format!("riskab-config-{}.json", std::process::id()));
        let config = TestConfig {
            significance_level: 0.01,
            ..TestConfig::default()
        };
        Output::save_json(&config, Some(path.clone())).unwrap();
        let loaded: TestConfig = read_json_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_config_file_names_path() {
        let err = read_json_config::<TestConfig, _>("/nonexistent/riskab.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/riskab.json"));
    }
}
