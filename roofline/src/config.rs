//! This module controls configuration parsing from the end user, layering an
//! optional YAML file beneath command line flags.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use roofline_metrics::derive::TimeStrategy;
use serde::Deserialize;

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
}

/// Main configuration struct for this program
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How elapsed time is estimated
    #[serde(default)]
    pub strategy: Option<TimeStrategy>,
    /// Directory holding `ncu-<label>.out`
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    /// Directory receiving `helper-<label>.out`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Layer `other` on top of `self`. Fields set in `other` win.
    #[must_use]
    pub fn overlay(self, other: Config) -> Config {
        Config {
            strategy: other.strategy.or(self.strategy),
            input_dir: other.input_dir.or(self.input_dir),
            output_dir: other.output_dir.or(self.output_dir),
        }
    }
}

/// Fully resolved parameters of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Report label, the `<label>` in `ncu-<label>.out`
    pub label: String,
    /// How elapsed time is estimated
    pub strategy: TimeStrategy,
    /// Directory holding the input report
    pub input_dir: PathBuf,
    /// Directory receiving the output report
    pub output_dir: PathBuf,
}

impl Settings {
    /// Resolve `config` for `label`, defaulting unset directories to the
    /// current directory.
    #[must_use]
    pub fn new(label: impl Into<String>, config: Config) -> Self {
        Self {
            label: label.into(),
            strategy: config.strategy.unwrap_or_default(),
            input_dir: config.input_dir.unwrap_or_else(|| PathBuf::from(".")),
            output_dir: config.output_dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Path of the plain text input report.
    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(format!("ncu-{}.out", self.label))
    }

    /// Path of the zstd-compressed input report.
    #[must_use]
    pub fn compressed_input_path(&self) -> PathBuf {
        self.input_dir.join(format!("ncu-{}.out.zstd", self.label))
    }

    /// Path of the output report.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("helper-{}.out", self.label))
    }
}
