//! Engine configuration.
//!
//! Loaded from a TOML file supplied by whatever launched the pipeline; the
//! engine never chooses roots or dates itself. Parsed with serde, then
//! validated with messages precise enough to fix the file from.

use std::{fs, path::Path, time::Duration};

use jiff::civil::Date;
use serde::Deserialize;

use crate::discover::Strategy;
use crate::layout::Layout;
use crate::remote::RemoteSource;

/// Default polling budget: 12 hours, one observing night.
const DEFAULT_TIMEOUT_SECS: u64 = 12 * 60 * 60;

/// Default poll interval.
const DEFAULT_POLL_MILLIS: u64 = 2_000;

/// Errors from loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which discovery policy to run. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Work through `observations`.
    BoundedList,

    /// Count upward from the cursor until told to stop.
    Increment,

    /// Poll for literal filenames with size-stability sampling.
    TimedWait,

    /// Wait on flag files.
    FlagQuorum,

    /// Wait for live remote tasks to agree; sources are wired in code.
    TaskQuorum,

    /// Work through `files`.
    FileList,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Naming convention and the two directory roots.
    pub layout: Layout,

    /// UT date of the night being reduced.
    pub ut_date: Date,

    pub strategy: StrategyKind,

    /// Whether a missing expected observation may be skipped forward.
    #[serde(default)]
    pub skip: bool,

    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    #[serde(default = "default_poll_millis")]
    poll_millis: u64,

    /// Observation numbers for `bounded-list`.
    #[serde(default)]
    pub observations: Vec<u32>,

    /// Literal filenames for `file-list`.
    #[serde(default)]
    pub files: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_millis() -> u64 {
    DEFAULT_POLL_MILLIS
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        Self::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } | ConfigError::Invalid(message) => {
                ConfigError::Parse {
                    path: shown.clone(),
                    message,
                }
            }
            other => other,
        })
    }

    /// Parse and validate TOML contents.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.prefixes.is_empty() {
            return Err(ConfigError::Invalid(
                "layout.prefixes must name at least one subsystem prefix".to_string(),
            ));
        }
        if !self.layout.suffix.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "layout.suffix must include the leading dot, got \"{}\"",
                self.layout.suffix
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout-secs must be positive".to_string(),
            ));
        }
        if self.poll_millis == 0 {
            return Err(ConfigError::Invalid(
                "poll-millis must be positive".to_string(),
            ));
        }
        if self.strategy == StrategyKind::BoundedList {
            if self.observations.is_empty() {
                return Err(ConfigError::Invalid(
                    "bounded-list needs a non-empty observations list".to_string(),
                ));
            }
            // Delivery order is non-decreasing by contract; an unsorted
            // list cannot be honored.
            if let Some(pair) = self.observations.windows(2).find(|w| w[0] >= w[1]) {
                return Err(ConfigError::Invalid(format!(
                    "observations must be strictly ascending, got {} before {}",
                    pair[0], pair[1]
                )));
            }
        }
        if self.strategy == StrategyKind::FileList && self.files.is_empty() {
            return Err(ConfigError::Invalid(
                "file-list needs a non-empty files list".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_millis)
    }

    /// Build the configured strategy. `sources` are only consumed by
    /// `task-quorum`; other kinds ignore them.
    pub fn build_strategy(&self, sources: Vec<Box<dyn RemoteSource>>) -> Strategy {
        match self.strategy {
            StrategyKind::BoundedList => Strategy::bounded(self.observations.clone()),
            StrategyKind::Increment => Strategy::Increment,
            StrategyKind::TimedWait => Strategy::TimedWait,
            StrategyKind::FlagQuorum => Strategy::FlagQuorum,
            StrategyKind::TaskQuorum => Strategy::task(sources),
            StrategyKind::FileList => Strategy::file_list(self.files.clone()),
        }
    }
}
