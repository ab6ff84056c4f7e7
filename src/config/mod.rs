//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::constants::{defaults, limits, output_formats, timeouts};
use crate::core::error::{LinkCheckError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-probe timeout in seconds
    pub timeout: Option<u64>,

    /// Global bound on simultaneous in-flight probes
    pub max_concurrent: Option<usize>,

    /// Attempts per external URL before it is marked failed
    pub max_retries: Option<u32>,

    /// File extensions to scan
    pub file_types: Option<Vec<String>>,

    /// Link targets to skip (regex)
    pub exclude_patterns: Option<Vec<String>>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Output format (text, json, minimal)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Some(timeouts::DEFAULT_TIMEOUT_SECONDS),
            max_concurrent: Some(defaults::MAX_CONCURRENT),
            max_retries: Some(defaults::MAX_RETRIES),
            file_types: Some(vec![defaults::FILE_TYPE.to_string()]),
            exclude_patterns: None,
            user_agent: None,
            output_format: Some(output_formats::DEFAULT.to_string()),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LinkCheckError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).inspect_err(|_| {
            log::debug!("Config file {} failed to parse", path.display());
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Find and load `.mdlinkcheck.toml` from `start` or up to 3 parent
    /// directories. A file that exists but does not parse is an error.
    pub fn load_from_standard_locations_in(start: &Path) -> Result<Self> {
        for dir in start.ancestors().take(4) {
            let candidate = dir.join(defaults::CONFIG_FILE_NAME);
            if candidate.is_file() {
                log::debug!("Using config file {}", candidate.display());
                return Self::load_from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// `load_from_standard_locations_in` starting at the working directory
    pub fn load_from_standard_locations() -> Result<Self> {
        Self::load_from_standard_locations_in(&std::env::current_dir()?)
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(max_concurrent) = cli_config.max_concurrent {
            self.max_concurrent = Some(max_concurrent);
        }
        if let Some(max_retries) = cli_config.max_retries {
            self.max_retries = Some(max_retries);
        }

        if let Some(ref file_types) = cli_config.file_types {
            self.file_types = Some(file_types.clone());
        }
        if let Some(ref exclude_patterns) = cli_config.exclude_patterns {
            self.exclude_patterns = Some(exclude_patterns.clone());
        }

        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
    }

    /// Compile exclude patterns into regex objects
    pub fn compile_exclude_patterns(&self) -> Result<Vec<Regex>> {
        let mut compiled = Vec::new();
        if let Some(ref patterns) = self.exclude_patterns {
            for pattern in patterns {
                compiled.push(Regex::new(pattern)?);
            }
        }
        Ok(compiled)
    }

    /// Extensions to scan, normalized to lowercase without a leading dot
    pub fn file_extensions(&self) -> Vec<String> {
        match self.file_types {
            Some(ref types) if !types.is_empty() => types
                .iter()
                .map(|t| t.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => vec![defaults::FILE_TYPE.to_string()],
        }
    }

    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(timeouts::DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.unwrap_or(defaults::MAX_CONCURRENT)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(defaults::MAX_RETRIES)
    }

    /// User-Agent sent with every probe
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            format!(
                "{}/{} (Markdown link checker)",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )
        })
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(LinkCheckError::Config(
                    "Timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_TIMEOUT_SECONDS {
                return Err(LinkCheckError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if let Some(max_concurrent) = self.max_concurrent {
            if max_concurrent == 0 {
                return Err(LinkCheckError::Config(
                    "Max concurrent probes cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if max_concurrent > limits::MAX_CONCURRENT {
                return Err(LinkCheckError::Config(format!(
                    "Max concurrent probes of {max_concurrent} is extremely high. Expected at most {}.",
                    limits::MAX_CONCURRENT
                )));
            }
        }

        if let Some(max_retries) = self.max_retries {
            if max_retries == 0 {
                return Err(LinkCheckError::Config(
                    "Max retries cannot be 0. Every external URL needs at least one attempt."
                        .to_string(),
                ));
            }
            if max_retries > limits::MAX_RETRIES {
                return Err(LinkCheckError::Config(format!(
                    "Max retries of {max_retries} is very high and may cause long delays. Expected at most {}.",
                    limits::MAX_RETRIES
                )));
            }
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(LinkCheckError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        self.compile_exclude_patterns()?;

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Core options
    pub timeout: Option<u64>,          // --timeout
    pub max_concurrent: Option<usize>, // --max-concurrent
    pub max_retries: Option<u32>,      // --max-retries

    // Filtering
    pub file_types: Option<Vec<String>>,       // --include
    pub exclude_patterns: Option<Vec<String>>, // --exclude-pattern

    // Output & format
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format
    pub no_progress: bool,             // --no-progress

    // Network
    pub user_agent: Option<String>, // --user-agent

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
