// Command-line interface definitions and parsing for mdlinkcheck

use crate::config::CliConfig;
use crate::core::constants::output_formats;
use crate::core::error::{LinkCheckError, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory (or single file) to check
    #[arg(default_value = ".")]
    pub directory: String,

    // Core Options
    /// Per-request timeout in seconds (default: 10)
    #[arg(long, value_name = "SECONDS", help_heading = "Core Options")]
    pub timeout: Option<u64>,

    /// Maximum probes in flight at once (default: 50)
    #[arg(long, value_name = "N", help_heading = "Core Options")]
    pub max_concurrent: Option<usize>,

    /// Attempts per external URL (default: 3)
    #[arg(long, value_name = "N", help_heading = "Core Options")]
    pub max_retries: Option<u32>,

    // Filtering
    /// File extensions to scan, comma-separated (default: md)
    #[arg(long, value_name = "EXTENSIONS", help_heading = "Filtering")]
    pub include: Option<String>,

    /// Link targets to skip (regex, repeatable)
    #[arg(long, value_name = "REGEX", help_heading = "Filtering")]
    pub exclude_pattern: Vec<String>,

    // Output & Verbosity
    /// Only print broken links and errors
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Output format (default: text)
    #[arg(
        long,
        value_name = "FORMAT",
        value_parser = output_formats::ALL,
        help_heading = "Output & Verbosity"
    )]
    pub format: Option<String>,

    /// Disable progress bars
    #[arg(long, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Network
    /// Custom User-Agent header
    #[arg(long, value_name = "AGENT", help_heading = "Network")]
    pub user_agent: Option<String>,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

/// Convert parsed arguments into the CLI layer of the configuration
pub fn cli_to_config(cli: &Cli) -> Result<CliConfig> {
    let mut cli_config = CliConfig {
        timeout: cli.timeout,
        max_concurrent: cli.max_concurrent,
        max_retries: cli.max_retries,
        quiet: cli.quiet,
        verbose: cli.verbose,
        output_format: cli.format.clone(),
        no_progress: cli.no_progress,
        user_agent: cli.user_agent.clone().filter(|ua| !ua.trim().is_empty()),
        config_file: cli.config.clone(),
        no_config: cli.no_config,
        ..CliConfig::default()
    };

    if let Some(ref include_str) = cli.include {
        let extensions: Vec<String> = include_str
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(LinkCheckError::InvalidArgument(format!(
                "--include '{include_str}' names no file extensions. Expected e.g. md,markdown."
            )));
        }
        cli_config.file_types = Some(extensions);
    }

    if !cli.exclude_pattern.is_empty() {
        cli_config.exclude_patterns = Some(cli.exclude_pattern.clone());
    }

    Ok(cli_config)
}
