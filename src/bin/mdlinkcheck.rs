use clap::Parser;
use mdlinkcheck::config::{CliConfig, Config};
use mdlinkcheck::core::constants::output_formats;
use mdlinkcheck::reporting::{Report, logging};
use mdlinkcheck::ui::{Cli, ProgressReporter, cli_to_config, display_report};
use mdlinkcheck::validation::LinkChecker;
use tokio_util::sync::CancellationToken;

use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run_mdlinkcheck_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Main link checking flow extracted from main() for testing
pub async fn run_mdlinkcheck_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli)?;
    let config = load_and_merge_config(&cli_config)?;

    let output_settings = setup_output_settings(&cli_config, &config);
    logging::init_logger(output_settings.verbose, output_settings.quiet);
    logging::log_config_info(&config);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    // The HTTP client lives as long as the checker and is dropped with it
    let checker = LinkChecker::with_reqwest(config, cancel)?;

    let mut progress = create_progress_reporter(&output_settings);
    let result = checker
        .check(Path::new(&cli.directory), progress.as_mut())
        .await;
    finalize_progress_reporter(progress);

    let report = result.inspect_err(|e| logging::log_error("Check failed", Some(e)))?;
    display_report(&report, &output_settings.output_format, output_settings.quiet)?;

    Ok(determine_exit_code(&report))
}

/// Load configuration and merge CLI arguments on top, then validate the result
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()?
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Settings for output formatting and display
#[derive(Debug)]
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub output_format: String,
    pub show_progress: bool,
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let verbose = config.verbose.unwrap_or(false);
    let output_format = config.output_format().to_string();
    let show_progress = !quiet && !cli_config.no_progress;

    OutputSettings {
        quiet,
        verbose,
        output_format,
        show_progress,
    }
}

/// Exit status after a second Ctrl-C (128 + SIGINT)
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, PartialEq, Eq)]
enum InterruptAction {
    Cancel,
    ForceExit,
}

/// First interrupt cancels the run, any later one forces an exit
fn on_interrupt(cancel: &CancellationToken) -> InterruptAction {
    if cancel.is_cancelled() {
        InterruptAction::ForceExit
    } else {
        cancel.cancel();
        InterruptAction::Cancel
    }
}

/// Ctrl-C cancels the run. In-flight requests finish and the partial report
/// is still printed. A second Ctrl-C exits immediately.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&cancel) {
                InterruptAction::Cancel => {
                    eprintln!("Interrupted: waiting for in-flight requests (Ctrl-C to quit)");
                }
                InterruptAction::ForceExit => {
                    eprintln!("Interrupted again: exiting");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    });
}

/// Create progress reporter if needed
pub fn create_progress_reporter(output_settings: &OutputSettings) -> Option<ProgressReporter> {
    if output_settings.show_progress && output_settings.output_format == output_formats::TEXT {
        Some(ProgressReporter::new(true))
    } else {
        None
    }
}

pub fn finalize_progress_reporter(progress: Option<ProgressReporter>) {
    if let Some(ref progress) = progress {
        progress.finish_and_clear();
    }
}

/// Any broken link, or an interrupted run, fails the check
pub fn determine_exit_code(report: &Report) -> i32 {
    if report.is_clean() { 0 } else { 1 }
}
