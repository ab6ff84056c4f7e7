use crate::config::Config;
use log::{debug, error, info, warn};
use std::path::Path;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Off
    };

    // A second init (tests, embedding) keeps the first logger
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log the effective configuration of a run
pub fn log_config_info(config: &Config) {
    info!(
        "Configuration: timeout={}s, max_concurrent={}, max_retries={}",
        config.timeout_duration().as_secs(),
        config.max_concurrent(),
        config.max_retries()
    );
    info!(
        "Scanning extensions: {}",
        config.file_extensions().join(", ")
    );
    if let Some(ref patterns) = config.exclude_patterns {
        info!("Exclude patterns: {}", patterns.join(", "));
    }
    debug!("User-Agent: {}", config.user_agent());
}

/// Log file discovery information
pub fn log_file_info<P: AsRef<Path>>(file_count: usize, files: &[P]) {
    info!("Processing {file_count} file(s)");
    for (i, file) in files.iter().enumerate() {
        debug!("  {}. {}", i + 1, file.as_ref().display());
    }
}

/// Log link discovery information
pub fn log_link_discovery(total_links: usize, unique_external: usize) {
    info!("Found {total_links} link(s), {unique_external} unique external URL(s)");
}

/// Log the outcome of one probe
pub fn log_probe_result(url: &str, ok: bool, detail: &str, attempts: u32) {
    if ok {
        debug!("✓ {url} -> {detail}");
    } else {
        debug!("✗ {url} -> {detail} after {attempts} attempt(s)");
    }
}

/// Log run completion
pub fn log_run_complete(links: usize, broken: usize, duration_ms: u128) {
    if broken == 0 {
        info!("✅ Check complete: {links} link(s), none broken ({duration_ms}ms)");
    } else {
        warn!("❌ Check complete: {links} link(s), {broken} broken ({duration_ms}ms)");
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}
