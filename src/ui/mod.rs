//! User interface
//!
//! CLI parsing, report rendering, terminal colors and progress bars.

pub mod cli;
pub mod color;
pub mod output;
pub mod progress;

// Re-export commonly used items
pub use cli::{Cli, cli_to_config};
pub use output::display_report;
pub use progress::ProgressReporter;
