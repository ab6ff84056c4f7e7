//! Link discovery and file processing
//!
//! This module walks the directory tree, reads candidate files and turns
//! their content into classified link records.

pub mod classifier;
pub mod extractor;
pub mod finder;
pub mod path_utils;

// Re-export commonly used items
pub use classifier::{classify, classify_record};
pub use extractor::extract_links;
pub use finder::{Finder, LinkFinder, ScanResult};
pub use path_utils::{Discovery, discover_files, project_root};
