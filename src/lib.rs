//! mdlinkcheck: find broken links in a tree of Markdown documents.
//!
//! Links are extracted from every matching file, classified as internal,
//! external or skipped, then checked. Internal links are resolved against
//! the filesystem and external links are probed over HTTP under a global
//! concurrency bound.

pub mod config;
pub mod core;
pub mod discovery;
pub mod reporting;
pub mod ui;
pub mod validation;

// Re-export commonly used items
pub use crate::config::{CliConfig, Config};
pub use crate::core::error::{LinkCheckError, Result};
pub use crate::core::types::{Category, ClassifiedLink, LinkKind, LinkRecord, LinkStatus, RunError};
pub use crate::reporting::report::{Report, ReportEntry};
pub use crate::validation::coordinator::LinkChecker;
