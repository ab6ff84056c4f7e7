//! Core types and foundational components
//!
//! This module contains the link data model, error handling,
//! and constants used throughout the application.

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items for convenience
pub use error::{LinkCheckError, Result};
pub use types::{
    Category, ClassifiedLink, LinkKind, LinkRecord, LinkRecordError, LinkStatus, RunError,
};
