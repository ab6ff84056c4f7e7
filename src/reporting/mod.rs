//! Run results and logging
//!
//! The report aggregated by the coordinator and the structured logging
//! helpers used along the way.

pub mod logging;
pub mod report;

pub use logging::init_logger;
pub use report::{Report, ReportEntry, StatusCounts};
