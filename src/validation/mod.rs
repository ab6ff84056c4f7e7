//! Link validation
//!
//! Internal links are resolved against the filesystem, external links are
//! probed over HTTP, and the coordinator drives a whole run.

pub mod coordinator;
pub mod prober;
pub mod resolver;

// Re-export commonly used items
pub use coordinator::LinkChecker;
pub use prober::{
    HttpTransport, ProbeMethod, ProbeOutcome, ProbeState, Prober, ReqwestTransport, TransportError,
};
pub use resolver::{Resolution, resolve_internal};
