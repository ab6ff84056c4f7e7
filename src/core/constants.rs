/// Application-wide constants to avoid magic values throughout the codebase.
///
/// Output format constants
pub mod output_formats {
    /// Text output format - colorful tables for humans
    pub const TEXT: &str = "text";
    /// JSON output format - structured output for automation
    pub const JSON: &str = "json";
    /// Minimal output format - one broken link per line, no colors
    pub const MINIMAL: &str = "minimal";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 3] = [TEXT, JSON, MINIMAL];
}

/// HTTP status code constants
pub mod http_status {
    /// HTTP 405 Method Not Allowed - HEAD rejected, fall back to GET
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    /// Anything at or above this status is a broken link
    pub const FIRST_ERROR: u16 = 400;
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default per-probe timeout in seconds
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
    /// Maximum accepted timeout in seconds (24 hours)
    pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;
    /// Base of the exponential backoff between attempts, in seconds
    pub const BACKOFF_BASE_SECONDS: u64 = 1;
}

/// Default configuration values
pub mod defaults {
    /// Global bound on in-flight probes
    pub const MAX_CONCURRENT: usize = 50;
    /// Attempts per URL before it is marked failed
    pub const MAX_RETRIES: u32 = 3;
    /// Extension scanned when none is configured
    pub const FILE_TYPE: &str = "md";
    /// Redirect hops followed before giving up
    pub const MAX_REDIRECTS: usize = 10;
    /// Config file looked up in the working directory and its parents
    pub const CONFIG_FILE_NAME: &str = ".mdlinkcheck.toml";
}

/// Upper bounds accepted by configuration validation
pub mod limits {
    pub const MAX_CONCURRENT: usize = 1000;
    pub const MAX_RETRIES: u32 = 20;
}

/// Link classification constants
pub mod schemes {
    /// Target prefixes that are never checked (compared case-insensitively)
    pub const SKIPPED: [&str; 5] = ["mailto:", "tel:", "javascript:", "data:", "ftp:"];
    /// Schemes that are probed over the network
    pub const PROBED: [&str; 2] = ["http", "https"];
}

/// Diagnostic strings attached to report entries
pub mod messages {
    pub const TIMEOUT: &str = "Timeout";
    pub const CANCELLED: &str = "Not checked: run cancelled";
    pub const MAX_RETRIES_EXCEEDED: &str = "Max retries exceeded";
    pub const INTERNAL_FOUND: &str = "Internal path exists";
    pub const INTERNAL_MISSING: &str = "Internal path not found";
    pub const SKIPPED_SCHEME: &str = "Skipped URL type";
    pub const SKIPPED_FRAGMENT: &str = "Fragment link";
    pub const EXCLUDED: &str = "Excluded by pattern";
    pub const EMPTY_TARGET: &str = "Empty link target";
}

/// Display and formatting constants
pub mod display {
    /// Longest error message kept in a probe diagnostic
    pub const MAX_ERROR_CHARS: usize = 50;
    /// Longest URL shown in the broken-links table
    pub const MAX_URL_CHARS: usize = 60;

    pub const VALID_EMOJI: &str = "✅";
    pub const BROKEN_EMOJI: &str = "❌";
    pub const WARNING_EMOJI: &str = "⚠️";
    pub const SKIPPED_EMOJI: &str = "⏭️";
    pub const FILE_EMOJI: &str = "📁";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_formats_constants() {
        assert_eq!(output_formats::DEFAULT, "text");
        assert_eq!(output_formats::ALL.len(), 3);
        assert!(output_formats::ALL.contains(&output_formats::JSON));
    }

    #[test]
    fn test_defaults_match_documented_cli() {
        assert_eq!(timeouts::DEFAULT_TIMEOUT_SECONDS, 10);
        assert_eq!(defaults::MAX_CONCURRENT, 50);
        assert_eq!(defaults::MAX_RETRIES, 3);
    }

    #[test]
    fn test_skipped_schemes_are_lowercase() {
        for scheme in schemes::SKIPPED {
            assert_eq!(scheme, scheme.to_ascii_lowercase());
            assert!(scheme.ends_with(':'));
        }
    }
}
