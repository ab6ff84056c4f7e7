use std::fmt;

/// Error types for mdlinkcheck operations
#[derive(Debug)]
pub enum LinkCheckError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// HTTP client error
    Http(reqwest::Error),

    /// JSON report serialization error
    Serialization(serde_json::Error),

    /// Regex compilation error
    Regex(regex::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// File or directory not found
    FileNotFound(String),

    /// Invalid argument error
    InvalidArgument(String),

    /// File walking/ignore error
    FileWalking(ignore::Error),
}

impl fmt::Display for LinkCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkCheckError::Io(err) => write!(f, "IO error: {err}"),
            LinkCheckError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LinkCheckError::Http(err) => write!(f, "HTTP error: {err}"),
            LinkCheckError::Serialization(err) => write!(f, "Serialization error: {err}"),
            LinkCheckError::Regex(err) => write!(f, "Regex error: {err}"),
            LinkCheckError::TomlParsing(err) => write!(f, "Invalid TOML in config file: {err}"),
            LinkCheckError::FileNotFound(path) => write!(f, "Directory not found: {path}"),
            LinkCheckError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            LinkCheckError::FileWalking(err) => write!(f, "File walking error: {err}"),
        }
    }
}

impl std::error::Error for LinkCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkCheckError::Io(err) => Some(err),
            LinkCheckError::Http(err) => Some(err),
            LinkCheckError::Regex(err) => Some(err),
            LinkCheckError::TomlParsing(err) => Some(err),
            LinkCheckError::FileWalking(err) => Some(err),
            LinkCheckError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LinkCheckError {
    fn from(err: std::io::Error) -> Self {
        LinkCheckError::Io(err)
    }
}

impl From<reqwest::Error> for LinkCheckError {
    fn from(err: reqwest::Error) -> Self {
        LinkCheckError::Http(err)
    }
}

impl From<regex::Error> for LinkCheckError {
    fn from(err: regex::Error) -> Self {
        LinkCheckError::Regex(err)
    }
}

impl From<toml::de::Error> for LinkCheckError {
    fn from(err: toml::de::Error) -> Self {
        LinkCheckError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for LinkCheckError {
    fn from(err: serde_json::Error) -> Self {
        LinkCheckError::Serialization(err)
    }
}

impl From<ignore::Error> for LinkCheckError {
    fn from(err: ignore::Error) -> Self {
        LinkCheckError::FileWalking(err)
    }
}

/// Type alias for Results using LinkCheckError
pub type Result<T> = std::result::Result<T, LinkCheckError>;
