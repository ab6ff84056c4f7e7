use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The syntactic form a link was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// `[text](target)`
    MarkdownInline,
    /// `[text][ref-id]` resolved through a `[ref-id]: target` definition
    ReferenceStyle,
    /// `<a href="target">`
    HtmlAnchor,
    /// `![alt](target)`
    Image,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::MarkdownInline => "markdown-inline",
            LinkKind::ReferenceStyle => "reference-style",
            LinkKind::HtmlAnchor => "html-anchor",
            LinkKind::Image => "image",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link discovered in a document.
///
/// `target` holds the URL or path exactly as written (trimmed). Resolution
/// and probing derive new values from it and never rewrite it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkRecord {
    /// Document containing the link
    pub source_file: PathBuf,
    /// Line where the link starts (1-indexed)
    pub line_number: u64,
    /// Syntactic form of the link
    pub link_kind: LinkKind,
    /// Link text or image alt text, may be empty
    pub display_text: String,
    /// Raw URL or path
    pub target: String,
}

/// Errors that can occur when building a `LinkRecord`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRecordError {
    /// Source file path is empty
    MissingSourceFile,
    /// Line number is invalid (zero)
    InvalidLineNumber,
}

impl fmt::Display for LinkRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSourceFile => write!(f, "Source file is required and cannot be empty"),
            Self::InvalidLineNumber => write!(f, "Line number must be greater than 0"),
        }
    }
}

impl std::error::Error for LinkRecordError {}

impl LinkRecord {
    /// Create a new LinkRecord with validation.
    ///
    /// # Examples
    /// ```
    /// use mdlinkcheck::core::types::{LinkKind, LinkRecord};
    ///
    /// let record = LinkRecord::new(
    ///     "docs/intro.md",
    ///     3,
    ///     LinkKind::MarkdownInline,
    ///     " guide ",
    ///     " ./guide.md ",
    /// ).unwrap();
    /// assert_eq!(record.target, "./guide.md");
    /// assert_eq!(record.display_text, "guide");
    /// ```
    pub fn new(
        source_file: impl Into<PathBuf>,
        line_number: u64,
        link_kind: LinkKind,
        display_text: impl AsRef<str>,
        target: impl AsRef<str>,
    ) -> Result<Self, LinkRecordError> {
        let source_file = source_file.into();
        if source_file.as_os_str().is_empty() {
            return Err(LinkRecordError::MissingSourceFile);
        }
        if line_number == 0 {
            return Err(LinkRecordError::InvalidLineNumber);
        }

        Ok(Self {
            source_file,
            line_number,
            link_kind,
            display_text: display_text.as_ref().trim().to_string(),
            target: target.as_ref().trim().to_string(),
        })
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// How a link is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Filesystem-relative or site-absolute path
    Internal,
    /// Network-reachable http(s) URL
    External,
    /// Never checked
    Skip,
}

/// A `LinkRecord` tagged with its `Category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLink {
    #[serde(flatten)]
    pub record: LinkRecord,
    pub category: Category,
}

impl ClassifiedLink {
    pub fn new(record: LinkRecord, category: Category) -> Self {
        Self { record, category }
    }
}

/// Final verdict for one link in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Valid,
    Broken,
    Skipped,
    Warning,
}

impl LinkStatus {
    pub const ALL: [LinkStatus; 4] = [
        LinkStatus::Valid,
        LinkStatus::Broken,
        LinkStatus::Skipped,
        LinkStatus::Warning,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Valid => "Valid",
            LinkStatus::Broken => "Broken",
            LinkStatus::Skipped => "Skipped",
            LinkStatus::Warning => "Warning",
        }
    }
}

/// A per-file or per-entry failure that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunError {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl RunError {
    pub fn new(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "{}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}
