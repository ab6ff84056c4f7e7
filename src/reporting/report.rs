use serde::Serialize;

use crate::core::types::{ClassifiedLink, LinkStatus, RunError};

/// One link with its verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub link: ClassifiedLink,
    pub status: LinkStatus,
    pub detail: String,
}

impl ReportEntry {
    pub fn new(link: ClassifiedLink, status: LinkStatus, detail: impl Into<String>) -> Self {
        Self {
            link,
            status,
            detail: detail.into(),
        }
    }
}

/// Per-status totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub valid: usize,
    pub broken: usize,
    pub skipped: usize,
    pub warning: usize,
}

impl StatusCounts {
    pub fn get(&self, status: LinkStatus) -> usize {
        match status {
            LinkStatus::Valid => self.valid,
            LinkStatus::Broken => self.broken,
            LinkStatus::Skipped => self.skipped,
            LinkStatus::Warning => self.warning,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.broken + self.skipped + self.warning
    }
}

/// Aggregated result of one run.
///
/// Built by the coordinator alone. Entries are kept sorted by file, line and
/// target so two runs over the same tree compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
    pub errors: Vec<RunError>,
    pub files_scanned: usize,
    pub links_found: usize,
    pub unique_external_urls: usize,
    pub cancelled: bool,
}

impl Report {
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            let (ra, rb) = (&a.link.record, &b.link.record);
            ra.source_file
                .cmp(&rb.source_file)
                .then(ra.line_number.cmp(&rb.line_number))
                .then_with(|| ra.target.cmp(&rb.target))
                .then_with(|| ra.link_kind.as_str().cmp(rb.link_kind.as_str()))
        });
        self.errors.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.message.cmp(&b.message))
        });
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in &self.entries {
            match entry.status {
                LinkStatus::Valid => counts.valid += 1,
                LinkStatus::Broken => counts.broken += 1,
                LinkStatus::Skipped => counts.skipped += 1,
                LinkStatus::Warning => counts.warning += 1,
            }
        }
        counts
    }

    pub fn with_status(&self, status: LinkStatus) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.status == status)
    }

    pub fn broken(&self) -> impl Iterator<Item = &ReportEntry> {
        self.with_status(LinkStatus::Broken)
    }

    pub fn has_broken(&self) -> bool {
        self.entries.iter().any(|e| e.status == LinkStatus::Broken)
    }

    /// True when the run can vouch for every link it found
    pub fn is_clean(&self) -> bool {
        !self.has_broken() && !self.cancelled
    }
}
