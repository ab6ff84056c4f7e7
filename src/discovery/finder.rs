use rayon::prelude::*;

use crate::core::types::{LinkRecord, RunError};
use crate::discovery::extractor::extract_links;
use crate::ui::progress::ProgressReporter;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Links extracted from a set of files, plus the files that could not be read
#[derive(Debug, Default)]
pub struct ScanResult {
    pub links: Vec<LinkRecord>,
    pub errors: Vec<RunError>,
    pub files_scanned: usize,
}

pub trait LinkFinder {
    fn find_links(&self, paths: &[PathBuf], progress: Option<&ProgressReporter>) -> ScanResult;
}

#[derive(Default, Debug)]
pub struct Finder {}

impl LinkFinder for Finder {
    fn find_links(&self, paths: &[PathBuf], progress: Option<&ProgressReporter>) -> ScanResult {
        let done = AtomicUsize::new(0);

        // Files are independent, so read and extract them in parallel
        let per_file: Vec<std::result::Result<Vec<LinkRecord>, RunError>> = paths
            .par_iter()
            .map(|path| {
                let result = Self::scan_file(path);
                let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(prog) = progress {
                    if let Err(ref err) = result {
                        prog.log_warning(&err.to_string());
                    }
                    prog.update_file_progress(current);
                }
                result
            })
            .collect();

        let mut scan = ScanResult {
            files_scanned: paths.len(),
            ..Default::default()
        };
        for result in per_file {
            match result {
                Ok(links) => scan.links.extend(links),
                Err(err) => scan.errors.push(err),
            }
        }

        scan
    }
}

impl Finder {
    /// Read one file and extract its links.
    ///
    /// Unreadable files, including ones that are not valid UTF-8, yield a
    /// `RunError` and contribute no links.
    fn scan_file(path: &Path) -> std::result::Result<Vec<LinkRecord>, RunError> {
        let content = fs::read_to_string(path).map_err(|e| {
            log::warn!("Could not read {}: {e}", path.display());
            RunError::new(Some(path.to_path_buf()), format!("Error reading file: {e}"))
        })?;

        let links = extract_links(&content, path);
        log::debug!("{}: {} link(s)", path.display(), links.len());
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_find_links__across_files() -> TestResult {
        let dir = tempfile::tempdir()?;
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "[b](b.md)\n[site](https://example.com)")?;
        fs::write(&b, "no links\n\n![img](pic.png)")?;

        let scan = Finder::default().find_links(&[a.clone(), b.clone()], None);

        assert_eq!(scan.files_scanned, 2);
        assert_eq!(scan.links.len(), 3);
        assert!(scan.errors.is_empty());
        assert!(
            scan.links
                .iter()
                .any(|l| l.source_file == b && l.line_number == 3)
        );
        Ok(())
    }

    #[test]
    fn test_find_links__unreadable_file_is_recorded_not_fatal() -> TestResult {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("good.md");
        let bad = dir.path().join("bad.md");
        fs::write(&good, "[x](y.md)")?;
        fs::write(&bad, [0xffu8, 0xfe, 0x5b, 0x00])?;

        let scan = Finder::default().find_links(&[good, bad.clone()], None);

        assert_eq!(scan.files_scanned, 2);
        assert_eq!(scan.links.len(), 1);
        assert_eq!(scan.errors.len(), 1);
        assert_eq!(scan.errors[0].path.as_deref(), Some(bad.as_path()));
        Ok(())
    }

    #[test]
    fn test_find_links__missing_file() {
        let scan = Finder::default().find_links(&[PathBuf::from("/no/such/file.md")], None);
        assert_eq!(scan.errors.len(), 1);
        assert!(scan.errors[0].message.starts_with("Error reading file"));
    }
}
