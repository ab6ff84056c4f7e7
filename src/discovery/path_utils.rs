use std::path::{Path, PathBuf};

use crate::core::error::{LinkCheckError, Result};
use crate::core::types::RunError;

/// Files found under a root plus the walk errors that were skipped over
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub errors: Vec<RunError>,
}

/// Recursively collect files under `root` whose extension is in `extensions`.
///
/// A single file is accepted as its own root. Unreadable entries are
/// reported in `Discovery::errors` and do not stop the walk. The result is
/// sorted so repeated runs visit files in the same order.
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Discovery> {
    if !root.exists() {
        return Err(LinkCheckError::FileNotFound(root.display().to_string()));
    }

    let mut discovery = Discovery::default();

    if root.is_file() {
        if has_wanted_extension(root, extensions) {
            discovery.files.push(root.to_path_buf());
        }
        return Ok(discovery);
    }

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).require_git(false);

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                discovery.errors.push(walk_error(err));
                continue;
            }
        };

        let entry_path = entry.path();
        if entry.file_type().is_some_and(|ft| ft.is_file())
            && has_wanted_extension(entry_path, extensions)
        {
            discovery.files.push(entry_path.to_path_buf());
        }
    }

    discovery.files.sort();
    Ok(discovery)
}

/// Record a walk failure against the path it happened on, when known
fn walk_error(err: ignore::Error) -> RunError {
    let path = error_path(&err).map(Path::to_path_buf);
    RunError::new(path, LinkCheckError::from(err).to_string())
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

fn has_wanted_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)),
        None => extensions.iter().any(|wanted| wanted.is_empty()),
    }
}

/// Directory that site-absolute links (`/docs/x.md`) resolve against
pub fn project_root(root: &Path) -> PathBuf {
    if root.is_file() {
        root.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        root.to_path_buf()
    }
}
