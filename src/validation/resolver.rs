use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where an internal link points and whether it exists right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    pub exists: bool,
}

/// Resolve an internal link target against the filesystem.
///
/// The `#fragment` and `?query` suffixes are ignored. A leading `/` resolves
/// against `project_root`, anything else against the directory of
/// `source_file`. A missing extensionless path is retried with `.md`.
/// Every call hits the filesystem. Any error (permissions, loops) reads as
/// "does not exist".
pub fn resolve_internal(target: &str, source_file: &Path, project_root: &Path) -> Resolution {
    let path_part = strip_suffixes(target.trim());

    let resolved = match path_part.strip_prefix('/') {
        Some(site_absolute) => project_root.join(site_absolute.trim_start_matches('/')),
        None => source_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(path_part),
    };

    if exists(&resolved) {
        return Resolution {
            path: resolved,
            exists: true,
        };
    }

    if resolved.extension().is_none() && !path_part.is_empty() && !path_part.ends_with('/') {
        let mut with_md = OsString::from(resolved.as_os_str());
        with_md.push(".md");
        let with_md = PathBuf::from(with_md);
        if exists(&with_md) {
            return Resolution {
                path: with_md,
                exists: true,
            };
        }
    }

    Resolution {
        path: resolved,
        exists: false,
    }
}

fn strip_suffixes(target: &str) -> &str {
    match target.find(['#', '?']) {
        Some(idx) => &target[..idx],
        None => target,
    }
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}
