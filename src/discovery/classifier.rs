use reqwest::Url;

use crate::core::constants::schemes;
use crate::core::types::{Category, ClassifiedLink, LinkRecord};

/// Decide how a link target is checked.
///
/// Unknown schemes fall through to `Internal` so they are still checked
/// against the filesystem instead of being silently accepted.
pub fn classify(target: &str) -> Category {
    let target = target.trim();

    if is_skipped_scheme(target) || target.starts_with('#') {
        return Category::Skip;
    }

    if is_external(target) {
        Category::External
    } else {
        Category::Internal
    }
}

/// Attach a category to an extracted record
pub fn classify_record(record: LinkRecord) -> ClassifiedLink {
    let category = classify(&record.target);
    ClassifiedLink::new(record, category)
}

fn is_skipped_scheme(target: &str) -> bool {
    schemes::SKIPPED.iter().any(|scheme| {
        target
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// An absolute http(s) URL with a host
fn is_external(target: &str) -> bool {
    match Url::parse(target) {
        Ok(url) => schemes::PROBED.contains(&url.scheme()) && url.has_host(),
        Err(_) => false,
    }
}
