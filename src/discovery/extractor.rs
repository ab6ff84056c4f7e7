use memchr::memchr_iter;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::core::types::{LinkKind, LinkRecord};

use std::path::Path;

// `[text](target)` and `![alt](target)` share one pattern so an image is
// never reported a second time as an inline link.
// The destination may hold one level of balanced parentheses, as in
// `https://en.wikipedia.org/wiki/Rust_(programming_language)`.
const INLINE_PATTERN: &str = r"(!?)\[([^\[\]]*)\]\(((?:[^()\n]|\([^()\n]*\))*)\)";
const REFERENCE_LINK_PATTERN: &str = r"\[([^\[\]]*)\]\[([^\[\]]+)\]";
const REFERENCE_DEFINITION_PATTERN: &str = r"(?m)^[ \t]*\[([^\[\]]+)\]:[ \t]*(.+)$";
const HTML_ANCHOR_PATTERN: &str =
    r#"(?is)<a\s+(?:[^>]*?\s)?href\s*=\s*["']([^"']*)["'][^>]*>(?:([^<]*)</a\s*>)?"#;

static INLINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(INLINE_PATTERN).expect("Failed to compile inline link pattern"));
static REFERENCE_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(REFERENCE_LINK_PATTERN).expect("Failed to compile reference link pattern")
});
static REFERENCE_DEFINITION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(REFERENCE_DEFINITION_PATTERN)
        .expect("Failed to compile reference definition pattern")
});
static HTML_ANCHOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(HTML_ANCHOR_PATTERN).expect("Failed to compile HTML anchor pattern")
});

/// Extract every link from the content of one document.
///
/// Extraction is best-effort: malformed syntax simply does not match, and a
/// reference link whose id has no definition is dropped. Records come back
/// in document order.
pub fn extract_links(content: &str, source_file: &Path) -> Vec<LinkRecord> {
    let mut found: Vec<(usize, LinkRecord)> = Vec::new();
    let mut push = |offset: usize, kind: LinkKind, text: &str, target: &str| {
        let line = line_number_at(content, offset);
        // line is always >= 1 and source_file comes from the walker
        if let Ok(record) = LinkRecord::new(source_file, line, kind, text, target) {
            found.push((offset, record));
        }
    };

    for caps in INLINE_REGEX.captures_iter(content) {
        let whole = caps.get(0).map_or(0, |m| m.start());
        let is_image = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let kind = if is_image {
            LinkKind::Image
        } else {
            LinkKind::MarkdownInline
        };
        push(whole, kind, &caps[2], link_destination(&caps[3]));
    }

    let definitions = reference_definitions(content);
    if !definitions.is_empty() {
        for caps in REFERENCE_LINK_REGEX.captures_iter(content) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if let Some(target) = definitions.get(&normalize_label(&caps[2])) {
                push(start, LinkKind::ReferenceStyle, &caps[1], target);
            }
        }
    }

    for caps in HTML_ANCHOR_REGEX.captures_iter(content) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let text = caps.get(2).map_or("", |m| m.as_str());
        push(start, LinkKind::HtmlAnchor, text, &caps[1]);
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, record)| record).collect()
}

/// Collect `[ref-id]: target` definitions keyed by normalized label.
///
/// The first definition of a label wins.
fn reference_definitions(content: &str) -> FxHashMap<String, String> {
    let mut definitions = FxHashMap::default();
    for caps in REFERENCE_DEFINITION_REGEX.captures_iter(content) {
        definitions
            .entry(normalize_label(&caps[1]))
            .or_insert_with(|| link_destination(&caps[2]).to_string());
    }
    definitions
}

/// Destination part of `target "title"`, `target 'title'`, `target (title)`
/// or `<target> "title"`.
///
/// A remainder that is not a well-formed title is kept as part of the target.
fn link_destination(raw: &str) -> &str {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix('<') {
        if let Some(end) = rest.find('>') {
            if is_title(&rest[end + 1..]) {
                return rest[..end].trim();
            }
        }
        return raw;
    }

    match raw.find(char::is_whitespace) {
        Some(split) if is_title(&raw[split..]) => &raw[..split],
        _ => raw,
    }
}

/// Empty, or a title wrapped in double quotes, single quotes or parentheses
fn is_title(rest: &str) -> bool {
    let rest = rest.trim();
    if rest.is_empty() {
        return true;
    }
    if rest.len() < 2 {
        return false;
    }
    matches!(
        (rest.as_bytes()[0], rest.as_bytes()[rest.len() - 1]),
        (b'"', b'"') | (b'\'', b'\'') | (b'(', b')')
    )
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 1-based line of a byte offset, counted with SIMD newline search
fn line_number_at(content: &str, offset: usize) -> u64 {
    let end = offset.min(content.len());
    memchr_iter(b'\n', &content.as_bytes()[..end]).count() as u64 + 1
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn extract(content: &str) -> Vec<LinkRecord> {
        extract_links(content, Path::new("prompts/sample.md"))
    }

    #[test]
    fn test_extract__one_of_each_kind() {
        let content = "# Title\n\
                       See [the guide](guide.md) first.\n\
                       ![diagram](img/flow.png)\n\
                       <a class=\"btn\" href=\"https://example.com\">Home</a>\n\
                       Read [the manual][manual] too.\n\
                       \n\
                       [manual]: https://example.com/manual\n";

        let links = extract(content);

        assert_eq!(links.len(), 4);
        assert_eq!(links[0].link_kind, LinkKind::MarkdownInline);
        assert_eq!(links[0].target, "guide.md");
        assert_eq!(links[0].display_text, "the guide");
        assert_eq!(links[0].line_number, 2);

        assert_eq!(links[1].link_kind, LinkKind::Image);
        assert_eq!(links[1].display_text, "diagram");
        assert_eq!(links[1].line_number, 3);

        assert_eq!(links[2].link_kind, LinkKind::HtmlAnchor);
        assert_eq!(links[2].target, "https://example.com");
        assert_eq!(links[2].display_text, "Home");
        assert_eq!(links[2].line_number, 4);

        assert_eq!(links[3].link_kind, LinkKind::ReferenceStyle);
        assert_eq!(links[3].target, "https://example.com/manual");
        assert_eq!(links[3].line_number, 5);
    }

    #[test]
    fn test_extract__dangling_reference_is_dropped() {
        let content = "Read [the manual][missing] and [other][defined].\n\n[defined]: other.md\n";

        let links = extract(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "other.md");
    }

    #[test]
    fn test_extract__reference_without_any_definitions() {
        assert!(extract("Only [a][b] here").is_empty());
    }

    #[test]
    fn test_extract__definition_before_use_and_case_insensitive_label() {
        let content = "[Docs Home]: ./README.md\n\nGo [home][docs   home].\n";

        let links = extract(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_kind, LinkKind::ReferenceStyle);
        assert_eq!(links[0].target, "./README.md");
        assert_eq!(links[0].line_number, 3);
    }

    #[test]
    fn test_extract__html_anchor_is_case_insensitive() {
        let content = "<A TARGET='_blank' HREF='docs/setup.md' rel=\"noopener\">Setup</A>";

        let links = extract(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_kind, LinkKind::HtmlAnchor);
        assert_eq!(links[0].target, "docs/setup.md");
    }

    #[test]
    fn test_extract__data_href_is_not_an_anchor_href() {
        let content = "<a data-href=\"ignored.md\">x</a>";
        assert!(extract(content).is_empty());
    }

    #[test]
    fn test_extract__whitespace_around_target_is_trimmed() {
        let links = extract("[x](   spaced.md  )");
        assert_eq!(links[0].target, "spaced.md");
    }

    #[test]
    fn test_extract__line_numbers_follow_newlines() {
        let content = "a\nb\n\n[link](x.md)\n";
        assert_eq!(extract(content)[0].line_number, 4);
    }

    #[test]
    fn test_extract__malformed_syntax_never_matches() {
        let content = "[unclosed](missing-paren\n![no target]\n<a href=>broken</a>\n[]]][((";
        assert!(extract(content).is_empty());
    }

    #[test]
    fn test_extract__empty_document() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract__badge_inside_link_keeps_image() {
        let links = extract("[![build](https://ci.example.com/badge.svg)](https://ci.example.com)");
        assert!(
            links
                .iter()
                .any(|l| l.link_kind == LinkKind::Image
                    && l.target == "https://ci.example.com/badge.svg")
        );
    }

    #[test]
    fn test_extract__inline_title_is_not_part_of_target() {
        let links = extract(
            "[x](https://example.com \"Example\")\n\
             [g](guide.md 'G')\n\
             [p](notes.md (Notes))\n",
        );

        let targets: Vec<&str> = links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, ["https://example.com", "guide.md", "notes.md"]);
    }

    #[test]
    fn test_extract__reference_definition_title_is_not_part_of_target() {
        let content = "See [docs][d] and [more][m].\n\n\
                       [d]: https://example.org \"T\"\n\
                       [m]: <other page.md> 'Other'\n";

        let links = extract(content);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, "https://example.org");
        assert_eq!(links[1].target, "other page.md");
    }

    #[test]
    fn test_extract__angle_bracket_destination_is_unwrapped() {
        let links = extract("[x](<docs/my file.md>)");
        assert_eq!(links[0].target, "docs/my file.md");
    }

    #[test]
    fn test_extract__balanced_parentheses_stay_in_target() {
        let links = extract(
            "Read [Rust](https://en.wikipedia.org/wiki/Rust_(programming_language)) today.",
        );

        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].target,
            "https://en.wikipedia.org/wiki/Rust_(programming_language)"
        );
    }

    #[test]
    fn test_link_destination__unquoted_remainder_is_kept() {
        assert_eq!(link_destination(" my notes.md "), "my notes.md");
        assert_eq!(link_destination("a.md \"open"), "a.md \"open");
        assert_eq!(link_destination("<unclosed"), "<unclosed");
        assert_eq!(link_destination("plain.md"), "plain.md");
    }

    #[test]
    fn test_line_number_at() {
        let content = "one\ntwo\nthree";
        assert_eq!(line_number_at(content, 0), 1);
        assert_eq!(line_number_at(content, 4), 2);
        assert_eq!(line_number_at(content, content.len() + 10), 3);
    }
}
