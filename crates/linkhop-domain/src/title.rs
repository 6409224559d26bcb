//! Title canonicalization.
//!
//! A node in the link graph is identified by its canonical title. Links come
//! back from the fetch client in several raw shapes (`/wiki/Rust_(language)`,
//! full article URLs, percent-encoded titles, titles with section anchors),
//! and they must all collapse to the same node.

use std::borrow::Cow;

/// Path segment that precedes the title in article URLs.
const ARTICLE_PATH: &str = "/wiki/";

/// Ceiling on canonicalization passes; nested escapes need one pass per level.
const MAX_PASSES: usize = 32;

/// Canonicalizes a raw link target or user-supplied title.
///
/// Applies, in order:
/// 1. strips everything up to and including `/wiki/` (article URLs and
///    site-relative links)
/// 2. drops a query string left over from URL forms
/// 3. percent-decodes (malformed escapes are kept literally)
/// 4. drops the `#section` fragment
/// 5. replaces underscores with spaces and collapses whitespace runs
/// 6. upper-cases the first character
///
/// The steps repeat until the title stops changing, so nested
/// percent-encoding (`Caf%25C3%25A9`) and escaped URL parts (`%2Fwiki%2F`)
/// end in the same node as their plain forms, and canonicalizing a
/// canonical title is a no-op.
///
/// Returns an empty string when nothing title-like remains (for example a
/// bare `#anchor` link).
pub fn canonicalize(raw: &str) -> String {
    let mut title = canonicalize_once(raw);
    for _ in 1..MAX_PASSES {
        let next = canonicalize_once(&title);
        if next == title {
            break;
        }
        title = next;
    }
    title
}

fn canonicalize_once(raw: &str) -> String {
    let mut title = raw.trim();

    if let Some(pos) = title.find(ARTICLE_PATH) {
        title = &title[pos + ARTICLE_PATH.len()..];
        if let Some(pos) = title.find('?') {
            title = &title[..pos];
        }
    }

    let decoded: Cow<'_, str> = urlencoding::decode(title).unwrap_or(Cow::Borrowed(title));

    let without_fragment = match decoded.find('#') {
        Some(pos) => &decoded[..pos],
        None => &decoded[..],
    };

    let spaced = without_fragment.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    upper_first(&collapsed)
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
