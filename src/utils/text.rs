//! Text normalization for provider responses and download filenames.

use regex::Regex;
use std::sync::OnceLock;

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^<>]*>").expect("valid regex"))
}

/// Normalize an abstract: strip HTML/JATS markup (CrossRef abstracts arrive
/// wrapped in `<jats:p>` tags) and map newlines and carriage returns to
/// single spaces.
pub fn clean_abstract(raw: &str) -> String {
    let stripped = markup_re().replace_all(raw, "");
    stripped
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Sanitize a paper title into a filename stem.
///
/// Every maximal run of characters that are not Unicode alphanumerics and
/// not `_` collapses into a single `_`. CJK titles pass through unchanged
/// since `char::is_alphanumeric` is Unicode-aware.
pub fn sanitize_filename(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_was_gap = false;
    for c in title.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            last_was_gap = false;
        } else if !last_was_gap {
            out.push('_');
            last_was_gap = true;
        }
    }
    out
}
