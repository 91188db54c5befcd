//! Single-line classification for the `[Tag]Text` grammar.

use serde::Serialize;

/// Suffix that marks a tag as the translation of its base tag.
pub const TRANSLATION_SUFFIX: &str = "ch";

/// Whether a line carries the primary text or its translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Original,
    Translation,
}

/// A line that matched `"[" Tag "]" Text` with non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedLine<'a> {
    /// Tag with the translation suffix removed (pairing key).
    pub base_tag: &'a str,
    /// Bracket content verbatim.
    pub full_tag: &'a str,
    /// Text after the closing bracket, trimmed.
    pub text: &'a str,
    pub role: Role,
}

/// Classify one raw line.
///
/// Returns `None` for blank lines, lines that do not start with a bracketed
/// tag, empty tags (`[]`), and tags followed by no text.
///
/// The suffix test is purely lexical: a tag named `March` is read as the
/// translation of `Mar`, and a tag that is exactly `ch` has an empty base tag.
pub fn classify(line: &str) -> Option<TaggedLine<'_>> {
    let line = line.trim();
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let full_tag = &rest[..close];
    if full_tag.is_empty() {
        return None;
    }

    let text = rest[close + 1..].trim();
    if text.is_empty() {
        return None;
    }

    let (base_tag, role) = match full_tag.strip_suffix(TRANSLATION_SUFFIX) {
        Some(base) => (base, Role::Translation),
        None => (full_tag, Role::Original),
    };

    Some(TaggedLine {
        base_tag,
        full_tag,
        text,
        role,
    })
}
