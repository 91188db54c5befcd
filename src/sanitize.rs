//! Filename stems derived from subtitle lines.
//!
//! `"[Sub1]Hello / World?"` → `"Hello_World"`. The leading tag is dropped,
//! characters that common filesystems reject are removed, whitespace runs
//! become a single `_`, and the result is capped at [`MAX_STEM_CHARS`].

/// Longest stem produced, in characters.
pub const MAX_STEM_CHARS: usize = 100;

/// Stem used when nothing is left after removing the tag.
pub const UNTITLED_STEM: &str = "untitled_subtitle";

/// Stem used when nothing is left after removing illegal characters.
pub const EMPTY_STEM: &str = "sanitized_empty_subtitle";

const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn a subtitle line (with or without its `[Tag]` prefix) into a file stem.
pub fn file_stem(text: &str) -> String {
    let name = strip_leading_tag(text).trim();
    if name.is_empty() {
        return UNTITLED_STEM.to_string();
    }

    let mut stem = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ILLEGAL.contains(&ch) || (ch as u32) < 0x20 {
            continue;
        }
        if ch.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.push(ch);
            in_whitespace = false;
        }
    }

    if let Some((idx, _)) = stem.char_indices().nth(MAX_STEM_CHARS) {
        stem.truncate(idx);
    }

    if stem.is_empty() {
        return EMPTY_STEM.to_string();
    }
    stem
}

fn strip_leading_tag(text: &str) -> &str {
    match text.strip_prefix('[').and_then(|rest| Some((rest, rest.find(']')?))) {
        Some((rest, close)) if close > 0 => &rest[close + 1..],
        _ => text,
    }
}
