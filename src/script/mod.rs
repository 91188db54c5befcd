//! # Subtitle Script Parser
//!
//! Reconstructs logical subtitle entries from a tagged, line-oriented script.
//!
//! ## Format
//!
//! ```text
//! [Sub1]Hello World        ← original (tag "Sub1")
//! [Sub1ch]你好，世界          ← translation of Sub1 (tag ends with "ch")
//! [Sub2]Only original      ← no translation follows
//!                          ← blank line: separator
//! [Sub3ch]Orphaned         ← no pending Sub3 original: reported and dropped
//! ```
//!
//! ## Pairing
//!
//! The parser holds at most one *pending original*. Every line moves it
//! through this table:
//!
//! | Line | Pending | Effect |
//! |------|---------|--------|
//! | blank / malformed | any | flush pending as standalone |
//! | original | any | flush pending, new line becomes pending |
//! | translation, same base tag | some | emit pair, clear pending |
//! | translation, otherwise | any | orphan: report, drop, pending untouched |
//!
//! End of input flushes whatever is pending. Entries come out in the order
//! they were flushed or emitted.

mod line;

pub use line::{Role, TRANSLATION_SUFFIX, TaggedLine, classify};

use serde::Serialize;
use std::path::Path;

use crate::error::{Result, SublayerError};
use crate::sanitize;

/// One logical subtitle: a primary line and its optional translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleEntry {
    /// Base tag shared by the pair (e.g. `Sub1`).
    pub id: String,
    /// Full tag of the original line.
    pub original_tag: String,
    pub original_text: String,
    pub translated_text: Option<String>,
    /// Full tag of the translation line (e.g. `Sub1ch`).
    pub translated_tag: Option<String>,
}

impl SubtitleEntry {
    /// Create an entry without translation.
    pub fn standalone(
        id: impl Into<String>,
        original_tag: impl Into<String>,
        original_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            original_tag: original_tag.into(),
            original_text: original_text.into(),
            translated_text: None,
            translated_tag: None,
        }
    }

    /// Attach a translation line.
    pub fn with_translation(
        mut self,
        translated_tag: impl Into<String>,
        translated_text: impl Into<String>,
    ) -> Self {
        self.translated_tag = Some(translated_tag.into());
        self.translated_text = Some(translated_text.into());
        self
    }

    /// Output file stem, derived from the original line as written in the script.
    pub fn file_stem(&self) -> String {
        sanitize::file_stem(&format!("[{}]{}", self.original_tag, self.original_text))
    }
}

/// A non-fatal condition found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseIssue {
    /// Non-blank line that does not match `[Tag]Text` (or has no text).
    Malformed { line: usize, content: String },
    /// Translation line with no pending original of the same base tag.
    OrphanTranslation {
        line: usize,
        tag: String,
        text: String,
    },
}

impl ParseIssue {
    /// 1-based line number the issue was found on.
    pub fn line(&self) -> usize {
        match self {
            ParseIssue::Malformed { line, .. } | ParseIssue::OrphanTranslation { line, .. } => *line,
        }
    }
}

/// Entries plus everything worth reporting about the lines that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedScript {
    pub entries: Vec<SubtitleEntry>,
    pub issues: Vec<ParseIssue>,
}

impl ParsedScript {
    /// Number of orphaned translations that were dropped.
    pub fn orphan_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, ParseIssue::OrphanTranslation { .. }))
            .count()
    }

    /// Number of malformed lines that acted as separators.
    pub fn malformed_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, ParseIssue::Malformed { .. }))
            .count()
    }
}

#[derive(Debug)]
struct PendingOriginal {
    base_tag: String,
    full_tag: String,
    text: String,
}

/// Incremental pairing parser. Feed lines with [`push_line`](Self::push_line),
/// then call [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct ScriptParser {
    pending: Option<PendingOriginal>,
    line_number: usize,
    parsed: ParsedScript,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process the next line of input.
    pub fn push_line(&mut self, raw: &str) {
        self.line_number += 1;

        let Some(line) = classify(raw) else {
            if !raw.trim().is_empty() {
                tracing::debug!(line = self.line_number, content = raw.trim(), "malformed line");
                self.parsed.issues.push(ParseIssue::Malformed {
                    line: self.line_number,
                    content: raw.trim().to_string(),
                });
            }
            self.flush_pending();
            return;
        };

        match line.role {
            Role::Original => {
                self.flush_pending();
                self.pending = Some(PendingOriginal {
                    base_tag: line.base_tag.to_string(),
                    full_tag: line.full_tag.to_string(),
                    text: line.text.to_string(),
                });
            }
            Role::Translation => {
                let matches_pending = self
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.base_tag == line.base_tag);

                if matches_pending {
                    if let Some(p) = self.pending.take() {
                        self.parsed.entries.push(
                            SubtitleEntry::standalone(p.base_tag, p.full_tag, p.text)
                                .with_translation(line.full_tag, line.text),
                        );
                    }
                } else {
                    tracing::warn!(
                        line = self.line_number,
                        tag = line.full_tag,
                        "orphaned translation or mismatched tag: {}",
                        line.text
                    );
                    self.parsed.issues.push(ParseIssue::OrphanTranslation {
                        line: self.line_number,
                        tag: line.full_tag.to_string(),
                        text: line.text.to_string(),
                    });
                }
            }
        }
    }

    /// Flush any pending original and return the result.
    pub fn finish(mut self) -> ParsedScript {
        self.flush_pending();
        self.parsed
    }

    fn flush_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            self.parsed
                .entries
                .push(SubtitleEntry::standalone(p.base_tag, p.full_tag, p.text));
        }
    }
}

/// Parse a sequence of lines.
pub fn parse_lines<I, S>(lines: I) -> ParsedScript
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = ScriptParser::new();
    for line in lines {
        parser.push_line(line.as_ref());
    }
    parser.finish()
}

/// Parse a whole script held in memory.
pub fn parse_str(input: &str) -> ParsedScript {
    parse_lines(input.strip_prefix('\u{feff}').unwrap_or(input).lines())
}

/// Read and parse a UTF-8 script file.
///
/// A file that cannot be read (missing, permissions, invalid UTF-8) yields
/// [`SublayerError::FileAccess`] and no entries at all.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedScript> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| SublayerError::file_access(path, e))?;
    let parsed = parse_str(&content);
    tracing::info!(
        path = %path.display(),
        entries = parsed.entries.len(),
        orphans = parsed.orphan_count(),
        malformed = parsed.malformed_count(),
        "parsed subtitle script"
    );
    Ok(parsed)
}
