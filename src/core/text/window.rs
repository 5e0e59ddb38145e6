//! Keyword context windows.
//!
//! Finds case-insensitive keyword occurrences inside individual
//! sentences and selects the contiguous window of sentences around
//! each matching sentence.
//!
//! Matching never crosses a sentence boundary: a keyword split
//! across two sentences by the linearizer is not found.

use regex::{Regex, RegexBuilder};

use crate::core::error::{DocsiftError, Result};
use crate::core::types::{ContextWindow, Direction, KeywordMatch, Sentence};

/// Separator between the sentences of one window
const SENTENCE_SEPARATOR: &str = " ";

/// Separator between the windows of one document
const WINDOW_SEPARATOR: &str = "\n\n";

/// Keyword context window extractor
///
/// Holds the compiled keyword matcher; all operations are pure over
/// their inputs, so repeated calls return identical results.
#[derive(Debug, Clone)]
pub struct ContextWindowExtractor {
    keyword: String,
    matcher: Regex,
}

impl ContextWindowExtractor {
    /// Compile a case-insensitive literal matcher for `keyword`
    pub fn new(keyword: &str) -> Result<Self> {
        if keyword.trim().is_empty() {
            return Err(DocsiftError::Validation(
                "keyword cannot be empty".to_string(),
            ));
        }

        let matcher = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .map_err(|e| DocsiftError::Validation(format!("invalid keyword '{keyword}': {e}")))?;

        Ok(Self {
            keyword: keyword.to_string(),
            matcher,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Every occurrence, ordered by sentence index then offset
    pub fn find_matches(&self, sentences: &[Sentence]) -> Vec<KeywordMatch> {
        sentences
            .iter()
            .flat_map(|sentence| {
                self.matcher.find_iter(&sentence.text).map(|m| KeywordMatch {
                    sentence: sentence.index,
                    offset: m.start(),
                })
            })
            .collect()
    }

    /// One window per matching sentence
    ///
    /// Repeated occurrences inside the same sentence share the window
    /// of the first occurrence. With `first_only` only the earliest
    /// window is returned.
    ///
    /// # Errors
    ///
    /// `EmptyDocument` when `sentences` is empty, `NoMatchFound` when
    /// no sentence contains the keyword.
    pub fn find_windows(
        &self,
        sentences: &[Sentence],
        count: usize,
        direction: Direction,
        first_only: bool,
    ) -> Result<Vec<ContextWindow>> {
        if sentences.is_empty() {
            return Err(DocsiftError::EmptyDocument(
                "document produced no sentences".to_string(),
            ));
        }
        if count == 0 {
            return Err(DocsiftError::Validation(
                "sentence count must be at least 1".to_string(),
            ));
        }

        let total = sentences.len();
        let mut windows: Vec<ContextWindow> = Vec::new();

        for anchor in self.find_matches(sentences) {
            if windows.last().is_some_and(|w| w.anchor.sentence == anchor.sentence) {
                continue;
            }
            windows.push(window_for(anchor, count, direction, total));
            if first_only {
                break;
            }
        }

        if windows.is_empty() {
            return Err(DocsiftError::NoMatchFound {
                keyword: self.keyword.clone(),
            });
        }

        tracing::debug!(
            "Keyword '{}' produced {} window(s) over {} sentences",
            self.keyword,
            windows.len(),
            total
        );
        Ok(windows)
    }
}

/// Clip the window for one match to `[0, total)`
fn window_for(anchor: KeywordMatch, count: usize, direction: Direction, total: usize) -> ContextWindow {
    let i = anchor.sentence;
    let (start, end) = match direction {
        Direction::Forward => (i, i.saturating_add(count).min(total)),
        Direction::Backward => ((i + 1).saturating_sub(count), i + 1),
    };
    ContextWindow { anchor, start, end }
}

/// Render windows as text
///
/// Sentences of a window are joined with a single space. Several
/// windows are separated by a blank line and each is prefixed with
/// its 1-based ordinal, e.g. `[2] ...`.
pub fn render_windows(sentences: &[Sentence], windows: &[ContextWindow]) -> String {
    let rendered: Vec<String> = windows
        .iter()
        .map(|w| {
            sentences[w.start.min(sentences.len())..w.end.min(sentences.len())]
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(SENTENCE_SEPARATOR)
        })
        .collect();

    if rendered.len() == 1 {
        return rendered.into_iter().next().unwrap_or_default();
    }

    rendered
        .iter()
        .enumerate()
        .map(|(i, text)| format!("[{}] {}", i + 1, text))
        .collect::<Vec<_>>()
        .join(WINDOW_SEPARATOR)
}
