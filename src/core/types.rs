//! Core data types for docsift.
//!
//! This module defines the value objects that flow between the
//! linearizer, the context window extractor, the image extractor
//! and the batch runner.

use crate::core::error::{DocsiftError, Result};
use crate::core::text::linearizer::normalize_whitespace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which side of a keyword match the context window grows towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Matched sentence first, followed by up to `count - 1` sentences
    #[default]
    Forward,
    /// Up to `count - 1` preceding sentences, matched sentence last
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "f" => Ok(Direction::Forward),
            "backward" | "b" => Ok(Direction::Backward),
            other => Err(format!(
                "invalid direction '{other}' (expected 'forward' or 'backward')"
            )),
        }
    }
}

/// A single sentence of a linearized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Zero-based position in the whole document (never reset per page)
    pub index: usize,

    /// Whitespace-normalized sentence text
    pub text: String,
}

impl Sentence {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// One occurrence of the keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// Index of the sentence containing the occurrence
    pub sentence: usize,

    /// Byte offset of the occurrence within the sentence text
    pub offset: usize,
}

/// Half-open range `[start, end)` of sentence indices around a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// The match this window was built for
    pub anchor: KeywordMatch,

    /// First sentence index (inclusive)
    pub start: usize,

    /// One past the last sentence index
    pub end: usize,
}

impl ContextWindow {
    /// Number of sentences in the window
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Windows always hold at least the matched sentence
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Immutable description of what to do with every document of a run
///
/// Built once through [`ExtractionRequestBuilder`], which enforces
/// the request-level invariants (count >= 1, at least one of text
/// or images, keyword present whenever text is wanted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRequest {
    keyword: Option<String>,
    count: usize,
    direction: Direction,
    want_text: bool,
    want_images: bool,
    first_only: bool,
}

impl ExtractionRequest {
    /// Default number of sentences per window
    pub const DEFAULT_COUNT: usize = 5;

    pub fn builder() -> ExtractionRequestBuilder {
        ExtractionRequestBuilder::default()
    }

    /// Request for search-and-display mode (text only, nothing persisted)
    pub fn search(keyword: impl Into<String>, count: usize, direction: Direction) -> Result<Self> {
        Self::builder()
            .keyword(keyword)
            .count(count)
            .direction(direction)
            .build()
    }

    /// The keyword; always `Some` when `want_text()` is true
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn want_text(&self) -> bool {
        self.want_text
    }

    pub fn want_images(&self) -> bool {
        self.want_images
    }

    /// Only the first match of each document is extracted
    pub fn first_only(&self) -> bool {
        self.first_only
    }
}

/// Builder for [`ExtractionRequest`]
#[derive(Debug, Clone)]
pub struct ExtractionRequestBuilder {
    keyword: Option<String>,
    count: usize,
    direction: Direction,
    want_text: bool,
    want_images: bool,
    first_only: bool,
}

impl Default for ExtractionRequestBuilder {
    fn default() -> Self {
        Self {
            keyword: None,
            count: ExtractionRequest::DEFAULT_COUNT,
            direction: Direction::Forward,
            want_text: true,
            want_images: false,
            first_only: false,
        }
    }
}

impl ExtractionRequestBuilder {
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn maybe_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn want_text(mut self, want_text: bool) -> Self {
        self.want_text = want_text;
        self
    }

    pub fn want_images(mut self, want_images: bool) -> Self {
        self.want_images = want_images;
        self
    }

    pub fn first_only(mut self, first_only: bool) -> Self {
        self.first_only = first_only;
        self
    }

    /// Validate and freeze the request
    pub fn build(self) -> Result<ExtractionRequest> {
        if !(self.want_text || self.want_images) {
            return Err(DocsiftError::Validation(
                "select at least one extraction option (text or images)".to_string(),
            ));
        }

        if self.count == 0 {
            return Err(DocsiftError::Validation(
                "sentence count must be at least 1".to_string(),
            ));
        }

        // Sentences are whitespace-normalized, so the keyword must be too
        let keyword = self
            .keyword
            .map(|k| normalize_whitespace(&k))
            .filter(|k| !k.is_empty());
        if self.want_text && keyword.is_none() {
            return Err(DocsiftError::Validation(
                "a keyword is required to extract text".to_string(),
            ));
        }

        Ok(ExtractionRequest {
            keyword,
            count: self.count,
            direction: self.direction,
            want_text: self.want_text,
            want_images: self.want_images,
            first_only: self.first_only,
        })
    }
}

/// What one document produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Rendered context windows, `None` when text was not requested
    /// or the keyword was not found
    pub text: Option<String>,

    /// Number of context windows rendered
    pub matches: usize,

    /// Images written to the output directory
    pub images_written: usize,

    /// Embedded images skipped as corrupt or unsupported
    pub images_skipped: usize,
}

/// Final state of one document in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Everything requested was produced
    Completed,

    /// The document has text but not the keyword
    NoMatchFound,

    /// The reader produced no sentences (or failed to read the file)
    EmptyDocument { reason: String },

    /// Processing exceeded the per-document timeout
    TimedOut { after_secs: u64 },
}

impl OutcomeStatus {
    /// Text (or images) were extracted
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Completed)
    }

    /// Short label for human-readable output
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Completed => "ok",
            OutcomeStatus::NoMatchFound => "no match",
            OutcomeStatus::EmptyDocument { .. } => "unreadable",
            OutcomeStatus::TimedOut { .. } => "timed out",
        }
    }
}

/// Outcome for the input at the same position of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub status: OutcomeStatus,
    #[serde(flatten)]
    pub result: ExtractionResult,

    /// Text file written for this document, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_file: Option<PathBuf>,
}

impl DocumentOutcome {
    pub fn new(path: impl Into<PathBuf>, status: OutcomeStatus) -> Self {
        Self {
            path: path.into(),
            status,
            result: ExtractionResult::default(),
            text_file: None,
        }
    }

    /// File name of the input, used in reports
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Aggregated result of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub documents: usize,
    pub completed: usize,
    pub no_match: usize,
    pub empty: usize,
    pub timed_out: usize,
    pub images_written: usize,
    pub images_skipped: usize,
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Build the report; `outcomes[i]` belongs to `inputs[i]`
    pub fn from_outcomes(
        outcomes: Vec<DocumentOutcome>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let count = |f: fn(&OutcomeStatus) -> bool| outcomes.iter().filter(|o| f(&o.status)).count();

        Self {
            started_at,
            duration_ms,
            documents: outcomes.len(),
            completed: count(OutcomeStatus::is_success),
            no_match: count(|s| matches!(s, OutcomeStatus::NoMatchFound)),
            empty: count(|s| matches!(s, OutcomeStatus::EmptyDocument { .. })),
            timed_out: count(|s| matches!(s, OutcomeStatus::TimedOut { .. })),
            images_written: outcomes.iter().map(|o| o.result.images_written).sum(),
            images_skipped: outcomes.iter().map(|o| o.result.images_skipped).sum(),
            outcomes,
        }
    }
}
