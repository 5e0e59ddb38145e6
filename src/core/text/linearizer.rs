//! Sentence linearization.
//!
//! Turns the raw text blocks of a document (PDF pages, EPUB spine
//! items) into one flat sequence of sentences with zero-based,
//! document-wide indices.
//!
//! A sentence ends at `.`, `!` or `?` when the next character is
//! whitespace or the end of the text. Abbreviations are not
//! special-cased, so "Mr. Smith" splits after "Mr.".

use crate::core::types::Sentence;

/// Stateless sentence splitter
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLinearizer;

impl TextLinearizer {
    pub fn new() -> Self {
        Self
    }

    /// Linearize blocks given in reading order
    ///
    /// Blocks are joined with whitespace, so a sentence that runs
    /// across a page break stays one sentence. Returns an empty
    /// vector when the blocks hold no text at all.
    pub fn linearize<S: AsRef<str>>(&self, blocks: &[S]) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for block in blocks {
            let mut chars = block.as_ref().chars().peekable();
            while let Some(c) = chars.next() {
                current.push(c);
                if is_terminator(c) && chars.peek().is_none_or(|next| next.is_whitespace()) {
                    push_sentence(&mut sentences, &current);
                    current.clear();
                }
            }
            // Block boundary counts as whitespace
            current.push(' ');
        }
        push_sentence(&mut sentences, &current);

        tracing::debug!(
            "Linearized {} blocks into {} sentences",
            blocks.len(),
            sentences.len()
        );
        sentences
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Collapse whitespace runs and append if anything is left
fn push_sentence(sentences: &mut Vec<Sentence>, raw: &str) {
    let text = normalize_whitespace(raw);
    if !text.is_empty() {
        let index = sentences.len();
        sentences.push(Sentence::new(index, text));
    }
}

/// Collapse every whitespace run to one space and trim both ends
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
