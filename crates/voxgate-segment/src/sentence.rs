//! Sentence splitting and word counting
//!
//! Splitting is intentionally simple: terminal punctuation followed by
//! whitespace ends a sentence. Abbreviation handling is not attempted;
//! for speech pacing an occasional extra boundary is harmless.

use std::sync::OnceLock;

use regex::Regex;

fn boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)(.*?[.!?]+)(?:\s+|$)").expect("must be valid regex"))
}

/// Split text into sentences, keeping terminal punctuation
///
/// Trailing text without terminal punctuation becomes a final sentence.
/// No words are dropped: rejoining the sentences with single spaces
/// yields the same word sequence as the input.
pub fn split_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut last_end = 0;

    for captures in boundary().captures_iter(trimmed) {
        let sentence = captures.get(1).expect("group 1 always present");
        sentences.push(sentence.as_str().trim().to_owned());
        last_end = captures.get(0).expect("group 0 always present").end();
    }

    let rest = trimmed[last_end..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_owned());
    }

    sentences
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
