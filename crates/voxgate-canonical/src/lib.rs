//! Canonical text normalization for speech caching
//!
//! Reduces a reply to a stable canonical form and hashes it with SHA-256
//! so that two phrasings differing only in surface formatting (whitespace,
//! quote style, punctuation repetition, date/time notation) share one
//! cache entry. The transformation order is fixed; changing it changes
//! every cache key in production.

#![allow(clippy::must_use_candidate)]

mod patterns;

use sha2::{Digest, Sha256};

pub use patterns::{DATE_PATTERNS, TIME_PATTERNS};

/// Canonical form of a reply plus its cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalResult {
    /// Normalized text
    pub canonical: String,
    /// Lowercase hex SHA-256 of the canonical text (64 chars)
    pub hash: String,
}

/// Normalize text into its canonical form and compute the cache key
///
/// Pipeline, in order: whitespace collapse, quote straightening,
/// punctuation-run dedup, date placeholders, time placeholders, lowercase.
/// Idempotent: canonicalizing a canonical string is a no-op.
pub fn canonicalize(text: &str) -> CanonicalResult {
    let canonical = canonicalize_text(text);
    let hash = hash_canonical(&canonical);
    CanonicalResult { canonical, hash }
}

/// Normalize text without hashing
pub fn canonicalize_text(text: &str) -> String {
    let mut out = collapse_whitespace(text);
    out = straighten_quotes(&out);
    out = dedup_punctuation(&out);
    out = patterns::replace_dates(&out);
    out = patterns::replace_times(&out);
    out.to_lowercase()
}

/// SHA-256 of an already-canonical string, lowercase hex
pub fn hash_canonical(canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{digest:x}")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            other => other,
        })
        .collect()
}

fn dedup_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;

    for c in text.chars() {
        // Collapse runs of the same terminal punctuation mark
        if matches!(c, '!' | '?' | '.') && prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }

    out
}
