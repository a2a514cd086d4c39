//! Long-utterance segmentation for speech synthesis
//!
//! A reply that would run past the word or duration budget is split into
//! bounded segments, each independently synthesizable and hashed for the
//! audio cache. Brief-mode replies are condensed instead of split: filler
//! is stripped and whole sentences are kept until the budget runs out.

#![allow(clippy::must_use_candidate)]

mod filler;
mod sentence;
mod ssml;

use voxgate_config::SegmenterConfig;
use voxgate_core::SpeechMode;

pub use filler::FILLER_PATTERNS;
pub use sentence::{split_sentences, word_count};
pub use ssml::strip_markup;

/// One bounded chunk of a long utterance
///
/// `index` defines playback order; concatenating the plain texts of all
/// segments (in full mode) reconstitutes the processed reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// Markup-bearing text sent to the synthesis endpoint
    pub text: String,
    /// Text with SSML stripped, used for fallback and hashing
    pub plain_text: String,
    /// Position in playback order, contiguous from 0
    pub index: usize,
    /// Estimated spoken duration at the configured speaking rate
    pub estimated_seconds: f64,
    /// Words in the plain text
    pub word_count: usize,
    /// Canonical hash of the plain text, the audio cache key
    pub hash: Option<String>,
}

/// Outcome of segmenting one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationResult {
    pub segments: Vec<AudioSegment>,
    /// True when the text was split across multiple segments
    pub was_segmented: bool,
    /// True when brief-mode condensing removed content
    pub was_truncated: bool,
}

/// Splits or condenses over-long utterances per configuration
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub const fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Whether the text exceeds the word or duration budget
    pub fn is_too_long(&self, text: &str) -> bool {
        let words = sentence::word_count(text);
        let estimated_seconds = self.estimate_seconds(words);
        words > self.config.max_words || estimated_seconds > self.config.max_seconds
    }

    /// Segment or condense `text` according to `mode`
    pub fn segment(&self, text: &str, mode: SpeechMode) -> SegmentationResult {
        let sentences = sentence::split_sentences(text);
        if sentences.is_empty() {
            return SegmentationResult {
                segments: Vec::new(),
                was_segmented: false,
                was_truncated: false,
            };
        }

        if !self.is_too_long(text) {
            return SegmentationResult {
                segments: vec![self.build_segment(&sentences, 0)],
                was_segmented: false,
                was_truncated: false,
            };
        }

        match mode {
            SpeechMode::Brief if self.config.truncate_brief_mode => self.truncate_brief(text),
            _ => self.pack_full(&sentences),
        }
    }

    /// Brief mode: strip non-critical spans, then keep whole sentences
    /// until the next would push past 80% of the word budget
    fn truncate_brief(&self, text: &str) -> SegmentationResult {
        let stripped = filler::strip_noncritical(text);
        let sentences = sentence::split_sentences(&stripped);

        // Leave headroom under the hard cap for the condensed utterance
        let budget = self.config.max_words * 4 / 5;

        let mut kept: Vec<String> = Vec::new();
        let mut kept_words = 0;

        for sent in &sentences {
            let words = sentence::word_count(sent);
            if kept_words + words > budget {
                break;
            }
            kept_words += words;
            kept.push(sent.clone());
        }

        // Even the first sentence overflows: cut it at the word budget
        if kept.is_empty() {
            if let Some(first) = sentences.first() {
                let cut: Vec<&str> = first.split_whitespace().take(budget.max(1)).collect();
                kept.push(format!("{}...", cut.join(" ")));
            }
        }

        SegmentationResult {
            segments: vec![self.build_segment(&kept, 0)],
            was_segmented: false,
            was_truncated: true,
        }
    }

    /// Full mode: greedily pack sentences; once `max_segments - 1`
    /// segments are closed, everything remaining lands in the final one
    fn pack_full(&self, sentences: &[String]) -> SegmentationResult {
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_words = 0;

        for sent in sentences {
            let words = sentence::word_count(sent);
            let would_overflow = !current.is_empty() && current_words + words > self.config.max_words;
            let can_close = groups.len() + 1 < self.config.max_segments;

            if would_overflow && can_close {
                groups.push(std::mem::take(&mut current));
                current_words = 0;
            }

            current.push(sent.clone());
            current_words += words;
        }

        if !current.is_empty() {
            groups.push(current);
        }

        let was_segmented = groups.len() > 1;
        let segments = groups
            .iter()
            .enumerate()
            .map(|(index, group)| self.build_segment(group, index))
            .collect();

        SegmentationResult {
            segments,
            was_segmented,
            was_truncated: false,
        }
    }

    fn build_segment(&self, sentences: &[String], index: usize) -> AudioSegment {
        let text = if self.config.enable_ssml {
            ssml::join_with_breaks(sentences, &self.config.break_duration)
        } else {
            sentences.join(" ")
        };

        let plain_text = ssml::strip_markup(&text);
        let words = sentence::word_count(&plain_text);
        let hash = voxgate_canonical::canonicalize(&plain_text).hash;

        AudioSegment {
            text,
            plain_text,
            index,
            estimated_seconds: self.estimate_seconds(words),
            word_count: words,
            hash: Some(hash),
        }
    }

    fn estimate_seconds(&self, words: usize) -> f64 {
        // usize word counts stay far below f64's exact-integer range
        #[allow(clippy::cast_precision_loss)]
        let words = words as f64;
        words / self.config.words_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> Segmenter {
        Segmenter::new(SegmenterConfig::default())
    }

    fn sentences(n: usize, words_each: usize) -> String {
        let body = (0..words_each - 1).map(|_| "word").collect::<Vec<_>>().join(" ");
        (0..n).map(|_| format!("{body} end.")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn short_text_is_one_segment() {
        let result = segmenter().segment("A quick reply. Nothing more.", SpeechMode::Full);
        assert!(!result.was_segmented);
        assert!(!result.was_truncated);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].index, 0);
    }

    #[test]
    fn breaks_inserted_between_sentences() {
        let result = segmenter().segment("First part. Second part.", SpeechMode::Full);
        let text = &result.segments[0].text;
        assert!(text.contains("<break time=\"300ms\"/>"));
        assert!(!text.trim_end().ends_with("/>"));
        assert_eq!(result.segments[0].plain_text, "First part. Second part.");
    }

    #[test]
    fn duration_budget_triggers_segmentation() {
        // 40 words is under max_words but over 12s at 2.5 words/sec
        let text = sentences(4, 10);
        assert!(segmenter().is_too_long(&text));
    }

    #[test]
    fn full_mode_is_lossless() {
        let text = sentences(30, 12);
        let original_words = word_count(&text);

        let result = segmenter().segment(&text, SpeechMode::Full);
        assert!(result.was_segmented);
        assert!(!result.was_truncated);

        let total: usize = result.segments.iter().map(|s| s.word_count).sum();
        assert_eq!(total, original_words);
    }

    #[test]
    fn full_mode_respects_word_cap_except_last() {
        let config = SegmenterConfig::default();
        let max_words = config.max_words;
        let text = sentences(80, 12);

        let result = Segmenter::new(config).segment(&text, SpeechMode::Full);
        let last = result.segments.len() - 1;

        for segment in &result.segments[..last] {
            assert!(segment.word_count <= max_words, "segment {} too long", segment.index);
        }
    }

    #[test]
    fn segment_count_never_exceeds_cap() {
        let config = SegmenterConfig::default();
        let cap = config.max_segments;
        // Enough text for far more than five budget-sized segments
        let text = sentences(200, 12);

        let result = Segmenter::new(config).segment(&text, SpeechMode::Full);
        assert_eq!(result.segments.len(), cap);

        // Overflow spills into the final segment
        assert!(result.segments[cap - 1].word_count > result.segments[0].word_count);
    }

    #[test]
    fn indices_are_contiguous() {
        let text = sentences(40, 12);
        let result = segmenter().segment(&text, SpeechMode::Full);
        for (expected, segment) in result.segments.iter().enumerate() {
            assert_eq!(segment.index, expected);
        }
    }

    #[test]
    fn brief_mode_truncates_to_one_segment() {
        let text = sentences(30, 12);
        let config = SegmenterConfig::default();
        let budget = config.max_words * 4 / 5;

        let result = Segmenter::new(config).segment(&text, SpeechMode::Brief);
        assert!(result.was_truncated);
        assert!(!result.was_segmented);
        assert_eq!(result.segments.len(), 1);
        assert!(result.segments[0].word_count <= budget);
    }

    #[test]
    fn brief_mode_strips_parentheticals() {
        let filler = "word ".repeat(160);
        let text = format!("Keep this sentence (but not this aside). {filler}");
        let result = segmenter().segment(&text, SpeechMode::Brief);
        assert!(!result.segments[0].plain_text.contains("aside"));
    }

    #[test]
    fn brief_oversized_first_sentence_gets_ellipsis() {
        // One long unbroken sentence, no terminal punctuation until the end
        let text = format!("{} done.", "word ".repeat(200).trim());
        let result = segmenter().segment(&text, SpeechMode::Brief);
        assert!(result.was_truncated);
        assert!(result.segments[0].text.ends_with("..."));
    }

    #[test]
    fn brief_without_truncation_falls_back_to_packing() {
        let config = SegmenterConfig {
            truncate_brief_mode: false,
            ..SegmenterConfig::default()
        };
        let text = sentences(30, 12);
        let result = Segmenter::new(config).segment(&text, SpeechMode::Brief);
        assert!(result.was_segmented);
        assert!(!result.was_truncated);
    }

    #[test]
    fn segments_carry_canonical_hashes() {
        let result = segmenter().segment("Hash me please. Thank you kindly.", SpeechMode::Full);
        let hash = result.segments[0].hash.as_deref().unwrap();
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn ssml_disabled_joins_plainly() {
        let config = SegmenterConfig {
            enable_ssml: false,
            ..SegmenterConfig::default()
        };
        let result = Segmenter::new(config).segment("One. Two.", SpeechMode::Full);
        assert_eq!(result.segments[0].text, "One. Two.");
    }

    #[test]
    fn empty_text_yields_no_segments() {
        let result = segmenter().segment("   ", SpeechMode::Full);
        assert!(result.segments.is_empty());
    }
}
