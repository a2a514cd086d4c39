//! Short-utterance batching
//!
//! Merges consecutive short replies into as few synthesis calls as
//! possible. Items only share a batch when they would sound coherent
//! played back to back: same voice, same metadata (user/activity
//! collision keys), and each still classified as speakable.

#![allow(clippy::must_use_candidate)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use voxgate_config::BatcherConfig;
use voxgate_core::{SpeechContext, SpeechMode};

/// One short utterance queued for synthesis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Reply text
    pub text: String,
    /// Requested voice; unset inherits the batch's voice
    #[serde(default)]
    pub voice: Option<String>,
    /// Target spoken length, decided upstream
    #[serde(default)]
    pub mode: Option<SpeechMode>,
    /// Decision-engine context for this item
    #[serde(default)]
    pub context: Option<SpeechContext>,
    /// Collision-avoidance keys (e.g. user or activity id); items with
    /// differing metadata never share a batch
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl BatchItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Position of one item's text inside a batch's combined string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpan {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Ordered, non-empty group of items synthesized in one call
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    items: Vec<BatchItem>,
}

impl Batch {
    fn new(first: BatchItem) -> Self {
        Self { items: vec![first] }
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The voice shared by this batch: the first voice any member set
    pub fn voice(&self) -> Option<&str> {
        self.items.iter().find_map(|item| item.voice.as_deref())
    }

    /// Item texts joined with the separator
    pub fn combined_text(&self, separator: &str) -> String {
        self.items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Character offsets of each item inside the combined string
    ///
    /// Offsets are cumulative over item texts and separators. The end
    /// offset of every item after the first covers its separator, which
    /// is how downstream playback alignment has always consumed them.
    pub fn item_spans(&self, separator: &str) -> Vec<ItemSpan> {
        let separator_len = separator.chars().count();
        let mut spans = Vec::with_capacity(self.items.len());
        let mut offset = 0;

        for (position, item) in self.items.iter().enumerate() {
            let length = item.text.chars().count();
            let start_index = offset;
            let mut end_index = start_index + length;
            if position > 0 {
                end_index += separator_len;
            }

            spans.push(ItemSpan {
                text: item.text.clone(),
                start_index,
                end_index,
            });

            offset = start_index + length + separator_len;
        }

        spans
    }
}

/// Groups items into batches per configuration
#[derive(Debug, Clone)]
pub struct Batcher {
    config: BatcherConfig,
}

impl Batcher {
    pub const fn new(config: BatcherConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Plan batches over an ordered item list
    ///
    /// An item joins the open batch only when every compatibility
    /// condition holds; otherwise the open batch is closed and the item
    /// starts a new one. Order is never changed.
    pub fn plan(&self, items: Vec<BatchItem>) -> Vec<Batch> {
        if !self.config.enable_batching {
            return items.into_iter().map(Batch::new).collect();
        }

        let mut batches: Vec<Batch> = Vec::new();

        for item in items {
            match batches.last_mut() {
                Some(open) if self.is_compatible(open, &item) => open.items.push(item),
                _ => batches.push(Batch::new(item)),
            }
        }

        batches
    }

    fn is_compatible(&self, open: &Batch, item: &BatchItem) -> bool {
        if open.len() >= self.config.max_batch_size {
            return false;
        }

        if item.word_count() > self.config.max_word_count {
            return false;
        }

        // Re-check the decision chain: a batch must not smuggle in an
        // item that would have been muted on its own
        let context = item.context.clone().unwrap_or_default();
        if !voxgate_decision::decide(&item.text, &context).speak {
            return false;
        }

        let previous = open.items.last().expect("batches are never empty");

        if self.config.require_same_context && !same_metadata(previous, item) {
            return false;
        }

        voices_compatible(previous.voice.as_deref(), item.voice.as_deref())
    }
}

/// Metadata equality for batching
///
/// Both-absent counts as a match; one-absent/one-present does not. This
/// asymmetry matches long-observed production behavior and is relied on
/// by callers that tag only some items.
fn same_metadata(a: &BatchItem, b: &BatchItem) -> bool {
    match (&a.metadata, &b.metadata) {
        (None, None) => true,
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn voices_compatible(previous: Option<&str>, next: Option<&str>) -> bool {
    match (previous, next) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batcher() -> Batcher {
        Batcher::new(BatcherConfig::default())
    }

    fn items(texts: &[&str]) -> Vec<BatchItem> {
        texts.iter().copied().map(BatchItem::new).collect()
    }

    #[test]
    fn three_short_items_make_one_batch() {
        let batches = batcher().plan(items(&["Hello there", "How are you", "Good morning"]));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
    }

    #[test]
    fn spans_match_playback_alignment() {
        let batches = batcher().plan(items(&["Hello there", "How are you"]));
        assert_eq!(batches.len(), 1);

        let spans = batches[0].item_spans(" ");
        assert_eq!(spans[0], ItemSpan {
            text: "Hello there".to_owned(),
            start_index: 0,
            end_index: 11,
        });
        assert_eq!(spans[1], ItemSpan {
            text: "How are you".to_owned(),
            start_index: 12,
            end_index: 24,
        });
    }

    #[test]
    fn combined_text_uses_separator() {
        let batches = batcher().plan(items(&["Hello there", "How are you"]));
        assert_eq!(batches[0].combined_text(" "), "Hello there How are you");
    }

    #[test]
    fn long_item_closes_the_open_batch() {
        let long = "this utterance has clearly more than twelve words in it so it cannot batch";
        let batches = batcher().plan(items(&["Hello there", long, "Good morning"]));

        // The long item starts a fresh batch; the next compatible item
        // may still join that new batch
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].items()[0].text, long);
        assert_eq!(batches[1].len(), 2);
    }

    #[test]
    fn muted_item_closes_the_open_batch() {
        let batches = batcher().plan(items(&["Hello there", "[DEBUG] noise", "Good morning"]));
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn differing_metadata_never_share_a_batch() {
        let mut a = BatchItem::new("Hello there");
        a.metadata = Some(BTreeMap::from([("user".to_owned(), json!("u1"))]));
        let mut b = BatchItem::new("How are you");
        b.metadata = Some(BTreeMap::from([("user".to_owned(), json!("u2"))]));

        let batches = batcher().plan(vec![a, b]);
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn matching_metadata_batches_together() {
        let meta = BTreeMap::from([("activity".to_owned(), json!(42))]);
        let mut a = BatchItem::new("Hello there");
        a.metadata = Some(meta.clone());
        let mut b = BatchItem::new("How are you");
        b.metadata = Some(meta);

        assert_eq!(batcher().plan(vec![a, b]).len(), 1);
    }

    #[test]
    fn absent_and_present_metadata_do_not_match() {
        let mut tagged = BatchItem::new("Hello there");
        tagged.metadata = Some(BTreeMap::from([("user".to_owned(), json!("u1"))]));
        let untagged = BatchItem::new("How are you");

        assert_eq!(batcher().plan(vec![tagged, untagged]).len(), 2);
    }

    #[test]
    fn both_absent_metadata_matches() {
        assert_eq!(batcher().plan(items(&["Hello there", "How are you"])).len(), 1);
    }

    #[test]
    fn differing_voices_split() {
        let mut a = BatchItem::new("Hello there");
        a.voice = Some("alloy".to_owned());
        let mut b = BatchItem::new("How are you");
        b.voice = Some("nova".to_owned());

        assert_eq!(batcher().plan(vec![a, b]).len(), 2);
    }

    #[test]
    fn unset_voice_inherits_batch_voice() {
        let mut a = BatchItem::new("Hello there");
        a.voice = Some("alloy".to_owned());
        let b = BatchItem::new("How are you");

        let batches = batcher().plan(vec![a, b]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].voice(), Some("alloy"));
    }

    #[test]
    fn batch_size_cap_closes_batch() {
        let texts: Vec<String> = (0..7).map(|i| format!("short utterance {i}")).collect();
        let refs: Vec<BatchItem> = texts.iter().map(BatchItem::new).collect();

        let batches = batcher().plan(refs);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[1].len(), 2);
    }

    #[test]
    fn batching_disabled_yields_singletons() {
        let config = BatcherConfig {
            enable_batching: false,
            ..BatcherConfig::default()
        };
        let batches = Batcher::new(config).plan(items(&["Hello there", "How are you"]));
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn order_is_preserved() {
        let batches = batcher().plan(items(&["Hello there", "How are you", "Good morning"]));
        let flattened: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.items().iter().map(|i| i.text.as_str()))
            .collect();
        assert_eq!(flattened, vec!["Hello there", "How are you", "Good morning"]);
    }
}
