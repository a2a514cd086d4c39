use serde::Deserialize;

/// Segmenter and batcher tuning
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Long-utterance segmentation
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    /// Short-utterance batching
    #[serde(default)]
    pub batcher: BatcherConfig,
}

/// Limits and pacing for the segmenter
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmenterConfig {
    /// Word budget per segment
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Duration budget per segment, in seconds
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f64,
    /// Speaking-rate estimate used to derive duration from word count
    #[serde(default = "default_words_per_second")]
    pub words_per_second: f64,
    /// Insert SSML break markers between sentences
    #[serde(default = "default_enable_ssml")]
    pub enable_ssml: bool,
    /// Pause length for inserted breaks (SSML duration, e.g. "300ms")
    #[serde(default = "default_break_duration")]
    pub break_duration: String,
    /// Truncate instead of splitting when the mode is brief
    #[serde(default = "default_truncate_brief_mode")]
    pub truncate_brief_mode: bool,
    /// Hard cap on segments per utterance; overflow spills into the last
    #[serde(default = "default_max_segments")]
    pub max_segments: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            max_seconds: default_max_seconds(),
            words_per_second: default_words_per_second(),
            enable_ssml: default_enable_ssml(),
            break_duration: default_break_duration(),
            truncate_brief_mode: default_truncate_brief_mode(),
            max_segments: default_max_segments(),
        }
    }
}

/// Grouping rules for the batcher
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatcherConfig {
    /// An item longer than this many words is never batched
    #[serde(default = "default_max_word_count")]
    pub max_word_count: usize,
    /// Items per batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Joined between item texts in the combined call
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Require identical metadata across batch members
    #[serde(default = "default_require_same_context")]
    pub require_same_context: bool,
    /// When false, every item becomes its own singleton batch
    #[serde(default = "default_enable_batching")]
    pub enable_batching: bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_word_count: default_max_word_count(),
            max_batch_size: default_max_batch_size(),
            separator: default_separator(),
            require_same_context: default_require_same_context(),
            enable_batching: default_enable_batching(),
        }
    }
}

fn default_max_words() -> usize {
    150
}
fn default_max_seconds() -> f64 {
    12.0
}
fn default_words_per_second() -> f64 {
    2.5
}
fn default_enable_ssml() -> bool {
    true
}
fn default_break_duration() -> String {
    "300ms".to_owned()
}
fn default_truncate_brief_mode() -> bool {
    true
}
fn default_max_segments() -> usize {
    5
}
fn default_max_word_count() -> usize {
    12
}
fn default_max_batch_size() -> usize {
    5
}
fn default_separator() -> String {
    " ".to_owned()
}
fn default_require_same_context() -> bool {
    true
}
fn default_enable_batching() -> bool {
    true
}
