//! SSML break insertion and markup stripping

use std::sync::OnceLock;

use regex::Regex;

/// Join sentences with an SSML break marker between each pair
///
/// No break is emitted after the final sentence.
pub fn join_with_breaks(sentences: &[String], break_duration: &str) -> String {
    let separator = format!(" <break time=\"{break_duration}\"/> ");
    sentences.join(&separator)
}

/// Remove SSML/XML tags, collapsing the surrounding whitespace
pub fn strip_markup(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let re = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("must be valid regex"));

    let without_tags = re.replace_all(text, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}
