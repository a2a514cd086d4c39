//! Pattern tables for the decision rule chain
//!
//! Exported as data so they can be tested and localized independently of
//! the control flow in `rules`.

use std::sync::OnceLock;

use regex::Regex;

/// Markers identifying system or debug output that must never be spoken
pub static SYSTEM_MARKERS: &[&str] = &[
    r"(?i)\[debug\]",
    r"(?i)\[info\]",
    r"(?i)\[error\]",
    r"(?i)\btool succeeded\b",
    r"(?i)^system:",
];

/// Opening phrases that classify a reply as a greeting
pub static GREETING_PATTERNS: &[&str] = &[
    r"(?i)^(?:hi|hiya|hello|hey|howdy|greetings)\b",
    r"(?i)^good (?:morning|afternoon|evening)\b",
    r"(?i)^welcome\b",
];

/// Phrases that classify a reply as a farewell
pub static FAREWELL_PATTERNS: &[&str] = &[
    r"(?i)\b(?:goodbye|bye|farewell)\b",
    r"(?i)\bsee you\b",
    r"(?i)\btake care\b",
    r"(?i)\bgood night\b",
    r"(?i)\btalk to you (?:later|soon)\b",
];

/// Empathetic or gratitude phrases that warrant full spoken delivery
pub static EMPATHY_PATTERNS: &[&str] = &[
    r"(?i)\bthank(?:s| you)\b",
    r"(?i)\bappreciate\b",
    r"(?i)\b(?:i'm |i am )?sorry\b",
    r"(?i)\bcongratulations?\b",
    r"(?i)\bwell done\b",
    r"(?i)\bgreat job\b",
    r"(?i)\byou're welcome\b",
    r"(?i)\b(?:glad|happy) to help\b",
];

/// Bullet or numbered list lines, one match per item
pub(crate) static LIST_ITEM_PATTERN: &str = r"(?m)^\s*(?:[-*•]|\d+[.)])\s+";

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("must be valid regex"))
        .collect()
}

pub(crate) fn system_markers() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| compile(SYSTEM_MARKERS))
}

pub(crate) fn greetings() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| compile(GREETING_PATTERNS))
}

pub(crate) fn farewells() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| compile(FAREWELL_PATTERNS))
}

pub(crate) fn empathy() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| compile(EMPATHY_PATTERNS))
}

pub(crate) fn list_items() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(LIST_ITEM_PATTERN).expect("must be valid regex"))
}

pub(crate) fn any_match(regexes: &[Regex], text: &str) -> bool {
    regexes.iter().any(|re| re.is_match(text))
}
