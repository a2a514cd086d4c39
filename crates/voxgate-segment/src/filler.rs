//! Non-critical span removal for brief-mode condensing

use std::sync::OnceLock;

use regex::Regex;

/// Filler phrases dropped before measuring a brief-mode utterance
///
/// Exported as data so the table can be tested and extended without
/// touching the truncation logic.
pub static FILLER_PATTERNS: &[&str] = &[
    r"(?i)\bby the way,?\s*",
    r"(?i)\bas (?:i )?mentioned (?:before|earlier),?\s*",
    r"(?i)\bas an aside,?\s*",
    r"(?i)\bfor what it's worth,?\s*",
    r"(?i)\bjust so you know,?\s*",
    r"(?i)\bneedless to say,?\s*",
    r"(?i)\bto be honest,?\s*",
];

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").expect("must be valid regex"))
}

fn fillers() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        FILLER_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("must be valid regex"))
            .collect()
    })
}

fn space_before_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+([.!?,])").expect("must be valid regex"))
}

/// Strip parenthetical remarks and filler phrases
pub(crate) fn strip_noncritical(text: &str) -> String {
    let mut out = parenthetical().replace_all(text, " ").into_owned();

    for re in fillers() {
        out = re.replace_all(&out, "").into_owned();
    }

    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    space_before_punctuation().replace_all(&collapsed, "$1").into_owned()
}
