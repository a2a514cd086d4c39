//! Date and time pattern tables
//!
//! Kept as data so the tables can be unit-tested and localized without
//! touching the canonicalization control flow. Patterns run before the
//! final lowercase step, so they match case-insensitively.

use std::sync::OnceLock;

use regex::Regex;

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?\
|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Date-like substrings replaced with `{{DATE}}`
///
/// Anchored on word boundaries so partial numerics ("Room 20-11") are
/// left alone.
pub static DATE_PATTERNS: &[&str] = &[
    // ISO YYYY-MM-DD
    r"\b\d{4}-\d{2}-\d{2}\b",
    // DD/MM/YYYY (or MM/DD/YYYY, indistinguishable without locale)
    r"\b\d{1,2}/\d{1,2}/\d{4}\b",
    // Month-name day: "Nov 20", "November 20", "Sep. 3"
    r"(?i)\b(?:MONTHS)\.?\s+\d{1,2}\b",
    // Day month-name: "20 Nov", "3 March"
    r"(?i)\b\d{1,2}\s+(?:MONTHS)\b",
];

/// Time-like substrings replaced with `{{TIME}}`
///
/// Clock forms first so "6:30 pm" is consumed whole before the bare
/// "6 pm" pattern can see it.
pub static TIME_PATTERNS: &[&str] = &[
    // HH:MM / H:MM with optional seconds and am/pm marker
    r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:am|pm))?\b",
    // Bare 12-hour: "6 pm", "12PM"
    r"(?i)\b\d{1,2}\s*(?:am|pm)\b",
];

const DATE_PLACEHOLDER: &str = "{{DATE}}";
const TIME_PLACEHOLDER: &str = "{{TIME}}";

fn date_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| compile(DATE_PATTERNS))
}

fn time_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| compile(TIME_PATTERNS))
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            let expanded = p.replace("MONTHS", MONTHS);
            Regex::new(&expanded).expect("must be valid regex")
        })
        .collect()
}

pub(crate) fn replace_dates(text: &str) -> String {
    replace_all(text, date_regexes(), DATE_PLACEHOLDER)
}

pub(crate) fn replace_times(text: &str) -> String {
    replace_all(text, time_regexes(), TIME_PLACEHOLDER)
}

fn replace_all(text: &str, regexes: &[Regex], placeholder: &str) -> String {
    let mut out = text.to_owned();
    for re in regexes {
        if re.is_match(&out) {
            out = re.replace_all(&out, placeholder).into_owned();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_date_matches() {
        assert_eq!(replace_dates("due 2025-11-20 ok"), "due {{DATE}} ok");
    }

    #[test]
    fn slash_date_matches() {
        assert_eq!(replace_dates("due 20/11/2025"), "due {{DATE}}");
    }

    #[test]
    fn month_name_forms_match() {
        assert_eq!(replace_dates("Nov 20"), "{{DATE}}");
        assert_eq!(replace_dates("November 20"), "{{DATE}}");
        assert_eq!(replace_dates("Sep. 3"), "{{DATE}}");
        assert_eq!(replace_dates("20 Nov"), "{{DATE}}");
    }

    #[test]
    fn room_number_not_a_date() {
        assert_eq!(replace_dates("Room 20-11"), "Room 20-11");
    }

    #[test]
    fn short_slash_fraction_not_a_date() {
        assert_eq!(replace_dates("score 3/4"), "score 3/4");
    }

    #[test]
    fn clock_times_match() {
        assert_eq!(replace_times("at 18:30"), "at {{TIME}}");
        assert_eq!(replace_times("at 6:30 pm"), "at {{TIME}}");
        assert_eq!(replace_times("at 6:30:15"), "at {{TIME}}");
        assert_eq!(replace_times("at 12PM"), "at {{TIME}}");
    }

    #[test]
    fn am_as_a_word_survives() {
        assert_eq!(replace_times("I am ready"), "I am ready");
    }
}
