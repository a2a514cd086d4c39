//! The ordered rule chain
//!
//! Each rule inspects the text and context and either produces a final
//! decision or defers to the next rule. The chain terminates with the
//! word-count default, which always matches.

use voxgate_core::{MessageType, SpeechContext, SpeechMode, Urgency};

use crate::{SpeechDecision, patterns};

type Rule = fn(&str, &SpeechContext) -> Option<SpeechDecision>;

/// Rules in priority order; first match wins
pub(crate) static CHAIN: &[Rule] = &[
    system_filter,
    user_override,
    urgent_confirmation,
    greeting_or_farewell,
    long_list,
    empathy,
    error_notification,
    word_count_default,
];

/// Character threshold under which an urgent message stays brief
const BRIEF_CHAR_LIMIT: usize = 100;

/// List-item count above which a reply is muted
const LIST_ITEM_LIMIT: u32 = 3;

const BRIEF_WORD_LIMIT: usize = 30;
const FULL_WORD_LIMIT: usize = 80;

fn system_filter(text: &str, _context: &SpeechContext) -> Option<SpeechDecision> {
    if text.trim().chars().count() < 3 || patterns::any_match(patterns::system_markers(), text) {
        return Some(SpeechDecision::mute("System/debug message filtered"));
    }
    None
}

fn user_override(_text: &str, context: &SpeechContext) -> Option<SpeechDecision> {
    if context.user_requested_audio == Some(true) {
        return Some(SpeechDecision::speak(SpeechMode::Full, "User explicitly requested audio"));
    }
    None
}

fn urgent_confirmation(text: &str, context: &SpeechContext) -> Option<SpeechDecision> {
    let urgent = context.urgency == Some(Urgency::High)
        || context.message_type == Some(MessageType::Confirmation);

    if urgent {
        let mode = if text.chars().count() < BRIEF_CHAR_LIMIT {
            SpeechMode::Brief
        } else {
            SpeechMode::Full
        };
        return Some(SpeechDecision::speak(mode, "Urgent confirmation or high-priority message"));
    }
    None
}

fn greeting_or_farewell(text: &str, context: &SpeechContext) -> Option<SpeechDecision> {
    if context.is_first_message == Some(true) || patterns::any_match(patterns::greetings(), text) {
        return Some(SpeechDecision::speak(SpeechMode::Brief, "Greeting message"));
    }
    if patterns::any_match(patterns::farewells(), text) {
        return Some(SpeechDecision::speak(SpeechMode::Brief, "Farewell message"));
    }
    None
}

fn long_list(text: &str, context: &SpeechContext) -> Option<SpeechDecision> {
    let count = context.item_count.unwrap_or_else(|| {
        u32::try_from(patterns::list_items().find_iter(text).count()).unwrap_or(u32::MAX)
    });

    if count > LIST_ITEM_LIMIT {
        return Some(SpeechDecision::mute(format!("Long list detected ({count} items)")));
    }
    None
}

fn empathy(text: &str, _context: &SpeechContext) -> Option<SpeechDecision> {
    if patterns::any_match(patterns::empathy(), text) {
        return Some(SpeechDecision::speak(SpeechMode::Full, "Empathetic or supportive message"));
    }
    None
}

fn error_notification(text: &str, context: &SpeechContext) -> Option<SpeechDecision> {
    let lowered = text.to_lowercase();
    if context.message_type == Some(MessageType::Error)
        || lowered.contains("error")
        || lowered.contains("problem")
    {
        return Some(SpeechDecision::speak(SpeechMode::Brief, "Error notification"));
    }
    None
}

fn word_count_default(text: &str, _context: &SpeechContext) -> Option<SpeechDecision> {
    let words = text.split_whitespace().count();

    Some(if words <= BRIEF_WORD_LIMIT {
        SpeechDecision::speak(SpeechMode::Brief, "Short response suitable for audio")
    } else if words <= FULL_WORD_LIMIT {
        SpeechDecision::speak(SpeechMode::Full, "Standard response")
    } else {
        SpeechDecision::mute("Response too long for audio - text only")
    })
}
