//! # Reply Validation
//!
//! Pure classification of prompt text, with no networking involved.
//! A well-formed prompt is exactly what the announce side renders:
//! `<name> (<category>)`, e.g. `serendipity (noun)` or `mystery (?)`.
//! Anything else in the group is unrelated conversation and must not
//! trigger the bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Extracted from the conversation handler as a pure module

use regex::Regex;
use std::sync::OnceLock;
use teloxide::types::{Message, UserId};

/// Anchored prompt grammar: a word/space name, one space, then a
/// parenthesized category of word characters, spaces, commas, or the
/// `?` placeholder the ETL writes for missing categories.
const PROMPT_PATTERN: &str = r"^[\w\s]+ \([\w\s,?]+\)$";

fn prompt_format() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PROMPT_PATTERN).expect("prompt pattern is valid"))
}

/// Outcome of classifying a candidate prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Valid { name: String, category: String },
    Invalid,
}

/// Classify free text against the prompt grammar and extract the
/// structured `(name, category)` identity on success.
///
/// The name is everything before the first `" ("` (trimmed) and the
/// category is the text between the first `(` and the following `)`.
/// Known edge case: a term whose own name contains `" ("` would split
/// early here; such a name also cannot pass the grammar, so the first
/// split point is the only one a valid prompt can have.
pub fn classify(text: Option<&str>) -> Classification {
    let Some(text) = text else {
        return Classification::Invalid;
    };
    if !prompt_format().is_match(text) {
        return Classification::Invalid;
    }
    let Some((name, rest)) = text.split_once(" (") else {
        return Classification::Invalid;
    };
    let Some((category, _)) = rest.split_once(')') else {
        return Classification::Invalid;
    };
    Classification::Valid {
        name: name.trim().to_string(),
        category: category.to_string(),
    }
}

/// Whether `message` was sent by the bot itself.
pub fn is_authored_by_bot(message: &Message, bot_id: UserId) -> bool {
    message.from().map(|user| user.id == bot_id).unwrap_or(false)
}

/// Render a term identity back into prompt form.
pub fn render_prompt(name: &str, category: &str) -> String {
    format!("{name} ({category})")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(name: &str, category: &str) -> Classification {
        Classification::Valid {
            name: name.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_simple_prompt_accepted() {
        assert_eq!(
            classify(Some("serendipity (noun)")),
            valid("serendipity", "noun")
        );
    }

    #[test]
    fn test_multi_word_name_and_category() {
        assert_eq!(
            classify(Some("give up (verb, informal)")),
            valid("give up", "verb, informal")
        );
    }

    #[test]
    fn test_placeholder_category_accepted() {
        assert_eq!(classify(Some("mystery (?)")), valid("mystery", "?"));
    }

    #[test]
    fn test_missing_space_before_parenthesis_rejected() {
        assert_eq!(classify(Some("serendipity(noun)")), Classification::Invalid);
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert_eq!(
            classify(Some("serendipity (noun) extra")),
            Classification::Invalid
        );
    }

    #[test]
    fn test_leading_text_rejected() {
        assert_eq!(
            classify(Some("today: serendipity (noun)")),
            Classification::Invalid
        );
    }

    #[test]
    fn test_empty_and_missing_text_rejected() {
        assert_eq!(classify(Some("")), Classification::Invalid);
        assert_eq!(classify(None), Classification::Invalid);
    }

    #[test]
    fn test_empty_category_rejected() {
        assert_eq!(classify(Some("serendipity ()")), Classification::Invalid);
    }

    fn message_sent_by(user_id: u64) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": {"id": 10, "type": "private", "first_name": "Group"},
            "from": {"id": user_id, "is_bot": true, "first_name": "wordbot"},
            "text": "serendipity (noun)"
        }))
        .expect("valid message payload")
    }

    #[test]
    fn test_bot_authorship_requires_id_equality() {
        let bot_id = UserId(42);
        assert!(is_authored_by_bot(&message_sent_by(42), bot_id));
        assert!(!is_authored_by_bot(&message_sent_by(7), bot_id));
    }

    #[test]
    fn test_message_without_sender_is_not_bot_authored() {
        let message: Message = serde_json::from_value(serde_json::json!({
            "message_id": 2,
            "date": 1_700_000_000,
            "chat": {"id": 10, "type": "channel", "title": "announcements"},
            "text": "serendipity (noun)"
        }))
        .expect("valid message payload");
        assert!(!is_authored_by_bot(&message, UserId(42)));
    }

    #[test]
    fn test_round_trip_reconstructs_prompt() {
        for text in [
            "serendipity (noun)",
            "give up (verb, informal)",
            "mystery (?)",
            "a b c (x y z)",
        ] {
            match classify(Some(text)) {
                Classification::Valid { name, category } => {
                    assert_eq!(render_prompt(&name, &category), text);
                }
                Classification::Invalid => panic!("expected {text:?} to classify as valid"),
            }
        }
    }
}
