//! # Conversation Handler
//!
//! Orchestrates one inbound message event: decide whether it is a
//! legitimate reply to a bot-authored prompt, resolve the term, and
//! answer with the stored definitions as a threaded reply. Failures
//! are logged and swallowed here; nothing in a single event may take
//! the poll loop down.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Actionability check factored out for testing without the platform
//! - 1.0.0: Initial release

use crate::dataset::Lexicon;
use crate::validator::{self, Classification};
use log::{debug, error, info, warn};
use std::fmt;
use teloxide::prelude::*;
use teloxide::types::{Message, User, UserId};

/// Marker prefixed to every definition line in a reply body.
const DEFINITION_MARKER: &str = "▶ ";

/// Per-event identity snapshot, used only for audit logging.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub full_name: String,
    pub handle: String,
    pub id: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            full_name: user.full_name(),
            handle: user
                .username
                .as_ref()
                .map(|name| format!("@{name}"))
                .unwrap_or_else(|| "?".to_string()),
            id: user.id.to_string(),
        }
    }
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.full_name, self.handle, self.id)
    }
}

/// Handles inbound message events for the lifetime of one started
/// service. Holds no mutable state; concurrent events are independent.
#[derive(Debug, Clone)]
pub struct ConversationHandler {
    lexicon: Lexicon,
    bot_id: UserId,
}

impl ConversationHandler {
    pub fn new(lexicon: Lexicon, bot_id: UserId) -> Self {
        ConversationHandler { lexicon, bot_id }
    }

    /// Process one inbound message. Never returns an error: anything
    /// that goes wrong is logged and the event is dropped.
    pub async fn on_message(&self, bot: &Bot, message: &Message) {
        let prompt = message.reply_to_message();
        let prompt_from_bot = prompt
            .map(|p| validator::is_authored_by_bot(p, self.bot_id))
            .unwrap_or(false);
        let Some((name, category)) = actionable(prompt.and_then(|p| p.text()), prompt_from_bot)
        else {
            // Unrelated group conversation; stay silent by design.
            return;
        };

        if let Some(user) = message.from().map(UserInfo::from) {
            info!("{user} answered the prompt for {name:?} ({category:?})");
        }
        debug!("reply text: {:?}", message.text());

        let term = match self.lexicon.resolve(&name, &category).await {
            Ok(term) => term,
            Err(e) => {
                error!("dropping reply for {name:?}: {e}");
                return;
            }
        };

        let body = format_definitions(&term.definitions);
        if let Err(e) = bot
            .send_message(message.chat.id, body)
            .reply_to_message_id(message.id)
            .await
        {
            warn!("could not deliver definitions for {name:?}: {e}");
        }
    }
}

/// Decide whether an event is a reply the bot should answer, and if so
/// extract the term identity from the prompt text.
///
/// All three conditions are required: the replied-to message exists,
/// its text matches the prompt grammar, and the bot authored it.
fn actionable(prompt_text: Option<&str>, prompt_from_bot: bool) -> Option<(String, String)> {
    if !prompt_from_bot {
        return None;
    }
    match validator::classify(prompt_text) {
        Classification::Valid { name, category } => Some((name, category)),
        Classification::Invalid => None,
    }
}

/// Render the reply body: one line per definition, marker-prefixed.
/// Zero definitions yield an empty body; the reply is still sent so
/// the user learns the term has no stored definitions.
fn format_definitions(definitions: &[String]) -> String {
    let mut body = String::new();
    for definition in definitions {
        body.push_str(DEFINITION_MARKER);
        body.push_str(definition);
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable_reply_to_bot_prompt() {
        let result = actionable(Some("ubiquitous (adjective)"), true);
        assert_eq!(
            result,
            Some(("ubiquitous".to_string(), "adjective".to_string()))
        );
    }

    #[test]
    fn test_unsolicited_message_is_ignored() {
        // No replied-to message at all.
        assert_eq!(actionable(None, false), None);
    }

    #[test]
    fn test_reply_to_foreign_message_is_ignored() {
        // Perfectly formatted, but the bot did not write it.
        assert_eq!(actionable(Some("ubiquitous (adjective)"), false), None);
    }

    #[test]
    fn test_reply_to_malformed_bot_message_is_ignored() {
        assert_eq!(actionable(Some("good morning everyone"), true), None);
    }

    #[test]
    fn test_body_has_one_marker_line_per_definition() {
        let body = format_definitions(&[
            "present everywhere".to_string(),
            "omnipresent".to_string(),
        ]);
        assert_eq!(body, "▶ present everywhere\n▶ omnipresent\n");
    }

    #[test]
    fn test_empty_definitions_yield_empty_body() {
        assert_eq!(format_definitions(&[]), "");
    }

    mod end_to_end {
        use super::*;
        use crate::dataset::Lexicon;
        use std::io::Write;
        use tempfile::NamedTempFile;

        fn dataset(contents: &str) -> NamedTempFile {
            let mut file = NamedTempFile::new().expect("create temp dataset");
            file.write_all(contents.as_bytes()).expect("write fixture");
            file
        }

        /// Full pipeline short of the transport: classify the prompt,
        /// resolve it, render the body.
        async fn reply_body(
            lexicon: &Lexicon,
            prompt: &str,
            prompt_from_bot: bool,
        ) -> Option<String> {
            let (name, category) = actionable(Some(prompt), prompt_from_bot)?;
            let term = lexicon.resolve(&name, &category).await.unwrap();
            Some(format_definitions(&term.definitions))
        }

        #[tokio::test]
        async fn test_two_definitions_become_two_marker_lines() {
            let file = dataset(
                "name,type,description\n\
                 ubiquitous,adjective,present everywhere\n\
                 ubiquitous,adjective,omnipresent\n",
            );
            let lexicon = Lexicon::new(file.path());

            let body = reply_body(&lexicon, "ubiquitous (adjective)", true).await;
            assert_eq!(
                body.as_deref(),
                Some("▶ present everywhere\n▶ omnipresent\n")
            );
        }

        #[tokio::test]
        async fn test_unknown_placeholder_category_still_replies_empty() {
            let file = dataset("name,type,description\nrun,verb,move fast\n");
            let lexicon = Lexicon::new(file.path());

            // The bot posted "mystery (?)" but the dataset has no '?' rows;
            // the reply is still produced, with zero lines.
            let body = reply_body(&lexicon, "mystery (?)", true).await;
            assert_eq!(body.as_deref(), Some(""));
        }

        #[tokio::test]
        async fn test_foreign_prompt_produces_no_reply() {
            let file = dataset("name,type,description\nrun,verb,move fast\n");
            let lexicon = Lexicon::new(file.path());

            // Well-formed prompt, but not bot-authored: no lookup, no reply.
            let body = reply_body(&lexicon, "run (verb)", false).await;
            assert_eq!(body, None);
        }
    }
}
