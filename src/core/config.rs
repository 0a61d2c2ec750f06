//! Typed configuration resolved once at process start.
//!
//! Values come from the environment (optionally via a `.env` file
//! loaded by the binaries). Required fields are validated eagerly so a
//! bad deployment fails at startup instead of at first use.

use crate::core::error::BotError;
use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Telegram bot tokens look like `<numeric id>:<secret>`.
const TOKEN_SHAPE: &str = r"^[0-9]+:[A-Za-z0-9_-]+$";

fn token_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_SHAPE).expect("token pattern is valid"))
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token.
    pub token: String,
    /// CSV dataset with `name,type,description` columns.
    pub dataset_path: PathBuf,
    /// Target group for announcements; only the announce binary needs it.
    pub chat_id: Option<i64>,
}

impl Config {
    /// Load and validate configuration from the environment.
    ///
    /// * `WORDBOT_TOKEN` - required, must match the token shape
    /// * `WORDBOT_DATASET` - optional, defaults to `data/union.csv`
    /// * `WORDBOT_CHAT_ID` - optional, numeric chat id
    pub fn from_env() -> Result<Self> {
        let token = env::var("WORDBOT_TOKEN").unwrap_or_default();
        validate_token(&token)?;

        let dataset_path = PathBuf::from(
            env::var("WORDBOT_DATASET").unwrap_or_else(|_| "data/union.csv".to_string()),
        );
        if let Err(e) = std::fs::metadata(&dataset_path) {
            return Err(BotError::DatasetUnavailable(format!(
                "{}: {e}",
                dataset_path.display()
            ))
            .into());
        }

        let chat_id = match env::var("WORDBOT_CHAT_ID") {
            Ok(raw) => Some(
                raw.parse::<i64>()
                    .with_context(|| format!("WORDBOT_CHAT_ID is not a chat id: {raw:?}"))?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            token,
            dataset_path,
            chat_id,
        })
    }
}

/// Reject empty or malformed tokens before any network use.
pub(crate) fn validate_token(token: &str) -> Result<(), BotError> {
    if token.is_empty() || !token_shape().is_match(token) {
        return Err(BotError::InvalidToken);
    }
    Ok(())
}
