//! Error taxonomy for the bot.
//!
//! Recoverable and fatal cases are distinct variants so callers can
//! apply the right policy: the conversation handler logs and swallows
//! `DatasetUnavailable`/`SendFailed`, while lifecycle misuse and bad
//! credentials propagate synchronously.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// The bot token is empty or not shaped like a Telegram token.
    #[error("invalid bot token")]
    InvalidToken,

    /// A lifecycle operation was called from the wrong state.
    #[error("{op}() is not valid while the service is {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },

    /// The dataset file could not be opened, read, or parsed.
    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),

    /// An outbound send was rejected by the transport.
    #[error("send failed: {0}")]
    SendFailed(#[source] teloxide::RequestError),

    /// Establishing the connection (resolving our own identity) failed.
    #[error("transport error: {0}")]
    Transport(#[source] teloxide::RequestError),
}
