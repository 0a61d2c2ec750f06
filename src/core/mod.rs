//! # Core Module
//!
//! Configuration and error taxonomy shared by every layer of the bot.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Eager dataset-path validation at config load
//! - 1.0.0: Initial creation with config and error modules

pub mod config;
pub mod error;

pub use config::Config;
pub use error::BotError;
