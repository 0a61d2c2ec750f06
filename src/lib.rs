// Core layer - configuration and error taxonomy
pub mod core;

// Infrastructure - read-only lexicon dataset
pub mod dataset;

// Domain - prompt grammar and reply classification
pub mod validator;

// Application layer
pub mod handler;
pub mod service;

// Re-export the types callers actually wire together
pub use crate::core::{BotError, Config};
pub use dataset::{Lexicon, Term};
pub use handler::ConversationHandler;
pub use service::{BotService, ServiceState};
pub use validator::Classification;
