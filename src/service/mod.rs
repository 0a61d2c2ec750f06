//! # Bot Lifecycle Service
//!
//! Owns the long-running Telegram connection. A small state machine
//! (`Created -> Started -> Stopped`) guards the lifecycle: `start`
//! registers the conversation handler and begins polling on a
//! background task, `stop` tears it down deterministically, and
//! `announce` is a one-shot send that works in any state so the
//! external scheduler can post terms without a running poll loop.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Drop pending updates on start; idempotent stop
//! - 1.0.0: Initial release

use crate::core::config::{validate_token, Config};
use crate::core::error::BotError;
use crate::dataset::{Lexicon, Term};
use crate::handler::ConversationHandler;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use teloxide::dispatching::{Dispatcher, ShutdownToken, UpdateFilterExt};
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use teloxide::update_listeners::Polling;
use tokio::task::JoinHandle;

/// Lifecycle states of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Created,
    Started,
    Stopped,
}

impl ServiceState {
    pub fn name(self) -> &'static str {
        match self {
            ServiceState::Created => "created",
            ServiceState::Started => "started",
            ServiceState::Stopped => "stopped",
        }
    }

    /// `Created -> Started`; anything else is a misuse of the API.
    fn begin_start(self) -> Result<ServiceState, BotError> {
        match self {
            ServiceState::Created => Ok(ServiceState::Started),
            other => Err(BotError::InvalidTransition {
                op: "start",
                state: other.name(),
            }),
        }
    }

    /// `Started -> Stopped`; from any other state stop is a no-op,
    /// because termination handlers may race each other.
    fn begin_stop(self) -> Option<ServiceState> {
        match self {
            ServiceState::Started => Some(ServiceState::Stopped),
            _ => None,
        }
    }
}

/// Handles owned by a started poll loop.
struct Running {
    shutdown: ShutdownToken,
    poll_task: JoinHandle<()>,
}

/// The long-lived bot service.
///
/// All methods take `&self`: `stop` is expected to be called from a
/// different task than `start` (the signal handler), and `announce`
/// may run concurrently with the poll loop.
pub struct BotService {
    bot: Bot,
    lexicon: Lexicon,
    state: Mutex<ServiceState>,
    running: tokio::sync::Mutex<Option<Running>>,
}

impl BotService {
    /// Bind credentials and the dataset path. No network activity.
    pub fn new(config: &Config) -> Result<Self, BotError> {
        validate_token(&config.token)?;
        Ok(BotService {
            bot: Bot::new(config.token.clone()),
            lexicon: Lexicon::new(&config.dataset_path),
            state: Mutex::new(ServiceState::Created),
            running: tokio::sync::Mutex::new(None),
        })
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Start consuming inbound updates on a background task.
    ///
    /// Updates queued while the bot was down are dropped; only events
    /// after this call count. Fails with `InvalidTransition` if the
    /// service is not freshly created, leaving the state untouched.
    pub async fn start(&self) -> Result<(), BotError> {
        // Holding the running lock for the whole start sequence makes
        // a concurrent stop() wait until the dispatcher handles are
        // stored, instead of finding nothing to tear down.
        let mut running = self.running.lock().await;
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            *state = state.begin_start()?;
        }

        // Resolve our own identity; replies are only answered when the
        // replied-to prompt was authored by this id.
        let me = match self.bot.get_me().await {
            Ok(me) => me,
            Err(e) => {
                *self.state.lock().expect("state lock poisoned") = ServiceState::Created;
                return Err(BotError::Transport(e));
            }
        };
        info!("starting bot @{}", me.user.username.as_deref().unwrap_or("?"));

        let handler = Arc::new(ConversationHandler::new(self.lexicon.clone(), me.user.id));
        let tree = Update::filter_message().endpoint(handle_update);
        let mut dispatcher = Dispatcher::builder(self.bot.clone(), tree)
            .dependencies(dptree::deps![handler])
            .default_handler(|update| async move {
                debug!("ignoring non-message update {}", update.id);
            })
            .build();
        let shutdown = dispatcher.shutdown_token();

        let listener = Polling::builder(self.bot.clone())
            .drop_pending_updates()
            .build();
        let poll_task = tokio::spawn(async move {
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("update listener error"),
                )
                .await;
        });

        *running = Some(Running {
            shutdown,
            poll_task,
        });
        Ok(())
    }

    /// Stop the poll loop and release the connection.
    ///
    /// Teardown order: stop taking new updates, await in-flight
    /// handlers, join the poll task. Idempotent: calling stop on a
    /// never-started or already-stopped service does nothing.
    pub async fn stop(&self) {
        // Same lock as start(): a stop racing an in-progress start
        // queues behind it and then tears down what start stored.
        let mut running = self.running.lock().await;
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            match state.begin_stop() {
                Some(next) => *state = next,
                None => {
                    debug!("stop() with no running poll loop; nothing to do");
                    return;
                }
            }
        }

        info!("stopping bot");
        if let Some(running) = running.take() {
            match running.shutdown.shutdown() {
                // Resolves once in-flight handlers have completed.
                Ok(done) => done.await,
                Err(e) => debug!("dispatcher already idle: {e}"),
            }
            if let Err(e) = running.poll_task.await {
                warn!("poll task ended abnormally: {e}");
            }
        }
        info!("bot stopped");
    }

    /// One-shot announcement of a term to a chat, rendered in prompt
    /// form. Usable in any lifecycle state. Not retried: a retry could
    /// duplicate a visible chat message.
    pub async fn announce(&self, chat_id: ChatId, term: &Term) -> Result<(), BotError> {
        let text = crate::validator::render_prompt(&term.name, &term.category);
        self.bot
            .send_message(chat_id, &text)
            .await
            .map_err(BotError::SendFailed)?;
        info!("announced {text:?} to {chat_id}");
        Ok(())
    }
}

async fn handle_update(
    bot: Bot,
    message: Message,
    handler: Arc<ConversationHandler>,
) -> ResponseResult<()> {
    // Per-event failures are fully absorbed by the handler.
    handler.on_message(&bot, &message).await;
    Ok(())
}
