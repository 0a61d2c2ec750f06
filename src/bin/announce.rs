//! One-shot scheduler entry point: post a random term to the group.
//!
//! Run from cron (or any external scheduler) after the ETL refreshes
//! the dataset. Exits nonzero on failure so the scheduler can alert.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use log::info;
use teloxide::types::ChatId;

use wordbot::{BotService, Config, Lexicon};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let chat_id = ChatId(
        config
            .chat_id
            .context("WORDBOT_CHAT_ID is required to announce")?,
    );

    let term = Lexicon::new(&config.dataset_path).random_term().await?;
    info!("picked {:?} ({:?})", term.name, term.category);

    let service = BotService::new(&config)?;
    service.announce(chat_id, &term).await?;

    Ok(())
}
