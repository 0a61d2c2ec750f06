use anyhow::Result;
use dotenvy::dotenv;
use log::info;

use wordbot::{BotService, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let service = BotService::new(&config)?;
    service.start().await?;

    shutdown_signal().await?;
    info!("shutdown signal received");
    service.stop().await;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM, whichever arrives first.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
