#![allow(clippy::result_large_err)]

mod game;

use dotenvy::dotenv;
use picord::config::{DbType, load_default_config};
use picord::{Bot, BotConfig, Error, Result};
use std::env;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Bot options: picord.toml when present, the fishing defaults otherwise
    let config = if Path::new("picord.toml").exists() {
        load_default_config()
            .inspect_err(|e| error!("Critical error loading picord.toml: {}", e))?
    } else {
        info!("No picord.toml found, using built-in fishing configuration.");
        BotConfig::with_prefix("~").with_database(DbType::Sqlite, "fishing.db")
    };

    // 4. Register handlers and freeze the registry
    let bot = game::register(Bot::builder(config))
        .build()
        .inspect_err(|e| error!("Invalid bot registration: {}", e))?;

    // 5. Run the bot
    // DISCORD_BOT_TOKEN is read here, directly before use, never stored in the config
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot.run(&token)
        .await
        .inspect_err(|e| error!("Bot stopped with error: {}", e))
}
