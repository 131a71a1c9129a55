use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use daybook::cli::{Cli, Commands};
use daybook::conversation::ConversationController;
use daybook::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use daybookcore::core::init_logger;
use daybookcore::{config, create_pool};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, token, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH, &config::LOG_LEVEL)?;

    match cli.command {
        Some(Commands::Migrate) => run_migrate(),
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Creates the database (if needed) and applies pending migrations
fn run_migrate() -> Result<()> {
    create_pool(&config::DATABASE_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    log::info!("✅ Database {} is up to date", *config::DATABASE_PATH);
    Ok(())
}

/// Runs the bot with long polling until Ctrl+C
async fn run_bot() -> Result<()> {
    log::info!("🚀 Starting Marks E-Daybook bot");

    let token = config::bot_token()?;

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH)
            .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    log::info!("💾 Database ready at {}", *config::DATABASE_PATH);

    let bot = create_bot(&token)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let controller = Arc::new(ConversationController::new(db_pool));
    let deps = HandlerDeps::new(controller);

    log::info!("🤖 Bot is running, press Ctrl+C to stop");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("👋 Bot stopped");
    Ok(())
}
