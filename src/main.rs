use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ovozbot::bot;
use ovozbot::config::BotConfig;
use ovozbot::localization;
use ovozbot::router::ConversationRouter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; the default filter also carries `log` macro
    // output from the pure modules through the compatibility layer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Ovoz Berish Telegram Bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    // Message catalogs must be in place before the first update arrives
    localization::init_localization()?;

    let bot = Bot::new(&config.token);
    let router = Arc::new(ConversationRouter::new(config.router.clone()));
    let admin_chat = config.admin_chat.clone();

    info!("Bot initialized, starting dispatcher");

    // Set up the dispatcher with the shared router
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let router = Arc::clone(&router);
            let admin_chat = admin_chat.clone();
            move |bot: Bot, msg: Message| {
                let router = Arc::clone(&router);
                let admin_chat = admin_chat.clone();
                async move { bot::message_handler(bot, msg, router, admin_chat).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let router = Arc::clone(&router);
            let admin_chat = admin_chat.clone();
            move |bot: Bot, q: CallbackQuery| {
                let router = Arc::clone(&router);
                let admin_chat = admin_chat.clone();
                async move { bot::callback_handler(bot, q, router, admin_chat).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
