//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

// Import router types
use crate::router::{ConversationRouter, EventKind, InboundEvent};

// Import effect delivery
use super::outbound::deliver_effects;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    router: Arc<ConversationRouter>,
    admin_chat: String,
) -> Result<()> {
    let data = q.data.clone().unwrap_or_default();
    debug!(user_id = %q.from.id, data = %data, "Received callback query from user");

    // In a private chat the originating chat is the user; fall back to the
    // user id when the message is no longer accessible.
    let chat_id = q
        .message
        .as_ref()
        .map(|msg| msg.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    let event = InboundEvent {
        user_id: chat_id.0,
        display_name: q.from.full_name(),
        username: q.from.username.clone(),
        language_code: q.from.language_code.clone(),
        kind: EventKind::ButtonPress { data },
    };

    let effects = router.handle_event(event);
    let edit_target = q.message.as_ref().map(|msg| (msg.chat().id, msg.id()));
    deliver_effects(&bot, &admin_chat, edit_target, effects).await;

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
