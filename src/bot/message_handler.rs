//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error};

// Import localization
use crate::localization::t_lang;

// Import router types
use crate::router::{ConversationRouter, EventKind, InboundEvent};

// Import effect delivery
use super::outbound::deliver_effects;

/// Classify an incoming message. Returns `None` for update types the bot
/// does not react to (stickers, voice, documents, ...).
fn event_kind(msg: &Message) -> Option<EventKind> {
    if let Some(text) = msg.text() {
        if let Some(command) = text.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            // Commands may arrive as /start@botname in group contexts
            let name = parts
                .next()
                .map(|name| name.split('@').next().unwrap_or(name).to_string())
                .unwrap_or_default();
            let args = parts.map(str::to_string).collect();
            Some(EventKind::Command { name, args })
        } else {
            Some(EventKind::Text {
                text: text.to_string(),
            })
        }
    } else if msg.photo().is_some() {
        Some(EventKind::Photo)
    } else {
        None
    }
}

/// Build the router event for a message, resolving the sender's identity
fn inbound_event(msg: &Message, kind: EventKind) -> InboundEvent {
    let user = msg.from.as_ref();
    InboundEvent {
        user_id: msg.chat.id.0,
        display_name: user.map(|user| user.full_name()).unwrap_or_default(),
        username: user.and_then(|user| user.username.clone()),
        language_code: user.and_then(|user| user.language_code.clone()),
        kind,
    }
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    router: Arc<ConversationRouter>,
    admin_chat: String,
) -> Result<()> {
    let Some(kind) = event_kind(&msg) else {
        debug!(user_id = %msg.chat.id, "Ignoring unsupported message type");
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, kind = ?kind, "Routing message");
    let event = inbound_event(&msg, kind);

    // Top dispatch boundary: whatever goes wrong, the user gets a generic
    // apology, the session is left as it was and the process keeps running.
    if let Err(e) = route_and_deliver(&bot, &router, &admin_chat, event).await {
        error!(user_id = %msg.chat.id, error = %e, "Unhandled error while processing message");
        let language_code = msg
            .from
            .as_ref()
            .and_then(|user| user.language_code.as_deref());
        if let Err(send_err) = bot
            .send_message(msg.chat.id, t_lang("error-generic", language_code))
            .await
        {
            error!(user_id = %msg.chat.id, error = %send_err, "Failed to deliver apology message");
        }
    }

    Ok(())
}

async fn route_and_deliver(
    bot: &Bot,
    router: &ConversationRouter,
    admin_chat: &str,
    event: InboundEvent,
) -> Result<()> {
    let effects = router.handle_event(event);
    deliver_effects(bot, admin_chat, None, effects).await;
    Ok(())
}
