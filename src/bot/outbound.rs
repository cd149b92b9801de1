//! Outbound delivery module
//!
//! Interprets the router's effects against the Telegram API. Delivery
//! failures are logged and swallowed: they are never retried, and a failed
//! effect never blocks the effects that follow it (an undeliverable admin
//! notification must not keep the user from getting their reply).

use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId, Recipient};
use tracing::{debug, error};

// Import router effect types
use crate::router::OutboundEffect;

// Import keyboard conversion
use super::ui_builder::build_keyboard;

/// Deliver every effect in order, logging and skipping failures.
pub async fn deliver_effects(
    bot: &Bot,
    admin_chat: &str,
    edit_target: Option<(ChatId, MessageId)>,
    effects: Vec<OutboundEffect>,
) {
    for effect in effects {
        if let Err(e) = deliver_effect(bot, admin_chat, edit_target, effect).await {
            error!(error = %e, "Failed to deliver outbound effect");
        }
    }
}

async fn deliver_effect(
    bot: &Bot,
    admin_chat: &str,
    edit_target: Option<(ChatId, MessageId)>,
    effect: OutboundEffect,
) -> Result<(), teloxide::RequestError> {
    match effect {
        OutboundEffect::SendText {
            user_id,
            text,
            buttons,
        } => {
            let request = bot.send_message(ChatId(user_id), text);
            match buttons {
                Some(rows) => {
                    request.reply_markup(build_keyboard(&rows)).await?;
                }
                None => {
                    request.await?;
                }
            }
        }
        OutboundEffect::SendPhoto {
            user_id,
            photo_ref,
            caption,
        } => {
            bot.send_photo(ChatId(user_id), input_file(&photo_ref))
                .caption(caption)
                .await?;
        }
        OutboundEffect::EditMessage { text } => match edit_target {
            Some((chat_id, message_id)) => {
                bot.edit_message_text(chat_id, message_id, text).await?;
            }
            None => debug!("No originating message for EditMessage effect"),
        },
        OutboundEffect::NotifyAdmin { text } => match admin_recipient(admin_chat) {
            Some(recipient) => {
                bot.send_message(recipient, text).await?;
            }
            None => {
                error!(admin_chat = %admin_chat, "Admin destination is neither @username nor a chat id")
            }
        },
    }

    Ok(())
}

/// Resolve the configured admin destination: `@username` or a numeric chat
/// id.
fn admin_recipient(admin_chat: &str) -> Option<Recipient> {
    if admin_chat.starts_with('@') {
        Some(Recipient::ChannelUsername(admin_chat.to_string()))
    } else {
        admin_chat
            .parse::<i64>()
            .ok()
            .map(|id| Recipient::Id(ChatId(id)))
    }
}

/// An instructions image may be configured as an HTTPS URL or a Telegram
/// file id.
fn input_file(photo_ref: &str) -> InputFile {
    if photo_ref.starts_with("http") {
        match photo_ref.parse() {
            Ok(url) => return InputFile::url(url),
            Err(e) => error!(error = %e, "Invalid image URL, treating it as a file id"),
        }
    }
    InputFile::file_id(FileId(photo_ref.to_string()))
}
