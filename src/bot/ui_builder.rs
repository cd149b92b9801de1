//! UI Builder module for creating Telegram keyboards from router button rows

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

// Import router button types
use crate::router::{ButtonRows, ButtonSpec};

/// Convert transport-free button rows into an inline keyboard.
///
/// A link button whose URL fails to parse is skipped rather than failing
/// the whole message.
pub fn build_keyboard(rows: &ButtonRows) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|spec| match spec {
                    ButtonSpec::Callback { label, data } => {
                        Some(InlineKeyboardButton::callback(label.clone(), data.clone()))
                    }
                    ButtonSpec::Link { label, url } => match url.parse() {
                        Ok(url) => Some(InlineKeyboardButton::url(label.clone(), url)),
                        Err(e) => {
                            warn!(url = %url, error = %e, "Skipping button with invalid URL");
                            None
                        }
                    },
                })
                .collect()
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}
