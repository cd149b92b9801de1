//! # Configuration Module
//!
//! This module defines configuration structures for the bot: the router's
//! behavior flags and the static voting links, plus the process-level
//! settings loaded from the environment.

use std::env;

use anyhow::{Context, Result};

// Constants for the observed deployment
pub const DEFAULT_CAMPAIGN_TAG_PREFIX: &str = "05";
pub const DEFAULT_VOTE_BOT_URL: &str = "https://t.me/ochiqbudjetbot?start=052396997002";
pub const DEFAULT_VOTE_WEB_URL: &str =
    "https://openbudget.uz/boards/initiatives/initiative/52/b8072066-279c-477d-8324-3d139d195c25";
pub const DEFAULT_GITHUB_URL: &str = "https://github.com";
pub const DEFAULT_ADMIN_CHAT: &str = "@tencent_holdingltd";

/// Verbosity of the reply to free text that is not part of the voting flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
    /// Keyword-based FAQ-style replies
    Faq,
    /// No reply at all
    Silent,
}

/// Configuration for the conversation router
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Start parameters beginning with this prefix are campaign tags
    pub campaign_tag_prefix: String,
    /// Deep link for voting inside Telegram
    pub vote_bot_url: String,
    /// Web page for voting in a browser
    pub vote_web_url: String,
    /// Link shown on the welcome keyboard
    pub github_url: String,
    /// Illustrative image sent with the voting instructions (Telegram file
    /// id or HTTPS URL); instructions fall back to text-only when unset
    pub instructions_image: Option<String>,
    /// Reply behavior for unrelated free text
    pub fallback: FallbackMode,
    /// When set, a screenshot is only acknowledged as a confirmation if the
    /// session was actually waiting for one
    pub gate_screenshot: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            campaign_tag_prefix: DEFAULT_CAMPAIGN_TAG_PREFIX.to_string(),
            vote_bot_url: DEFAULT_VOTE_BOT_URL.to_string(),
            vote_web_url: DEFAULT_VOTE_WEB_URL.to_string(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            instructions_image: None,
            fallback: FallbackMode::Faq,
            gate_screenshot: false,
        }
    }
}

/// Process-level configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot API token
    pub token: String,
    /// Fixed admin destination for phone number notifications, either a
    /// `@username` or a numeric chat id
    pub admin_chat: String,
    pub router: RouterConfig,
}

impl BotConfig {
    /// Load configuration from environment variables, applying the defaults
    /// of the observed deployment for everything except the token.
    pub fn from_env() -> Result<Self> {
        let token =
            env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
        let admin_chat =
            env::var("ADMIN_CHAT_ID").unwrap_or_else(|_| DEFAULT_ADMIN_CHAT.to_string());

        let defaults = RouterConfig::default();
        let router = RouterConfig {
            campaign_tag_prefix: env::var("CAMPAIGN_TAG_PREFIX")
                .unwrap_or(defaults.campaign_tag_prefix),
            vote_bot_url: env::var("VOTE_BOT_URL").unwrap_or(defaults.vote_bot_url),
            vote_web_url: env::var("VOTE_WEB_URL").unwrap_or(defaults.vote_web_url),
            github_url: env::var("GITHUB_URL").unwrap_or(defaults.github_url),
            instructions_image: env::var("INSTRUCTIONS_IMAGE").ok().filter(|s| !s.is_empty()),
            fallback: match env::var("FALLBACK_MODE").as_deref() {
                Ok("silent") => FallbackMode::Silent,
                _ => FallbackMode::Faq,
            },
            gate_screenshot: matches!(env::var("GATE_SCREENSHOT").as_deref(), Ok("1") | Ok("true")),
        };

        Ok(Self {
            token,
            admin_chat,
            router,
        })
    }
}
