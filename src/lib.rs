//! # Ovoz Berish Telegram Bot
//!
//! A Telegram bot that walks a user through a voting-confirmation flow:
//! it collects and normalizes an Uzbek phone number, forwards it to a
//! fixed admin chat and hands the user the links to cast a vote and
//! confirm it with a screenshot.

pub mod bot;
pub mod config;
pub mod localization;
pub mod phone;
pub mod router;
pub mod session;
