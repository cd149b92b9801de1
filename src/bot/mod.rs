//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Translates incoming text and photo messages into
//!   router events and delivers the resulting effects
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Converts transport-free button rows into Telegram
//!   keyboards
//! - `outbound`: Delivers outbound effects, swallowing delivery failures

pub mod callback_handler;
pub mod message_handler;
pub mod outbound;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;
