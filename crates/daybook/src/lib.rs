//! Marks E-Daybook Telegram bot
//!
//! - [`conversation`]: per-user dialogue state and replies
//! - [`telegram`]: bot setup and the dispatcher schema
//! - [`cli`]: command-line entry points

pub mod cli;
pub mod conversation;
pub mod telegram;

pub use conversation::{ChatUser, ConversationController, ConversationState, Reply, ReplyKeyboard};
