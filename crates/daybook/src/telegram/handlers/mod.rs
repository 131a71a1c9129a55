//! Telegram bot handler tree configuration
//!
//! The handler tree only adapts Telegram messages to the conversation
//! controller and renders its replies, so the same tree serves production
//! and tests.

mod schema;
mod types;

pub use schema::{schema, send_reply};
pub use types::{chat_user, HandlerDeps, HandlerError};
