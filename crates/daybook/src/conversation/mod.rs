//! Multi-step dialogues, independent of the Telegram transport
//!
//! The controller turns an incoming command or text into a [`Reply`] and
//! keeps each user's [`ConversationState`] between messages.

mod controller;
pub mod messages;
mod reply;
mod state;

pub use controller::{ChatUser, ConversationController};
pub use reply::{Reply, ReplyKeyboard};
pub use state::{ConversationState, SubjectRef, TermRef};
