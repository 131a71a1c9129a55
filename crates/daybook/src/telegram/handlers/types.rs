//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::conversation::{ChatUser, ConversationController};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub controller: Arc<ConversationController>,
}

impl HandlerDeps {
    pub fn new(controller: Arc<ConversationController>) -> Self {
        Self { controller }
    }
}

/// Identifies the sender by chat; the first name is only used for greetings.
pub fn chat_user(msg: &Message) -> ChatUser {
    ChatUser::new(msg.chat.id.0, msg.from.as_ref().map(|u| u.first_name.clone()))
}
