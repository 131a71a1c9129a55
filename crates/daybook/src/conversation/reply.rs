//! Transport-independent outgoing messages

/// What to do with the user's reply keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplyKeyboard {
    /// Leave whatever the client currently shows
    #[default]
    Unchanged,
    /// Offer these options, one per row
    Choices(Vec<String>),
    /// Hide a previously shown keyboard
    Remove,
}

/// A single message the bot sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: ReplyKeyboard,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Unchanged,
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Choices(choices),
        }
    }

    pub fn remove_keyboard(mut self) -> Self {
        self.keyboard = ReplyKeyboard::Remove;
        self
    }
}
