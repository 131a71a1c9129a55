//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, Message, ReplyMarkup};

use super::types::{chat_user, HandlerDeps, HandlerError};
use crate::conversation::{Reply, ReplyKeyboard};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Branch order matters: known commands first, then anything else that
/// looks like a command, then plain text answers.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_unknown = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(unknown_command_handler(deps_unknown))
        .branch(message_handler(deps_messages))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let user = chat_user(&msg);
                let controller = deps.controller.clone();
                let reply = tokio::task::spawn_blocking(move || controller.handle_command(&user, cmd)).await?;
                send_reply(&bot, msg.chat.id, reply).await?;
                Ok(())
            }
        },
    ))
}

fn unknown_command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| text.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                log::info!("Unknown command {:?} from chat {}", msg.text(), msg.chat.id);
                let user = chat_user(&msg);
                let controller = deps.controller.clone();
                let reply = tokio::task::spawn_blocking(move || controller.handle_unknown_command(&user)).await?;
                send_reply(&bot, msg.chat.id, reply).await?;
                Ok(())
            }
        })
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let user = chat_user(&msg);
                let text = msg.text().unwrap_or_default().to_string();
                let controller = deps.controller.clone();
                let reply = tokio::task::spawn_blocking(move || controller.handle_text(&user, &text)).await?;
                send_reply(&bot, msg.chat.id, reply).await?;
                Ok(())
            }
        })
}

fn reply_markup(keyboard: ReplyKeyboard) -> Option<ReplyMarkup> {
    match keyboard {
        ReplyKeyboard::Unchanged => None,
        ReplyKeyboard::Choices(choices) => {
            let rows = choices.into_iter().map(|choice| vec![KeyboardButton::new(choice)]);
            Some(ReplyMarkup::Keyboard(
                KeyboardMarkup::new(rows).one_time_keyboard().resize_keyboard(),
            ))
        }
        ReplyKeyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
    }
}

/// Sends a controller reply, rendering choices as a one-time reply keyboard.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<(), teloxide::RequestError> {
    let request = bot.send_message(chat_id, reply.text);
    match reply_markup(reply.keyboard) {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unchanged_keyboard_sends_no_markup() {
        assert!(reply_markup(ReplyKeyboard::Unchanged).is_none());
    }

    #[test]
    fn test_choices_render_one_per_row() {
        let markup = reply_markup(ReplyKeyboard::Choices(vec!["Math".to_string(), "Art".to_string()]));

        let Some(ReplyMarkup::Keyboard(keyboard)) = markup else {
            panic!("expected a reply keyboard");
        };
        let labels: Vec<Vec<String>> = keyboard
            .keyboard
            .iter()
            .map(|row| row.iter().map(|button| button.text.clone()).collect())
            .collect();
        assert_eq!(labels, vec![vec!["Math".to_string()], vec!["Art".to_string()]]);
    }

    #[test]
    fn test_remove_keyboard() {
        assert!(matches!(
            reply_markup(ReplyKeyboard::Remove),
            Some(ReplyMarkup::KeyboardRemove(_))
        ));
    }
}
