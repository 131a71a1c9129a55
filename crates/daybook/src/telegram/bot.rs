//! Bot initialization and the command set
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command registration in the Telegram UI

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use daybookcore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Marks E-Daybook commands:")]
pub enum Command {
    #[command(description = "start using the daybook")]
    Start,
    #[command(description = "show available commands")]
    Help,
    #[command(description = "add a new subject")]
    AddSubject,
    #[command(description = "list all your subjects")]
    ListSubjects,
    #[command(description = "add a new grade")]
    AddGrade,
    #[command(description = "view your grades")]
    ViewGrades(String),
    #[command(description = "calculate average grades")]
    Average(String),
    #[command(description = "add a new academic term")]
    AddTerm,
    #[command(description = "list all terms")]
    ListTerms,
    #[command(description = "cancel the current operation")]
    Cancel,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Invalid BOT_API_URL or HTTP client construction failure
pub fn create_bot(token: &SecretString) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOT_NAME: &str = "daybook_bot";

    #[test]
    fn test_command_descriptions() {
        let command_list = Command::descriptions().to_string();

        assert!(command_list.contains("Marks E-Daybook commands"));
        for name in [
            "/start",
            "/help",
            "/add_subject",
            "/list_subjects",
            "/add_grade",
            "/view_grades",
            "/average",
            "/add_term",
            "/list_terms",
            "/cancel",
        ] {
            assert!(command_list.contains(name), "missing {name} in {command_list}");
        }
    }

    #[test]
    fn test_parse_snake_case_commands() {
        assert_eq!(Command::parse("/add_subject", BOT_NAME).unwrap(), Command::AddSubject);
        assert_eq!(Command::parse("/list_terms", BOT_NAME).unwrap(), Command::ListTerms);
        assert_eq!(
            Command::parse("/add_grade@daybook_bot", BOT_NAME).unwrap(),
            Command::AddGrade
        );
    }

    #[test]
    fn test_parse_optional_subject_argument() {
        assert_eq!(
            Command::parse("/average Math", BOT_NAME).unwrap(),
            Command::Average("Math".to_string())
        );
        assert_eq!(
            Command::parse("/view_grades", BOT_NAME).unwrap(),
            Command::ViewGrades(String::new())
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::parse("/delete_everything", BOT_NAME).is_err());
    }

    #[test]
    fn test_registered_command_count() {
        assert_eq!(Command::bot_commands().len(), 10);
    }
}
