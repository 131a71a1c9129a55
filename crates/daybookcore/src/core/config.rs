use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Environment variables checked for the bot token, in priority order
pub const TOKEN_ENV_VARS: &[&str] = &["TELEGRAM_TOKEN", "BOT_TOKEN", "TELOXIDE_TOKEN"];

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: daybook.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "daybook.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: logs.txt
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs.txt".to_string()));

/// Log level (error, warn, info, debug, trace)
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Custom Bot API server URL
/// Read from BOT_API_URL environment variable; unset means api.telegram.org
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Reads the bot token from the process environment.
///
/// # Errors
/// Returns `AppError::Config` when none of [`TOKEN_ENV_VARS`] holds a non-empty value.
pub fn bot_token() -> AppResult<SecretString> {
    resolve_token(|name| env::var(name).ok())
}

/// Picks the first non-empty token from `lookup`, trying [`TOKEN_ENV_VARS`] in order.
pub fn resolve_token<F>(lookup: F) -> AppResult<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| AppError::Config(format!("{} environment variable not set", TOKEN_ENV_VARS[0])))
}

/// Grade configuration
pub mod grades {
    /// Lowest accepted grade value
    pub const MIN_VALUE: i64 = 1;

    /// Highest accepted grade value
    pub const MAX_VALUE: i64 = 12;

    /// Grade type stored for grades entered through the bot
    pub const DEFAULT_TYPE: &str = "regular";

    /// Number of most recent grades shown by /view_grades
    pub const VIEW_LIMIT: usize = 20;
}

/// Limits for user-entered names
pub mod names {
    /// Maximum subject/term name length (in characters)
    pub const MAX_LEN: usize = 100;
}

/// Database configuration
pub mod database {
    use super::Duration;

    /// Maximum number of pooled SQLite connections
    pub const POOL_SIZE: u32 = 4;

    /// SQLite busy timeout (in seconds)
    pub const BUSY_TIMEOUT_SECS: u64 = 30;

    /// SQLite busy timeout duration
    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Must exceed the long-polling timeout teloxide uses
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_resolve_token_missing() {
        let result = resolve_token(lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_resolve_token_prefers_telegram_token() {
        let token = resolve_token(lookup_from(&[("TELEGRAM_TOKEN", "primary"), ("BOT_TOKEN", "fallback")])).unwrap();
        assert_eq!(token.expose_secret(), "primary");
    }

    #[test]
    fn test_resolve_token_skips_blank_values() {
        let token = resolve_token(lookup_from(&[("TELEGRAM_TOKEN", "  "), ("TELOXIDE_TOKEN", "123:abc")])).unwrap();
        assert_eq!(token.expose_secret(), "123:abc");
    }

    #[test]
    fn test_grade_bounds_are_ordered() {
        assert!(grades::MIN_VALUE < grades::MAX_VALUE);
    }
}
