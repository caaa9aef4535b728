//! Telegram credentials loaded from the environment.

use std::fmt;

use thiserror::Error;

use super::DEFAULT_API_BASE_URL;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the destination chat id.
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Optional environment variable overriding the Bot API base URL.
pub const API_BASE_URL_VAR: &str = "TELEGRAM_API_BASE_URL";

/// Telegram Bot API configuration.
///
/// Built once at startup and shared read-only with the sender.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`, embedded in the endpoint path.
    pub bot_token: String,

    /// Destination chat identifier sent as `chat_id`.
    pub chat_id: String,

    /// Base URL of the Bot API, without trailing slash.
    pub api_base_url: String,
}

impl TelegramConfig {
    /// Creates a new configuration against the public Bot API.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is blank.
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self, ConfigError> {
        let bot_token = require_non_empty(BOT_TOKEN_VAR, bot_token)?;
        let chat_id = require_non_empty(CHAT_ID_VAR, chat_id)?;

        Ok(Self {
            bot_token,
            chat_id,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
        })
    }

    /// Replaces the Bot API base URL (self-hosted Bot API servers, test doubles).
    #[must_use]
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = normalize_base_url(&base_url.into());
        self
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup(BOT_TOKEN_VAR).ok_or(ConfigError::MissingEnvVar(BOT_TOKEN_VAR))?;
        let chat_id = lookup(CHAT_ID_VAR).ok_or(ConfigError::MissingEnvVar(CHAT_ID_VAR))?;

        let config = Self::new(&bot_token, &chat_id)?;

        Ok(match lookup(API_BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            Some(url) => config.with_api_base_url(url),
            None => config,
        })
    }

    /// Returns the `sendMessage` endpoint for the configured bot.
    #[must_use]
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token)
    }

    /// Returns the bot token with everything but the last 4 characters hidden.
    #[must_use]
    pub fn masked_token(&self) -> String {
        mask_token(&self.bot_token)
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.masked_token())
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn require_non_empty(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyEnvVar(var));
    }
    Ok(trimmed.to_owned())
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

/// Masks a token for logging (shows last 4 characters).
fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count > 4 {
        let tail: String = token.chars().skip(count - 4).collect();
        format!("***{tail}")
    } else {
        "****".to_owned()
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Environment variable {0} must not be empty")]
    EmptyEnvVar(&'static str),
}
