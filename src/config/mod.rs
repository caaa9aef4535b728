//! Configuration module for the MCP server.
//!
//! Handles loading and validation of the Telegram Bot API credentials
//! read from the process environment.

mod settings;

pub use settings::{API_BASE_URL_VAR, BOT_TOKEN_VAR, CHAT_ID_VAR, ConfigError, TelegramConfig};

/// Maximum message length accepted by the Telegram Bot API, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Public Telegram Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
