//! `send_message` arguments and their validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::MAX_MESSAGE_LENGTH;

/// Validation failure carrying one or more human-readable reasons.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .reasons.join(", "))]
pub struct ValidationError {
    pub reasons: Vec<String>,
}

impl ValidationError {
    fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }
}

/// Formatting directive understood by the Bot API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    Markdown,
    MarkdownV2,
}

impl ParseMode {
    /// All accepted modes, in the order they are advertised.
    pub const ALL: [Self; 3] = [Self::Html, Self::Markdown, Self::MarkdownV2];

    /// Returns the literal the Bot API expects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Markdown => "Markdown",
            Self::MarkdownV2 => "MarkdownV2",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| invalid_parse_mode_reason(s))
    }
}

fn invalid_parse_mode_reason(received: &str) -> String {
    let expected = ParseMode::ALL
        .iter()
        .map(|mode| format!("'{mode}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("Invalid enum value. Expected {expected}, received '{received}'")
}

/// A validated `send_message` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// Message text, 1 to 4096 characters.
    pub message: String,

    /// Optional formatting directive.
    pub parse_mode: Option<ParseMode>,
}

impl SendMessageRequest {
    /// Validates raw tool arguments into a request.
    ///
    /// Every violation is collected, so a single error can report several reasons.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the message is missing, empty, too long,
    /// or `parse_mode` is not one of the accepted literals.
    pub fn validate(arguments: &Value) -> Result<Self, ValidationError> {
        let Some(fields) = arguments.as_object() else {
            return Err(ValidationError::new(vec![
                "Arguments must be an object".to_owned(),
            ]));
        };

        let mut reasons = Vec::new();

        let message = match fields.get("message") {
            None | Some(Value::Null) => {
                reasons.push("Message is required".to_owned());
                None
            }
            Some(Value::String(text)) => {
                let length = text.chars().count();
                if length == 0 {
                    reasons.push("Message cannot be empty".to_owned());
                } else if length > MAX_MESSAGE_LENGTH {
                    reasons.push(format!(
                        "Message exceeds Telegram's {MAX_MESSAGE_LENGTH} character limit"
                    ));
                }
                Some(text.clone())
            }
            Some(_) => {
                reasons.push("Message must be a string".to_owned());
                None
            }
        };

        let parse_mode = match fields.get("parse_mode") {
            None | Some(Value::Null) => None,
            Some(Value::String(mode)) => match mode.parse::<ParseMode>() {
                Ok(mode) => Some(mode),
                Err(reason) => {
                    reasons.push(reason);
                    None
                }
            },
            Some(other) => {
                reasons.push(invalid_parse_mode_reason(&other.to_string()));
                None
            }
        };

        match message {
            Some(message) if reasons.is_empty() => Ok(Self {
                message,
                parse_mode,
            }),
            _ => Err(ValidationError::new(reasons)),
        }
    }
}
