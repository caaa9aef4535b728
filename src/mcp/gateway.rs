//! Tool gateway: the `send_message` capability and its dispatch.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::types::{Tool, ToolCallResult};
use crate::config::MAX_MESSAGE_LENGTH;
use crate::telegram::{
    ParseMode, SendMessageRequest, TelegramClient, TelegramError, ValidationError,
};

/// Name of the only tool this server exposes.
pub const SEND_MESSAGE_TOOL: &str = "send_message";

/// Internal outcome of a tool invocation, before it is flattened to protocol text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Message delivered; carries the confirmation text.
    Sent(String),

    /// The requested tool does not exist.
    UnknownTool(String),

    /// Arguments failed validation.
    InvalidInput(ValidationError),

    /// Telegram rejected the message or could not be reached.
    Failed(TelegramError),
}

impl ToolOutcome {
    /// Returns true when the outcome should be flagged as a tool error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Failed(_))
    }

    /// Renders the single text line returned to the client.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Sent(confirmation) => confirmation.clone(),
            Self::UnknownTool(name) => format!("Unknown tool: {name}"),
            Self::InvalidInput(err) => format!("Invalid input: {err}"),
            Self::Failed(err) => format!("Error: {err}"),
        }
    }
}

impl From<ToolOutcome> for ToolCallResult {
    fn from(outcome: ToolOutcome) -> Self {
        if outcome.is_error() {
            Self::error_text(outcome.text())
        } else {
            Self::text(outcome.text())
        }
    }
}

/// Bridges MCP tool calls to the Telegram client.
#[derive(Debug, Clone)]
pub struct ToolGateway {
    client: TelegramClient,
}

impl ToolGateway {
    /// Creates a new gateway around a configured client.
    #[must_use]
    pub const fn new(client: TelegramClient) -> Self {
        Self { client }
    }

    /// Returns the static tool descriptors.
    #[must_use]
    pub fn list_tools() -> Vec<Tool> {
        let parse_modes = ParseMode::ALL.map(ParseMode::as_str);

        vec![Tool {
            name: SEND_MESSAGE_TOOL.to_owned(),
            description: "Send a text message to the configured Telegram chat".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": format!(
                            "The message text to send (max {MAX_MESSAGE_LENGTH} characters)"
                        ),
                        "minLength": 1,
                        "maxLength": MAX_MESSAGE_LENGTH
                    },
                    "parse_mode": {
                        "type": "string",
                        "enum": parse_modes,
                        "description": "Optional formatting mode for the message text"
                    }
                },
                "required": ["message"]
            }),
        }]
    }

    /// Invokes a tool and returns the protocol-level result. Never fails.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> ToolCallResult {
        self.dispatch(name, arguments).await.into()
    }

    /// Invokes a tool and returns the typed outcome.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolOutcome {
        debug!("Tool call: {}", name);

        if name != SEND_MESSAGE_TOOL {
            warn!("Unknown tool requested: {}", name);
            return ToolOutcome::UnknownTool(name.to_owned());
        }

        let request = match SendMessageRequest::validate(arguments) {
            Ok(request) => request,
            Err(err) => {
                info!("Rejected send_message arguments: {}", err);
                return ToolOutcome::InvalidInput(err);
            }
        };

        match self.client.send(&request).await {
            Ok(confirmation) => ToolOutcome::Sent(confirmation),
            Err(err) => ToolOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::telegram::{FakeTransport, TransportError, test_config};

    fn gateway_with(fake: std::sync::Arc<FakeTransport>) -> ToolGateway {
        ToolGateway::new(TelegramClient::with_transport(test_config(), fake))
    }

    #[test]
    fn test_list_tools_descriptor() {
        let tools = ToolGateway::list_tools();
        assert_eq!(tools.len(), 1);

        let tool = &tools[0];
        assert_eq!(tool.name, "send_message");
        assert_eq!(tool.input_schema["required"], json!(["message"]));
        assert_eq!(tool.input_schema["properties"]["message"]["maxLength"], json!(4096));
        assert_eq!(
            tool.input_schema["properties"]["parse_mode"]["enum"],
            json!(["HTML", "Markdown", "MarkdownV2"])
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let fake =
            FakeTransport::replying(200, json!({ "ok": true, "result": { "message_id": 1 } }));
        let gateway = gateway_with(fake.clone());

        let result = gateway.invoke("delete_message", &json!({})).await;
        assert_eq!(result.first_text(), Some("Unknown tool: delete_message"));
        assert_eq!(result.is_error, None);
        assert!(fake.requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_successful_send() {
        let fake =
            FakeTransport::replying(200, json!({ "ok": true, "result": { "message_id": 42 } }));
        let gateway = gateway_with(fake);

        let result = gateway
            .invoke("send_message", &json!({ "message": "Hello" }))
            .await;
        assert_eq!(
            result.first_text(),
            Some("Message sent successfully to Telegram. Message ID: 42")
        );
        assert_eq!(result.is_error, None);
    }

    #[tokio::test]
    async fn test_validation_failure_rendered() {
        let fake =
            FakeTransport::replying(200, json!({ "ok": true, "result": { "message_id": 1 } }));
        let gateway = gateway_with(fake.clone());

        let result = gateway
            .invoke("send_message", &json!({ "message": "" }))
            .await;
        assert_eq!(result.first_text(), Some("Invalid input: Message cannot be empty"));
        assert_eq!(result.is_error, Some(true));
        assert!(fake.requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_error_rendered() {
        let fake = FakeTransport::replying(
            400,
            json!({ "ok": false, "description": "Bad Request: chat not found" }),
        );
        let gateway = gateway_with(fake);

        let result = gateway
            .invoke("send_message", &json!({ "message": "Hello" }))
            .await;
        assert_eq!(
            result.first_text(),
            Some("Error: Failed to send Telegram message: Bad Request: chat not found")
        );
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_transport_error_rendered() {
        let fake = FakeTransport::scripted(Err(TransportError(
            "HTTP request failed: connection refused".to_owned(),
        )));
        let gateway = gateway_with(fake);

        let outcome = gateway
            .dispatch("send_message", &json!({ "message": "Hello" }))
            .await;
        assert!(matches!(outcome, ToolOutcome::Failed(TelegramError::Transport(_))));

        let result = ToolCallResult::from(outcome);
        assert_eq!(
            result.first_text(),
            Some("Error: HTTP request failed: connection refused")
        );
        assert_eq!(result.content.len(), 1);
    }
}
