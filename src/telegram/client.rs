//! Telegram Bot API client for sending chat messages.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::request::{ParseMode, SendMessageRequest};
use super::transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
use crate::config::TelegramConfig;

/// Errors that can occur while delivering a message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelegramError {
    /// The Bot API answered, but refused the request.
    #[error("Failed to send Telegram message: {0}")]
    RemoteApi(String),

    /// The Bot API could not be reached or its answer could not be read.
    #[error("{0}")]
    Transport(String),
}

impl From<TransportError> for TelegramError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err.0)
    }
}

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

/// High-level Bot API client bound to a single destination chat.
#[derive(Clone)]
pub struct TelegramClient {
    /// Immutable credentials and endpoint.
    config: Arc<TelegramConfig>,

    /// Outbound HTTP transport.
    transport: Arc<dyn HttpTransport>,
}

impl TelegramClient {
    /// Creates a client that talks to the Bot API over `reqwest`.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Creates a client with a custom transport.
    #[must_use]
    pub fn with_transport(config: TelegramConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Sends a validated request to the configured chat.
    ///
    /// Returns the human-readable confirmation on success. One HTTP call,
    /// no retries.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::RemoteApi`] if Telegram rejects the message and
    /// [`TelegramError::Transport`] if it cannot be reached or understood.
    pub async fn send(&self, request: &SendMessageRequest) -> Result<String, TelegramError> {
        let body = SendMessageBody {
            chat_id: &self.config.chat_id,
            text: &request.message,
            parse_mode: request.parse_mode,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| TelegramError::Transport(format!("Failed to encode request: {e}")))?;

        info!(
            "Sending message to chat {}: \"{}\"",
            self.config.chat_id,
            truncate_for_log(&request.message, 30)
        );

        let response = self
            .transport
            .post_json(&self.config.send_message_url(), &body)
            .await
            .inspect_err(|e| warn!("Transport failure talking to Telegram: {}", e))?;

        let message_id = interpret_response(&response)?;
        info!("Message sent, id: {}", message_id);

        Ok(format!(
            "Message sent successfully to Telegram. Message ID: {message_id}"
        ))
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Maps a raw Bot API response onto the sent message id or an error.
fn interpret_response(response: &HttpResponse) -> Result<i64, TelegramError> {
    let parsed = serde_json::from_str::<Value>(&response.body);

    if !response.is_success() {
        let description = parsed
            .ok()
            .as_ref()
            .and_then(description_of)
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        warn!("Telegram rejected message: {}", description);
        return Err(TelegramError::RemoteApi(description));
    }

    let json = parsed.map_err(|e| {
        TelegramError::Transport(format!("Failed to parse Telegram response: {e}"))
    })?;

    if json.get("ok").and_then(Value::as_bool) != Some(true) {
        let description = description_of(&json).unwrap_or_else(|| "Unknown error".to_owned());
        warn!("Telegram returned ok=false: {}", description);
        return Err(TelegramError::RemoteApi(description));
    }

    debug!("Telegram accepted message");

    json.pointer("/result/message_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            TelegramError::Transport(
                "Telegram response did not include result.message_id".to_owned(),
            )
        })
}

fn description_of(json: &Value) -> Option<String> {
    json.get("description")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Scripted transport that records every request it receives.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        pub(crate) requests: Mutex<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        pub(crate) fn replying(status: u16, body: Value) -> Arc<Self> {
            Self::scripted(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }))
        }

        pub(crate) fn scripted(response: Result<HttpResponse, TransportError>) -> Arc<Self> {
            let fake = Self::default();
            fake.responses.try_lock().unwrap().push_back(response);
            Arc::new(fake)
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn post_json(
            &self,
            url: &str,
            body: &Value,
        ) -> Result<HttpResponse, TransportError> {
            self.requests
                .lock()
                .await
                .push((url.to_owned(), body.clone()));
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted response".to_owned())))
        }
    }

    pub(crate) fn test_config() -> TelegramConfig {
        TelegramConfig::new("123:ABC", "-100777").unwrap()
    }

    fn request(message: &str, parse_mode: Option<ParseMode>) -> SendMessageRequest {
        SendMessageRequest {
            message: message.to_owned(),
            parse_mode,
        }
    }

    #[tokio::test]
    async fn test_send_success() {
        let fake =
            FakeTransport::replying(200, json!({ "ok": true, "result": { "message_id": 42 } }));
        let client = TelegramClient::with_transport(test_config(), fake.clone());

        let reply = client.send(&request("Hello", None)).await.unwrap();
        assert_eq!(reply, "Message sent successfully to Telegram. Message ID: 42");

        let requests = fake.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://api.telegram.org/bot123:ABC/sendMessage");
        assert_eq!(requests[0].1, json!({ "chat_id": "-100777", "text": "Hello" }));
    }

    #[tokio::test]
    async fn test_send_includes_parse_mode() {
        let fake =
            FakeTransport::replying(200, json!({ "ok": true, "result": { "message_id": 7 } }));
        let client = TelegramClient::with_transport(test_config(), fake.clone());

        client
            .send(&request("<b>bold</b>", Some(ParseMode::Html)))
            .await
            .unwrap();

        let requests = fake.requests.lock().await;
        assert_eq!(requests[0].1["parse_mode"], json!("HTML"));
    }

    #[tokio::test]
    async fn test_send_ok_false_with_description() {
        let fake = FakeTransport::replying(
            400,
            json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }),
        );
        let client = TelegramClient::with_transport(test_config(), fake);

        let err = client.send(&request("Hello", None)).await.unwrap_err();
        assert_eq!(
            err,
            TelegramError::RemoteApi("Bad Request: chat not found".to_owned())
        );
        assert!(err.to_string().contains("Bad Request: chat not found"));
    }

    #[tokio::test]
    async fn test_send_ok_false_on_success_status() {
        let fake = FakeTransport::replying(200, json!({ "ok": false }));
        let client = TelegramClient::with_transport(test_config(), fake);

        let err = client.send(&request("Hello", None)).await.unwrap_err();
        assert_eq!(err, TelegramError::RemoteApi("Unknown error".to_owned()));
    }

    #[tokio::test]
    async fn test_send_http_error_without_body() {
        let fake = FakeTransport::scripted(Ok(HttpResponse {
            status: 502,
            body: "<html>Bad Gateway</html>".to_owned(),
        }));
        let client = TelegramClient::with_transport(test_config(), fake);

        let err = client.send(&request("Hello", None)).await.unwrap_err();
        assert_eq!(err, TelegramError::RemoteApi("HTTP 502".to_owned()));
    }

    #[tokio::test]
    async fn test_send_malformed_body_is_transport_error() {
        let fake = FakeTransport::scripted(Ok(HttpResponse {
            status: 200,
            body: "not json".to_owned(),
        }));
        let client = TelegramClient::with_transport(test_config(), fake);

        let err = client.send(&request("Hello", None)).await.unwrap_err();
        assert!(
            matches!(err, TelegramError::Transport(ref msg) if msg.starts_with("Failed to parse"))
        );
    }

    #[tokio::test]
    async fn test_send_missing_message_id() {
        let fake = FakeTransport::replying(200, json!({ "ok": true, "result": {} }));
        let client = TelegramClient::with_transport(test_config(), fake);

        let err = client.send(&request("Hello", None)).await.unwrap_err();
        assert!(matches!(err, TelegramError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_connection_failure() {
        let fake = FakeTransport::scripted(Err(TransportError(
            "HTTP request failed: connection refused".to_owned(),
        )));
        let client = TelegramClient::with_transport(test_config(), fake);

        let err = client.send(&request("Hello", None)).await.unwrap_err();
        assert_eq!(
            err,
            TelegramError::Transport("HTTP request failed: connection refused".to_owned())
        );
    }

    #[tokio::test]
    async fn test_send_against_mock_bot_api() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:ABC/sendMessage"))
            .and(body_json(json!({
                "chat_id": "-100777",
                "text": "*hi*",
                "parse_mode": "MarkdownV2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": { "message_id": 1001, "chat": { "id": -100_777 } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config().with_api_base_url(server.uri());
        let client = TelegramClient::new(config);

        let reply = client
            .send(&request("*hi*", Some(ParseMode::MarkdownV2)))
            .await
            .unwrap();
        assert_eq!(reply, "Message sent successfully to Telegram. Message ID: 1001");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("Hello", 10), "Hello");
        assert_eq!(truncate_for_log("Hello, World!", 5), "Hello...");
    }
}
