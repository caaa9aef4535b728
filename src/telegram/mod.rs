//! Telegram Bot API module.
//!
//! Validates `send_message` arguments, delivers them to the configured
//! chat via `sendMessage`, and turns the Bot API's answer into either a
//! confirmation string or a typed error.

mod client;
mod request;
mod transport;

pub use client::{TelegramClient, TelegramError};
pub use request::{ParseMode, SendMessageRequest, ValidationError};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};

#[cfg(test)]
pub(crate) use client::tests::{FakeTransport, test_config};
