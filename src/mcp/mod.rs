//! Model Context Protocol surface.
//!
//! Exposes the `send_message` tool over newline-delimited JSON-RPC on
//! stdin/stdout. Tool failures travel back as text results, never as
//! JSON-RPC errors.

mod gateway;
mod server;
pub mod types;

pub use gateway::{SEND_MESSAGE_TOOL, ToolGateway, ToolOutcome};
pub use server::{McpServer, SERVER_NAME};
pub use types::{Tool, ToolCallResult, ToolResultContent};
