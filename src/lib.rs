//! Telegram MCP Server Library
//!
//! A Model Context Protocol server that sends messages to a Telegram chat.
//!
//! This crate provides the core functionality for:
//! - Loading the bot token and chat id from the environment
//! - Validating `send_message` arguments
//! - Delivering messages through the Telegram Bot API
//! - Serving the tool over JSON-RPC on stdin/stdout

pub mod config;
pub mod mcp;
pub mod telegram;
