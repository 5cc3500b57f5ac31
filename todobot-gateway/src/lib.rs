//! TodoBot gateway library.
//!
//! The chat-platform collaborator for the task engine: a WebSocket
//! server where each connection identifies itself as one user and then
//! sends chat lines, plus the presentation layer that turns engine
//! outcomes into decorated replies. Exposed as a library so tests can
//! start the gateway in-process.

pub mod config;
pub mod render;
pub mod server;
