//! MCP (Model Context Protocol) server implementation: JSON-RPC 2.0 over
//! stdio, protocol version 2025-06-18, tools capability only.

#[cfg(test)]
mod tests;

pub mod protocol;
pub mod server;
pub mod tools;
