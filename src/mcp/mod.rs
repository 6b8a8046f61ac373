//! JSON-RPC 2.0 engine for the Model Context Protocol
//!
//! `server` routes MCP methods to the GitHub tools and resources; `rpc` builds
//! the response envelopes.

pub mod rpc;
pub mod server;
