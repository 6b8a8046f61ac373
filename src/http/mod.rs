//! HTTP transport for the Model Context Protocol
//!
//! Route handlers plus the response header middleware.

pub mod handlers;
pub mod headers;
