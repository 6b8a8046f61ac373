//! GitHub workflows and their MCP tool and resource bindings

pub mod operations;
pub mod resources;
pub mod tools;
pub mod utils;
