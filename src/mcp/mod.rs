//! MCP server module
//!
//! Exposes the tracker over the Model Context Protocol.

mod server;

pub use server::SystemOsService;
