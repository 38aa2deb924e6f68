//! kube-lint MCP server
//!
//! Exposes manifest validation to MCP clients over stdio:
//! - Explicit, human-confirmed kube context selection per session
//! - Dry-run, schema and syntax validation tools
//! - Read-only Flux and ArgoCD status tools

mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

// Re-export key types
pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use server::{KubeLintServer, Session, SERVER_NAME};
pub use tools::{ArgumentError, ToolCall, ToolName};
