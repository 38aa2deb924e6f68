//! kube-lint core library
//!
//! Building blocks shared by the validators and the MCP server: the process
//! runner, the kube context gate, collaborator output parsers, path helpers
//! and tracing setup.

pub mod config;
pub mod context;
pub mod error;
pub mod fakes;
pub mod parse;
pub mod paths;
pub mod process;
pub mod telemetry;

pub use config::Timeouts;
pub use context::{list_contexts, ContextGate, ContextListing, GateError, MIN_SELECT_DELAY};
pub use error::{KubeLintError, Result};
pub use process::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner, RunOutcome};
pub use telemetry::init_tracing;
