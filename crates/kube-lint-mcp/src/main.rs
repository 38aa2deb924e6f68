//! kube-lint-mcp - Kubernetes manifest validation over MCP
//!
//! Speaks newline-delimited JSON-RPC on stdin/stdout. Logs go to stderr.
//!
//! Subprocess timeouts can be overridden with `KUBE_LINT_KUBECTL_TIMEOUT`,
//! `KUBE_LINT_FLUX_TIMEOUT`, `KUBE_LINT_HELM_TIMEOUT`,
//! `KUBE_LINT_KUBECONFORM_TIMEOUT` and `KUBE_LINT_ARGOCD_TIMEOUT` (seconds).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kube_lint_core::{init_tracing, ProcessRunner, Timeouts};
use kube_lint_mcp::KubeLintServer;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "kube-lint-mcp")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server that validates Kubernetes manifests before commit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, env = "KUBE_LINT_VERBOSE")]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "KUBE_LINT_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let timeouts = Timeouts::from_env();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        kubectl_timeout_secs = timeouts.kubectl.as_secs(),
        "Starting kube-lint MCP server"
    );

    let server = KubeLintServer::new(Arc::new(ProcessRunner::new()), timeouts);
    server
        .serve_stdio()
        .await
        .context("MCP stdio transport failed")?;
    Ok(())
}
