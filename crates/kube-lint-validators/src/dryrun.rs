//! kubectl client + server dry-run pair.

use std::path::PathBuf;
use std::time::Duration;

use kube_lint_core::parse::parse_warnings;
use kube_lint_core::{CommandRunner, CommandSpec, RunOutcome};
use serde::Serialize;
use tracing::{debug, warn};

use crate::stage::{outcome_from_run, StageOutcome};

/// What `kubectl apply -f` reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    File(PathBuf),
    /// Rendered YAML piped through `-f -`.
    Stdin(String),
}

/// Outcome of the client and server dry-runs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DryRunResult {
    pub client: StageOutcome,
    /// Carries any warnings; `NotRun` when the client dry-run failed.
    pub server: StageOutcome,
}

impl DryRunResult {
    /// Both stages skipped because an earlier step failed.
    pub fn not_run() -> Self {
        Self {
            client: StageOutcome::NotRun,
            server: StageOutcome::NotRun,
        }
    }

    pub fn passed(&self) -> bool {
        self.client.is_passed() && self.server.is_passed()
    }
}

fn dry_run_spec(
    context: &str,
    mode: &str,
    source: &ManifestSource,
    timeout: Duration,
) -> CommandSpec {
    let file_arg = match source {
        ManifestSource::File(path) => path.to_string_lossy().to_string(),
        ManifestSource::Stdin(_) => "-".to_string(),
    };
    let spec = CommandSpec::new(
        "kubectl",
        [
            "--context".to_string(),
            context.to_string(),
            "apply".to_string(),
            format!("--dry-run={mode}"),
            "-f".to_string(),
            file_arg,
        ],
        timeout,
    );
    match source {
        ManifestSource::Stdin(data) => spec.with_stdin(data.clone()),
        ManifestSource::File(_) => spec,
    }
}

/// Run the client dry-run, then the server dry-run if the client passed.
pub async fn kubectl_dry_run(
    runner: &dyn CommandRunner,
    context: &str,
    source: &ManifestSource,
    timeout: Duration,
) -> DryRunResult {
    let client_spec = dry_run_spec(context, "client", source, timeout);
    debug!(command = %client_spec.display(), "Running client dry-run");
    let client = outcome_from_run(&runner.run(&client_spec).await, "kubectl");
    if !client.is_passed() {
        debug!(error = ?client.error(), "Client dry-run failed");
        return DryRunResult {
            client,
            server: StageOutcome::NotRun,
        };
    }

    let server_spec = dry_run_spec(context, "server", source, timeout);
    debug!(command = %server_spec.display(), "Running server dry-run");
    let run = runner.run(&server_spec).await;
    let server = match (&run, outcome_from_run(&run, "kubectl")) {
        (RunOutcome::Exited(out), StageOutcome::Passed { .. }) => {
            let warnings = parse_warnings(&out.combined());
            if !warnings.is_empty() {
                warn!(count = warnings.len(), "Server dry-run reported warnings");
            }
            StageOutcome::Passed { warnings }
        }
        (_, outcome) => outcome,
    };

    DryRunResult { client, server }
}
