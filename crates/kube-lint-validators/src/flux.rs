//! FluxCD manifest dry-runs and Flux health queries.

use std::path::{Path, PathBuf};

use kube_lint_core::paths::find_yaml_files_recursive;
use kube_lint_core::{CommandRunner, CommandSpec, Timeouts};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dryrun::{kubectl_dry_run, DryRunResult, ManifestSource};

/// Dry-run outcome for one manifest file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FluxFileResult {
    pub file: PathBuf,
    pub dry_run: DryRunResult,
}

/// Dry-run every YAML file under `path`, one after another.
///
/// Returns an empty list when `path` holds no YAML files.
pub async fn validate_manifests(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    path: &Path,
) -> Vec<FluxFileResult> {
    let files = find_yaml_files_recursive(path);
    debug!(path = %path.display(), count = files.len(), "Validating Flux manifests");

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let source = ManifestSource::File(file.clone());
        let dry_run = kubectl_dry_run(runner, context, &source, timeouts.kubectl).await;
        if let Some(error) = dry_run.client.error() {
            warn!(file = %file.display(), error, "Client dry-run failed");
        } else if let Some(error) = dry_run.server.error() {
            warn!(file = %file.display(), error, "Server dry-run failed");
        }
        results.push(FluxFileResult { file, dry_run });
    }
    results
}

/// Pass-through result of a `flux` query.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FluxOutput {
    pub success: bool,
    /// Combined, trimmed stdout and stderr, or the tooling error.
    pub output: String,
}

async fn run_flux(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    args: &[&str],
    what: &str,
) -> FluxOutput {
    let spec = CommandSpec::new(
        "flux",
        ["--context", context]
            .into_iter()
            .chain(args.iter().copied()),
        timeouts.flux,
    );
    debug!(command = %spec.display(), "Running flux");

    match runner
        .run(&spec)
        .await
        .into_exited(what)
        .map_err(|e| e.describe_missing("flux CLI", None))
    {
        Ok(out) => FluxOutput {
            success: out.success(),
            output: out.combined().trim().to_string(),
        },
        Err(e) => {
            warn!(error = %e, "flux invocation failed");
            FluxOutput {
                success: false,
                output: e.to_string(),
            }
        }
    }
}

/// `flux check`: installation and controller health.
pub async fn run_flux_check(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
) -> FluxOutput {
    run_flux(runner, timeouts, context, &["check"], "flux check").await
}

/// `flux get all -A`: reconciliation status across namespaces.
pub async fn get_flux_status(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
) -> FluxOutput {
    run_flux(runner, timeouts, context, &["get", "all", "-A"], "flux get all").await
}
