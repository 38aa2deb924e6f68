//! Kustomize overlay build + dry-run.

use std::path::{Path, PathBuf};

use kube_lint_core::parse::count_resources;
use kube_lint_core::paths::kustomize_dir;
use kube_lint_core::{CommandRunner, CommandSpec, RunOutcome, Timeouts};
use serde::Serialize;
use tracing::debug;

use crate::dryrun::{kubectl_dry_run, DryRunResult, ManifestSource};
use crate::stage::{outcome_from_run, StageOutcome};
use crate::verdict::Summary;

/// Result of building and dry-running an overlay.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KustomizeResult {
    pub path: PathBuf,
    pub build: StageOutcome,
    /// Non-empty documents in the build output.
    pub resource_count: usize,
    pub dry_run: DryRunResult,
}

impl KustomizeResult {
    pub fn summary(&self) -> Summary {
        Summary::from_outcomes([&self.build, &self.dry_run.client, &self.dry_run.server])
    }
}

/// `kubectl kustomize <dir>`, then a dry-run of the rendered output.
pub async fn validate_kustomization(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    path: &Path,
) -> KustomizeResult {
    let dir = kustomize_dir(path);
    let spec = CommandSpec::new(
        "kubectl",
        ["kustomize".to_string(), dir.to_string_lossy().to_string()],
        timeouts.kubectl,
    );
    debug!(command = %spec.display(), "Building kustomization");

    let run = runner.run(&spec).await;
    let failed = |build: StageOutcome| KustomizeResult {
        path: path.to_path_buf(),
        build,
        resource_count: 0,
        dry_run: DryRunResult::not_run(),
    };

    let rendered = match run {
        RunOutcome::Exited(out) if out.success() => out.stdout,
        other => return failed(outcome_from_run(&other, "kubectl")),
    };

    let resource_count = match count_resources(&rendered) {
        Ok(n) => n,
        Err(e) => {
            return failed(StageOutcome::failed(format!(
                "Failed to parse rendered YAML: {e}"
            )))
        }
    };

    let dry_run = kubectl_dry_run(
        runner,
        context,
        &ManifestSource::Stdin(rendered),
        timeouts.kubectl,
    )
    .await;

    KustomizeResult {
        path: path.to_path_buf(),
        build: StageOutcome::passed(),
        resource_count,
        dry_run,
    }
}
