//! Helm chart lint + render + dry-run.

use std::path::{Path, PathBuf};

use kube_lint_core::parse::count_resources;
use kube_lint_core::paths::is_helm_chart;
use kube_lint_core::{CommandRunner, CommandSpec, RunOutcome, Timeouts};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dryrun::{kubectl_dry_run, DryRunResult, ManifestSource};
use crate::stage::{outcome_from_run, StageOutcome};
use crate::verdict::Summary;

pub const DEFAULT_RELEASE_NAME: &str = "release-name";

/// Inputs for a chart validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmRequest {
    pub chart_path: PathBuf,
    pub values_file: Option<PathBuf>,
    pub namespace: Option<String>,
    pub release_name: String,
}

impl HelmRequest {
    pub fn new(chart_path: impl Into<PathBuf>) -> Self {
        Self {
            chart_path: chart_path.into(),
            values_file: None,
            namespace: None,
            release_name: DEFAULT_RELEASE_NAME.to_string(),
        }
    }

    fn lint_args(&self) -> Vec<String> {
        let mut args = vec!["lint".to_string(), self.chart_path.to_string_lossy().to_string()];
        if let Some(values) = &self.values_file {
            args.extend(["-f".to_string(), values.to_string_lossy().to_string()]);
        }
        args
    }

    fn template_args(&self) -> Vec<String> {
        let mut args = vec![
            "template".to_string(),
            self.release_name.clone(),
            self.chart_path.to_string_lossy().to_string(),
        ];
        if let Some(values) = &self.values_file {
            args.extend(["-f".to_string(), values.to_string_lossy().to_string()]);
        }
        if let Some(ns) = &self.namespace {
            args.extend(["--namespace".to_string(), ns.clone()]);
        }
        args
    }
}

/// Result of validating a chart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HelmResult {
    pub chart_path: PathBuf,
    pub lint: StageOutcome,
    pub render: StageOutcome,
    /// Non-empty documents in the rendered output.
    pub resource_count: usize,
    pub dry_run: DryRunResult,
}

impl HelmResult {
    fn stopped_at_lint(chart_path: &Path, lint: StageOutcome) -> Self {
        Self {
            chart_path: chart_path.to_path_buf(),
            lint,
            render: StageOutcome::NotRun,
            resource_count: 0,
            dry_run: DryRunResult::not_run(),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::from_outcomes([
            &self.lint,
            &self.render,
            &self.dry_run.client,
            &self.dry_run.server,
        ])
    }
}

/// `helm lint`, `helm template`, then a dry-run of the rendered manifests.
///
/// Each step runs only if the previous one passed.
pub async fn validate_helm_chart(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    request: &HelmRequest,
) -> HelmResult {
    let chart = request.chart_path.as_path();
    if !is_helm_chart(chart) {
        return HelmResult::stopped_at_lint(
            chart,
            StageOutcome::failed("Path is not a Helm chart (missing Chart.yaml)"),
        );
    }

    let lint_spec = CommandSpec::new("helm", request.lint_args(), timeouts.helm);
    debug!(command = %lint_spec.display(), "Running helm lint");
    let lint = outcome_from_run(&runner.run(&lint_spec).await, "helm");
    if !lint.is_passed() {
        warn!(chart = %chart.display(), error = ?lint.error(), "helm lint failed");
        return HelmResult::stopped_at_lint(chart, lint);
    }

    let render_spec = CommandSpec::new("helm", request.template_args(), timeouts.helm);
    debug!(command = %render_spec.display(), "Running helm template");
    let rendered = match runner.run(&render_spec).await {
        RunOutcome::Exited(out) if out.success() => out.stdout,
        other => {
            return HelmResult {
                render: outcome_from_run(&other, "helm"),
                ..HelmResult::stopped_at_lint(chart, lint)
            }
        }
    };

    let resource_count = match count_resources(&rendered) {
        Ok(n) => n,
        Err(e) => {
            return HelmResult {
                render: StageOutcome::failed(format!("Failed to parse rendered YAML: {e}")),
                ..HelmResult::stopped_at_lint(chart, lint)
            }
        }
    };

    let dry_run = kubectl_dry_run(
        runner,
        context,
        &ManifestSource::Stdin(rendered),
        timeouts.kubectl,
    )
    .await;

    HelmResult {
        chart_path: chart.to_path_buf(),
        lint,
        render: StageOutcome::passed(),
        resource_count,
        dry_run,
    }
}
