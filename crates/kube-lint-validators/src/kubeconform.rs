//! Offline schema validation with kubeconform.

use std::path::{Path, PathBuf};

use kube_lint_core::parse::{parse_kubeconform_output, KubeconformResource, ResourceStatus};
use kube_lint_core::{CommandRunner, CommandSpec, Result, Timeouts};
use serde::Serialize;
use tracing::{debug, warn};

pub const DEFAULT_KUBERNETES_VERSION: &str = "master";
const INSTALL_URL: &str = "https://github.com/yannh/kubeconform";

/// Per-resource results with status tallies.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KubeconformReport {
    pub path: PathBuf,
    pub resources: Vec<KubeconformResource>,
    pub valid: usize,
    pub invalid: usize,
    pub errors: usize,
    pub skipped: usize,
    /// Set when kubeconform exited non-zero without reporting a failing
    /// resource (bad flags, schema download errors).
    pub failure: Option<String>,
}

impl KubeconformReport {
    pub fn new(path: impl Into<PathBuf>, resources: Vec<KubeconformResource>) -> Self {
        let count = |status: ResourceStatus| resources.iter().filter(|r| r.status == status).count();
        Self {
            path: path.into(),
            valid: count(ResourceStatus::Valid),
            invalid: count(ResourceStatus::Invalid),
            errors: count(ResourceStatus::Error),
            skipped: count(ResourceStatus::Skipped),
            resources,
            failure: None,
        }
    }

    /// Skipped resources never block a commit.
    pub fn passed(&self) -> bool {
        self.failure.is_none() && self.invalid == 0 && self.errors == 0
    }
}

fn kubeconform_args(path: &Path, kubernetes_version: &str, strict: bool) -> Vec<String> {
    let mut args: Vec<String> = ["-output", "json", "-summary", "-ignore-missing-schemas"]
        .into_iter()
        .map(String::from)
        .collect();
    if kubernetes_version != DEFAULT_KUBERNETES_VERSION {
        args.extend(["-kubernetes-version".to_string(), kubernetes_version.to_string()]);
    }
    if strict {
        args.push("-strict".to_string());
    }
    args.push(path.to_string_lossy().to_string());
    args
}

/// Run kubeconform once over `path`.
///
/// A non-zero exit is expected when resources are invalid. One that comes
/// with no invalid or errored resource is kept on the report as a failure.
/// Only a missing binary or a timeout is an error.
pub async fn validate_schemas(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    path: &Path,
    kubernetes_version: &str,
    strict: bool,
) -> Result<KubeconformReport> {
    let spec = CommandSpec::new(
        "kubeconform",
        kubeconform_args(path, kubernetes_version, strict),
        timeouts.kubeconform,
    );
    debug!(command = %spec.display(), "Running kubeconform");

    let out = runner
        .run(&spec)
        .await
        .into_exited("kubeconform")
        .map_err(|e| e.describe_missing("kubeconform", Some(INSTALL_URL)))?;

    let mut report = KubeconformReport::new(path, parse_kubeconform_output(&out.stdout));
    if !out.success() && report.invalid == 0 && report.errors == 0 {
        warn!(exit_code = out.exit_code, "kubeconform failed without reporting a resource");
        report.failure = Some(format!(
            "kubeconform exited with code {}: {}",
            out.exit_code,
            out.error_text()
        ));
    }
    debug!(
        valid = report.valid,
        invalid = report.invalid,
        errors = report.errors,
        skipped = report.skipped,
        "kubeconform finished"
    );
    Ok(report)
}
