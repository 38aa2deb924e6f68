//! kube-lint validators
//!
//! Provides the validation pipelines behind the MCP tools:
//! - Client and server dry-runs of plain manifests, Kustomize overlays and Helm charts
//! - Offline schema and YAML syntax checks
//! - Read-only ArgoCD application queries
//! - Plain-text reports ending in a commit verdict

pub mod argocd;
pub mod dryrun;
pub mod flux;
pub mod helm;
pub mod kubeconform;
pub mod kustomize;
pub mod report;
pub mod stage;
pub mod verdict;
pub mod yaml;

// Re-export key types
pub use argocd::{diff_app, get_app, list_apps, ArgoAppList, ArgoDiff};
pub use dryrun::{kubectl_dry_run, DryRunResult, ManifestSource};
pub use flux::{get_flux_status, run_flux_check, validate_manifests, FluxFileResult, FluxOutput};
pub use helm::{validate_helm_chart, HelmRequest, HelmResult, DEFAULT_RELEASE_NAME};
pub use kubeconform::{validate_schemas, KubeconformReport, DEFAULT_KUBERNETES_VERSION};
pub use kustomize::{validate_kustomization, KustomizeResult};
pub use stage::{Stage, StageOutcome};
pub use verdict::Summary;
pub use yaml::{validate_yaml, YamlFileResult, YamlReport};
