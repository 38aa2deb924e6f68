//! Typed tool arguments.
//!
//! Each struct is both the JSON schema advertised in `tools/list` and the
//! shape `tools/call` arguments are deserialized into.

use kube_lint_validators::{DEFAULT_KUBERNETES_VERSION, DEFAULT_RELEASE_NAME};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for tools that take no arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoInput {}

/// Input for selecting a kube context
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectKubeContextInput {
    /// Name of the kubectl context to use
    pub context: String,
}

/// Input for validating Flux manifests
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FluxDryrunInput {
    /// Path to YAML file or directory containing manifests
    pub path: String,
}

/// Input for validating a Kustomize overlay
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KustomizeDryrunInput {
    /// Path to directory containing kustomization.yaml or path to kustomization.yaml file
    pub path: String,
}

/// Input for validating a Helm chart
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HelmDryrunInput {
    /// Path to Helm chart directory
    pub chart_path: String,
    /// Path to values file
    #[serde(default)]
    pub values_file: Option<String>,
    /// Namespace for rendering
    #[serde(default)]
    pub namespace: Option<String>,
    /// Release name for helm template
    #[serde(default = "default_release_name")]
    pub release_name: String,
}

fn default_release_name() -> String {
    DEFAULT_RELEASE_NAME.to_string()
}

/// Input for offline schema validation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KubeconformValidateInput {
    /// Path to YAML file or directory containing manifests
    pub path: String,
    /// Kubernetes version for schema lookup (e.g. '1.29.0')
    #[serde(default = "default_kubernetes_version")]
    pub kubernetes_version: String,
    /// Reject additional properties not in the schema
    #[serde(default)]
    pub strict: bool,
}

fn default_kubernetes_version() -> String {
    DEFAULT_KUBERNETES_VERSION.to_string()
}

/// Input for YAML syntax validation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct YamlValidateInput {
    /// Path to YAML file or directory
    pub path: String,
}

/// Input for listing ArgoCD applications
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ArgocdAppListInput {
    /// Namespace holding the ArgoCD Application resources (auto-detected when omitted)
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Input for inspecting or diffing one ArgoCD application
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArgocdAppInput {
    /// Name of the ArgoCD application
    pub app_name: String,
    /// Namespace holding the ArgoCD Application resources (auto-detected when omitted)
    #[serde(default)]
    pub namespace: Option<String>,
}
