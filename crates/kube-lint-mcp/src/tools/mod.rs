//! Tool catalogue and argument parsing.
//!
//! Every tool the server answers is a [`ToolName`]; a `tools/call` is turned
//! into a fully-typed [`ToolCall`] before any handler runs.

pub mod inputs;

use std::path::PathBuf;

use kube_lint_core::paths::normalize_path;
use kube_lint_validators::{HelmRequest, DEFAULT_KUBERNETES_VERSION};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

pub use inputs::*;

/// Tools exposed over MCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ListKubeContexts,
    SelectKubeContext,
    FluxDryrun,
    FluxCheck,
    FluxStatus,
    KustomizeDryrun,
    HelmDryrun,
    KubeconformValidate,
    YamlValidate,
    ArgocdAppList,
    ArgocdAppGet,
    ArgocdAppDiff,
}

impl ToolName {
    pub const ALL: [ToolName; 12] = [
        ToolName::SelectKubeContext,
        ToolName::ListKubeContexts,
        ToolName::FluxDryrun,
        ToolName::FluxCheck,
        ToolName::FluxStatus,
        ToolName::KustomizeDryrun,
        ToolName::HelmDryrun,
        ToolName::KubeconformValidate,
        ToolName::YamlValidate,
        ToolName::ArgocdAppList,
        ToolName::ArgocdAppGet,
        ToolName::ArgocdAppDiff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListKubeContexts => "list_kube_contexts",
            ToolName::SelectKubeContext => "select_kube_context",
            ToolName::FluxDryrun => "flux_dryrun",
            ToolName::FluxCheck => "flux_check",
            ToolName::FluxStatus => "flux_status",
            ToolName::KustomizeDryrun => "kustomize_dryrun",
            ToolName::HelmDryrun => "helm_dryrun",
            ToolName::KubeconformValidate => "kubeconform_validate",
            ToolName::YamlValidate => "yaml_validate",
            ToolName::ArgocdAppList => "argocd_app_list",
            ToolName::ArgocdAppGet => "argocd_app_get",
            ToolName::ArgocdAppDiff => "argocd_app_diff",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Whether the tool talks to a cluster and so needs a selected context.
    pub fn requires_context(&self) -> bool {
        !matches!(
            self,
            ToolName::ListKubeContexts
                | ToolName::SelectKubeContext
                | ToolName::KubeconformValidate
                | ToolName::YamlValidate
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::SelectKubeContext => {
                "Select the Kubernetes context for all subsequent operations.\n\
                 MUST be called before using any other tool.\n\
                 Does NOT mutate global kubeconfig - context is held in memory only.\n\
                 IMPORTANT: Do NOT call this automatically.\n\
                 Always list contexts first and ask the user which context to use."
            }
            ToolName::ListKubeContexts => {
                "List available kubectl contexts.\n\
                 Use this to see available contexts, then ALWAYS present the list\n\
                 to the user and ask them which context they want to use before\n\
                 calling select_kube_context.\n\
                 NEVER automatically select a context without user confirmation."
            }
            ToolName::FluxDryrun => {
                "Validate FluxCD manifests with kubectl dry-run (client + server).\n\
                 ALWAYS use this before committing Flux YAML files\n\
                 to prevent GitOps reconciliation failures.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::FluxCheck => {
                "Run 'flux check' to verify Flux installation and components health.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::FluxStatus => {
                "Get Flux reconciliation status for all resources across namespaces.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::KustomizeDryrun => {
                "Validate Kustomize overlay by building and running kubectl dry-run\n\
                 (client + server).\n\
                 ALWAYS use this before committing Kustomize overlay changes\n\
                 to prevent deployment failures.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::HelmDryrun => {
                "Validate Helm chart by rendering and running kubectl dry-run\n\
                 (client + server).\n\
                 ALWAYS use this before committing Helm chart changes\n\
                 to prevent deployment failures.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::KubeconformValidate => {
                "Validate Kubernetes manifests against JSON schemas offline\n\
                 using kubeconform. Catches invalid fields, type mismatches,\n\
                 and missing required fields without a live cluster.\n\
                 Does NOT require select_kube_context."
            }
            ToolName::YamlValidate => {
                "Check YAML files for syntax errors, duplicate keys and tab\n\
                 indentation. Runs locally without any external tools.\n\
                 Does NOT require select_kube_context."
            }
            ToolName::ArgocdAppList => {
                "List ArgoCD applications with their sync and health status.\n\
                 Read-only; uses argocd --core against the selected context.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::ArgocdAppGet => {
                "Show an ArgoCD application's source, sync and health status,\n\
                 conditions and managed resources.\n\
                 Requires select_kube_context to be called first."
            }
            ToolName::ArgocdAppDiff => {
                "Diff an ArgoCD application's live state against its desired state.\n\
                 Use this to check what a sync would change.\n\
                 Requires select_kube_context to be called first."
            }
        }
    }

    pub fn input_schema(&self) -> Value {
        match self {
            ToolName::ListKubeContexts | ToolName::FluxCheck | ToolName::FluxStatus => {
                schema::<NoInput>()
            }
            ToolName::SelectKubeContext => schema::<SelectKubeContextInput>(),
            ToolName::FluxDryrun => schema::<FluxDryrunInput>(),
            ToolName::KustomizeDryrun => schema::<KustomizeDryrunInput>(),
            ToolName::HelmDryrun => schema::<HelmDryrunInput>(),
            ToolName::KubeconformValidate => schema::<KubeconformValidateInput>(),
            ToolName::YamlValidate => schema::<YamlValidateInput>(),
            ToolName::ArgocdAppList => schema::<ArgocdAppListInput>(),
            ToolName::ArgocdAppGet | ToolName::ArgocdAppDiff => schema::<ArgocdAppInput>(),
        }
    }

    /// `tools/list` entry.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.as_str(),
            "description": self.description(),
            "inputSchema": self.input_schema()
        })
    }
}

/// A tool invocation with its arguments validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ListKubeContexts,
    SelectKubeContext {
        context: String,
    },
    FluxDryrun {
        path: PathBuf,
    },
    FluxCheck,
    FluxStatus,
    KustomizeDryrun {
        path: PathBuf,
    },
    HelmDryrun(HelmRequest),
    KubeconformValidate {
        path: PathBuf,
        kubernetes_version: String,
        strict: bool,
    },
    YamlValidate {
        path: PathBuf,
    },
    ArgocdAppList {
        namespace: Option<String>,
    },
    ArgocdAppGet {
        app_name: String,
        namespace: Option<String>,
    },
    ArgocdAppDiff {
        app_name: String,
        namespace: Option<String>,
    },
}

/// Arguments that could not be turned into a [`ToolCall`].
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    /// A required argument was absent, null or an empty string.
    #[error("Error: '{0}' parameter is required")]
    Missing(String),

    #[error("Error: Invalid arguments: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// JSON schema for a tool input.
fn schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Deserialize `args` into `T`.
///
/// Null-valued keys count as absent. Fields the schema marks required must
/// be present and non-empty; serde reports everything else.
fn parse_input<T: DeserializeOwned + JsonSchema>(args: &Value) -> Result<T, ArgumentError> {
    let mut args = match args {
        Value::Null => json!({}),
        other => other.clone(),
    };
    if let Some(map) = args.as_object_mut() {
        map.retain(|_, v| !v.is_null());
    }

    let schema = schema::<T>();
    let required = schema["required"].as_array().into_iter().flatten();
    for field in required.filter_map(Value::as_str) {
        if is_blank(args.get(field)) {
            return Err(ArgumentError::Missing(field.to_string()));
        }
    }

    Ok(serde_json::from_value(args)?)
}

impl ToolCall {
    /// Validate `arguments` for `tool`.
    pub fn parse(tool: ToolName, args: &Value) -> Result<Self, ArgumentError> {
        let call = match tool {
            ToolName::ListKubeContexts => ToolCall::ListKubeContexts,
            ToolName::SelectKubeContext => {
                let input: SelectKubeContextInput = parse_input(args)?;
                ToolCall::SelectKubeContext {
                    context: input.context,
                }
            }
            ToolName::FluxDryrun => {
                let input: FluxDryrunInput = parse_input(args)?;
                ToolCall::FluxDryrun {
                    path: normalize_path(&input.path),
                }
            }
            ToolName::FluxCheck => ToolCall::FluxCheck,
            ToolName::FluxStatus => ToolCall::FluxStatus,
            ToolName::KustomizeDryrun => {
                let input: KustomizeDryrunInput = parse_input(args)?;
                ToolCall::KustomizeDryrun {
                    path: normalize_path(&input.path),
                }
            }
            ToolName::HelmDryrun => {
                let input: HelmDryrunInput = parse_input(args)?;
                let mut request = HelmRequest::new(normalize_path(&input.chart_path));
                request.values_file = non_empty(input.values_file).map(|v| normalize_path(&v));
                request.namespace = non_empty(input.namespace);
                if !input.release_name.is_empty() {
                    request.release_name = input.release_name;
                }
                ToolCall::HelmDryrun(request)
            }
            ToolName::KubeconformValidate => {
                let input: KubeconformValidateInput = parse_input(args)?;
                ToolCall::KubeconformValidate {
                    path: normalize_path(&input.path),
                    kubernetes_version: non_empty(Some(input.kubernetes_version))
                        .unwrap_or_else(|| DEFAULT_KUBERNETES_VERSION.to_string()),
                    strict: input.strict,
                }
            }
            ToolName::YamlValidate => {
                let input: YamlValidateInput = parse_input(args)?;
                ToolCall::YamlValidate {
                    path: normalize_path(&input.path),
                }
            }
            ToolName::ArgocdAppList => {
                let input: ArgocdAppListInput = parse_input(args)?;
                ToolCall::ArgocdAppList {
                    namespace: non_empty(input.namespace),
                }
            }
            ToolName::ArgocdAppGet => {
                let input: ArgocdAppInput = parse_input(args)?;
                ToolCall::ArgocdAppGet {
                    app_name: input.app_name,
                    namespace: non_empty(input.namespace),
                }
            }
            ToolName::ArgocdAppDiff => {
                let input: ArgocdAppInput = parse_input(args)?;
                ToolCall::ArgocdAppDiff {
                    app_name: input.app_name,
                    namespace: non_empty(input.namespace),
                }
            }
        };
        Ok(call)
    }
}

/// `tools/list` payload.
pub fn tool_definitions() -> Vec<Value> {
    ToolName::ALL.iter().map(ToolName::definition).collect()
}
