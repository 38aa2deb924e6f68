//! Tool handlers. Each one turns a validated [`ToolCall`] into report text.

use std::path::Path;
use std::time::Instant;

use kube_lint_core::list_contexts;
use kube_lint_core::paths::{is_helm_chart, is_kustomization};
use kube_lint_validators::report::{
    format_argocd_detail, format_argocd_diff, format_argocd_list, format_flux_report,
    format_helm_report, format_kubeconform_report, format_kustomize_report, format_yaml_report,
};
use kube_lint_validators::{
    diff_app, get_app, get_flux_status, list_apps, run_flux_check, validate_helm_chart,
    validate_kustomization, validate_manifests, validate_schemas, validate_yaml, HelmRequest,
};
use tracing::{debug, warn};

use crate::server::{KubeLintServer, Session};
use crate::tools::ToolCall;

impl KubeLintServer {
    /// `context` is the selected context for cluster tools, empty otherwise.
    pub(crate) async fn dispatch(&self, session: &mut Session, call: ToolCall, context: &str) -> String {
        match call {
            ToolCall::ListKubeContexts => self.list_kube_contexts(session).await,
            ToolCall::SelectKubeContext { context } => {
                self.select_kube_context(session, &context).await
            }
            ToolCall::FluxDryrun { path } => self.flux_dryrun(context, &path).await,
            ToolCall::FluxCheck => {
                let out = run_flux_check(self.runner.as_ref(), &self.timeouts, context).await;
                let status = if out.success {
                    "Flux Check: HEALTHY"
                } else {
                    "Flux Check: UNHEALTHY"
                };
                format!("Context: {context}\n{status}\n\n{}", out.output)
            }
            ToolCall::FluxStatus => {
                let out = get_flux_status(self.runner.as_ref(), &self.timeouts, context).await;
                if out.success {
                    format!("Context: {context}\nFlux Status:\n\n{}", out.output)
                } else {
                    format!("Context: {context}\nError getting Flux status:\n\n{}", out.output)
                }
            }
            ToolCall::KustomizeDryrun { path } => self.kustomize_dryrun(context, &path).await,
            ToolCall::HelmDryrun(request) => self.helm_dryrun(context, &request).await,
            ToolCall::KubeconformValidate {
                path,
                kubernetes_version,
                strict,
            } => {
                match validate_schemas(
                    self.runner.as_ref(),
                    &self.timeouts,
                    &path,
                    &kubernetes_version,
                    strict,
                )
                .await
                {
                    Ok(report) => format_kubeconform_report(&report, &kubernetes_version, strict),
                    Err(e) => format!("Error: {e}"),
                }
            }
            ToolCall::YamlValidate { path } => format_yaml_report(&validate_yaml(&path)),
            ToolCall::ArgocdAppList { namespace } => {
                match list_apps(self.runner.as_ref(), &self.timeouts, context, namespace.as_deref())
                    .await
                {
                    Ok(list) => format_argocd_list(&list, context),
                    Err(e) => format!("Error listing ArgoCD apps: {e}"),
                }
            }
            ToolCall::ArgocdAppGet {
                app_name,
                namespace,
            } => {
                match get_app(
                    self.runner.as_ref(),
                    &self.timeouts,
                    context,
                    &app_name,
                    namespace.as_deref(),
                )
                .await
                {
                    Ok(detail) => format_argocd_detail(&detail, context),
                    Err(e) => format!("Error getting ArgoCD app: {e}"),
                }
            }
            ToolCall::ArgocdAppDiff {
                app_name,
                namespace,
            } => {
                match diff_app(
                    self.runner.as_ref(),
                    &self.timeouts,
                    context,
                    &app_name,
                    namespace.as_deref(),
                )
                .await
                {
                    Ok(diff) => format_argocd_diff(&diff, context, &app_name),
                    Err(e) => format!("Error diffing ArgoCD app: {e}"),
                }
            }
        }
    }

    async fn list_kube_contexts(&self, session: &mut Session) -> String {
        let listing = list_contexts(self.runner.as_ref(), &self.timeouts).await;
        session.gate.record_listing(Instant::now());
        debug!(count = listing.contexts.len(), "Listed kube contexts");

        if listing.contexts.is_empty() {
            return "No kubectl contexts found. Is kubectl configured?".to_string();
        }

        let selected = session.gate.selected();
        let mut lines = vec!["Available Kubernetes Contexts:".to_string(), String::new()];
        for ctx in &listing.contexts {
            let marker = if Some(ctx.as_str()) == selected {
                " <-- selected"
            } else if Some(ctx) == listing.current.as_ref() {
                " (global current)"
            } else {
                ""
            };
            lines.push(format!("  -> {ctx}{marker}"));
        }

        lines.push(String::new());
        lines.push(match selected {
            Some(ctx) => format!("Selected context: {ctx}"),
            None => "No context selected. Ask the user which context to use, then call select_kube_context."
                .to_string(),
        });
        lines.join("\n")
    }

    async fn select_kube_context(&self, session: &mut Session, name: &str) -> String {
        if let Err(e) = session.gate.check_select(Instant::now()) {
            warn!(context = %name, error = %e, "Context selection refused");
            return e.to_string();
        }

        let listing = list_contexts(self.runner.as_ref(), &self.timeouts).await;
        if let Err(e) = session.gate.commit(name, &listing) {
            warn!(context = %name, "Unknown context requested");
            return e.to_string();
        }

        format!(
            "Context selected: {name}\n\n\
             All subsequent operations will target this context \
             via --context flag (no global kubeconfig mutation)."
        )
    }

    async fn flux_dryrun(&self, context: &str, path: &Path) -> String {
        let results = validate_manifests(self.runner.as_ref(), &self.timeouts, context, path).await;
        if results.is_empty() {
            return format!("No YAML files found in: {}", path.display());
        }
        format_flux_report(&results, context, path)
    }

    async fn kustomize_dryrun(&self, context: &str, path: &Path) -> String {
        if !is_kustomization(path) {
            return format!(
                "Error: Path '{}' is not a Kustomize overlay (missing kustomization.yaml)",
                path.display()
            );
        }
        let result = validate_kustomization(self.runner.as_ref(), &self.timeouts, context, path).await;
        format_kustomize_report(&result, context)
    }

    async fn helm_dryrun(&self, context: &str, request: &HelmRequest) -> String {
        if !is_helm_chart(&request.chart_path) {
            return format!(
                "Error: Path '{}' is not a Helm chart (missing Chart.yaml)",
                request.chart_path.display()
            );
        }
        let result = validate_helm_chart(self.runner.as_ref(), &self.timeouts, context, request).await;
        format_helm_report(
            &result,
            context,
            request.values_file.as_deref(),
            request.namespace.as_deref(),
        )
    }
}
