//! ArgoCD application queries through `argocd --core`.
//!
//! Every query needs the namespace holding the Application CRs. When the
//! caller does not name one, it is looked up from the `argocd-cm` configmap;
//! there is no fallback default.

use kube_lint_core::parse::{parse_app_detail, parse_app_list, ArgoAppDetail, ArgoAppSummary};
use kube_lint_core::{CommandRunner, CommandSpec, KubeLintError, Result, RunOutcome, Timeouts};
use serde::Serialize;
use tracing::{debug, warn};

const ARGOCD_CLI: &str = "argocd CLI";

pub const NAMESPACE_NOT_DETECTED: &str = "Could not auto-detect ArgoCD namespace \
     (argocd-cm configmap not found in any namespace). \
     Specify the namespace parameter explicitly.";

/// Applications plus the namespace they were listed from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArgoAppList {
    pub namespace: String,
    pub apps: Vec<ArgoAppSummary>,
}

/// Live vs desired state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ArgoDiff {
    InSync,
    OutOfSync { diff: String },
}

/// Namespace of the `argocd-cm` configmap, if any.
pub async fn detect_namespace(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
) -> Option<String> {
    let spec = CommandSpec::new(
        "kubectl",
        [
            "get",
            "configmap",
            "argocd-cm",
            "--all-namespaces",
            "--context",
            context,
            "-o",
            "jsonpath={.items[0].metadata.namespace}",
        ],
        timeouts.argocd_detect,
    );
    debug!(command = %spec.display(), "Auto-detecting ArgoCD namespace");

    match runner.run(&spec).await {
        RunOutcome::Exited(out) if out.success() => {
            let ns = out.stdout.trim();
            if ns.is_empty() {
                None
            } else {
                debug!(namespace = ns, "Detected ArgoCD namespace");
                Some(ns.to_string())
            }
        }
        _ => None,
    }
}

async fn resolve_namespace(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    namespace: Option<&str>,
) -> Result<String> {
    match namespace.filter(|ns| !ns.is_empty()) {
        Some(ns) => Ok(ns.to_string()),
        None => detect_namespace(runner, timeouts, context)
            .await
            .ok_or_else(|| KubeLintError::Precondition(NAMESPACE_NOT_DETECTED.to_string())),
    }
}

fn argocd_spec(
    timeouts: &Timeouts,
    subcommand: &[&str],
    context: &str,
    namespace: &str,
    json: bool,
) -> CommandSpec {
    let mut args: Vec<&str> = vec!["app"];
    args.extend_from_slice(subcommand);
    args.extend(["--core", "--kube-context", context, "-n", namespace]);
    if json {
        args.extend(["-o", "json"]);
    }
    CommandSpec::new("argocd", args, timeouts.argocd)
}

/// Run an argocd query that must exit 0; returns its stdout.
async fn query(runner: &dyn CommandRunner, spec: &CommandSpec, what: &str) -> Result<String> {
    debug!(command = %spec.display(), "Running argocd");
    let out = runner
        .run(spec)
        .await
        .into_exited(what)
        .map_err(|e| e.describe_missing(ARGOCD_CLI, None))?;
    if !out.success() {
        let message = out.error_text();
        warn!(command = what, exit_code = out.exit_code, error = %message, "argocd query failed");
        return Err(KubeLintError::NonZeroExit {
            command: what.to_string(),
            exit_code: out.exit_code,
            message,
        });
    }
    Ok(out.stdout)
}

/// `argocd app list`.
pub async fn list_apps(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    namespace: Option<&str>,
) -> Result<ArgoAppList> {
    let namespace = resolve_namespace(runner, timeouts, context, namespace).await?;
    let spec = argocd_spec(timeouts, &["list"], context, &namespace, true);
    let stdout = query(runner, &spec, "argocd app list").await?;
    Ok(ArgoAppList {
        apps: parse_app_list(&stdout)?,
        namespace,
    })
}

/// `argocd app get <name>`.
pub async fn get_app(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    app_name: &str,
    namespace: Option<&str>,
) -> Result<ArgoAppDetail> {
    let namespace = resolve_namespace(runner, timeouts, context, namespace).await?;
    let spec = argocd_spec(timeouts, &["get", app_name], context, &namespace, true);
    let stdout = query(runner, &spec, "argocd app get").await?;
    parse_app_detail(&stdout)
}

/// `argocd app diff <name>`: exit 0 is in sync, 1 is a diff, anything else
/// an error.
pub async fn diff_app(
    runner: &dyn CommandRunner,
    timeouts: &Timeouts,
    context: &str,
    app_name: &str,
    namespace: Option<&str>,
) -> Result<ArgoDiff> {
    let namespace = resolve_namespace(runner, timeouts, context, namespace).await?;
    let spec = argocd_spec(timeouts, &["diff", app_name], context, &namespace, false);
    debug!(command = %spec.display(), "Running argocd");

    let out = runner
        .run(&spec)
        .await
        .into_exited("argocd app diff")
        .map_err(|e| e.describe_missing(ARGOCD_CLI, None))?;
    match out.exit_code {
        0 => Ok(ArgoDiff::InSync),
        1 => {
            let stdout = out.stdout.trim();
            let diff = if stdout.is_empty() {
                out.stderr.trim()
            } else {
                stdout
            };
            Ok(ArgoDiff::OutOfSync {
                diff: diff.to_string(),
            })
        }
        code => {
            let message = out.error_text();
            warn!(exit_code = code, error = %message, "argocd app diff failed");
            Err(KubeLintError::NonZeroExit {
                command: "argocd app diff".to_string(),
                exit_code: code,
                message,
            })
        }
    }
}
