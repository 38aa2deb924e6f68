//! Flattening of ArgoCD `Application` JSON from `argocd app list|get -o json`.

use serde::Serialize;
use serde_json::Value;

use crate::error::{KubeLintError, Result};

const UNKNOWN: &str = "Unknown";

/// Git source of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgoSource {
    pub repo_url: String,
    pub path: String,
    pub target_revision: String,
}

/// One row of `argocd app list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgoAppSummary {
    pub name: String,
    pub namespace: String,
    pub project: String,
    pub sync_status: String,
    pub health_status: String,
    pub source: ArgoSource,
}

/// Sync and health of one managed resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgoResourceStatus {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub status: String,
    pub health: String,
}

/// Detailed view from `argocd app get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgoAppDetail {
    pub name: String,
    pub namespace: String,
    pub project: String,
    pub sync_status: String,
    pub health_status: String,
    /// Revision the app is synced to; empty when unknown.
    pub sync_revision: String,
    pub health_message: String,
    pub source: ArgoSource,
    pub resources: Vec<ArgoResourceStatus>,
    pub conditions: Vec<String>,
}

/// Stringify a JSON scalar; missing values and `null` become `default`.
fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn text(value: Option<&Value>) -> String {
    text_or(value, "")
}

/// Walk object keys; any non-object step yields `None`.
fn pointer<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(root, |node, key| node.as_object()?.get(*key))
}

fn is_empty_source(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(_) => false,
    }
}

/// `spec.source`, or the first of `spec.sources` when `source` is absent or
/// empty. Anything that is not an object yields empty fields.
pub fn extract_source(spec: &Value) -> ArgoSource {
    let single = spec.get("source").filter(|s| !is_empty_source(s));
    let source = single.or_else(|| {
        spec.get("sources")
            .and_then(Value::as_array)
            .and_then(|sources| sources.first())
    });

    match source {
        Some(src @ Value::Object(_)) => ArgoSource {
            repo_url: text(src.get("repoURL")),
            path: text(src.get("path")),
            target_revision: text(src.get("targetRevision")),
        },
        _ => ArgoSource::default(),
    }
}

fn summary_from(item: &Value) -> ArgoAppSummary {
    let spec = item.get("spec").cloned().unwrap_or(Value::Null);
    ArgoAppSummary {
        name: text(pointer(item, &["metadata", "name"])),
        namespace: text(pointer(item, &["metadata", "namespace"])),
        project: text(spec.get("project")),
        sync_status: text_or(pointer(item, &["status", "sync", "status"]), UNKNOWN),
        health_status: text_or(pointer(item, &["status", "health", "status"]), UNKNOWN),
        source: extract_source(&spec),
    }
}

/// Parse `argocd app list -o json`. Non-array output yields no apps.
pub fn parse_app_list(stdout: &str) -> Result<Vec<ArgoAppSummary>> {
    let value: Value =
        serde_json::from_str(stdout).map_err(|e| KubeLintError::parse("argocd output", e))?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(summary_from)
                .collect()
        })
        .unwrap_or_default())
}

fn condition_line(c: &Value) -> String {
    let ctype = text(c.get("type"));
    let message = text(c.get("message"));
    if message.is_empty() {
        ctype
    } else {
        format!("{ctype}: {message}")
    }
}

/// Parse `argocd app get -o json`.
pub fn parse_app_detail(stdout: &str) -> Result<ArgoAppDetail> {
    let value: Value =
        serde_json::from_str(stdout).map_err(|e| KubeLintError::parse("argocd output", e))?;
    if !value.is_object() {
        return Err(KubeLintError::parse(
            "argocd output",
            "expected a JSON object",
        ));
    }

    let summary = summary_from(&value);

    let resources = pointer(&value, &["status", "resources"])
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|r| r.is_object())
                .map(|r| ArgoResourceStatus {
                    kind: text(r.get("kind")),
                    namespace: text(r.get("namespace")),
                    name: text(r.get("name")),
                    status: text(r.get("status")),
                    health: text(pointer(r, &["health", "status"])),
                })
                .collect()
        })
        .unwrap_or_default();

    let conditions = pointer(&value, &["status", "conditions"])
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|c| c.is_object())
                .map(condition_line)
                .collect()
        })
        .unwrap_or_default();

    Ok(ArgoAppDetail {
        name: summary.name,
        namespace: summary.namespace,
        project: summary.project,
        sync_status: summary.sync_status,
        health_status: summary.health_status,
        sync_revision: text(pointer(&value, &["status", "sync", "revision"])),
        health_message: text(pointer(&value, &["status", "health", "message"])),
        source: summary.source,
        resources,
        conditions,
    })
}
