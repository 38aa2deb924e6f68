//! Integration tests for the MCP server with a scripted process runner.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use kube_lint_core::fakes::ScriptedRunner;
use kube_lint_core::{ContextGate, RunOutcome, Timeouts};
use kube_lint_mcp::{KubeLintServer, Session};
use serde_json::{json, Value};
use tempfile::TempDir;

fn ok(stdout: &str) -> RunOutcome {
    RunOutcome::exited(0, stdout, "")
}

/// Outcomes for one context enumeration.
fn contexts(names: &str, current: &str) -> [RunOutcome; 2] {
    [ok(names), ok(current)]
}

fn setup() -> (Arc<ScriptedRunner>, KubeLintServer, Session) {
    let runner = Arc::new(ScriptedRunner::new());
    let server = KubeLintServer::new(runner.clone(), Timeouts::default());
    let session = Session::with_gate(ContextGate::with_min_delay(Duration::ZERO));
    (runner, server, session)
}

async fn select(runner: &ScriptedRunner, server: &KubeLintServer, session: &mut Session, ctx: &str) {
    for outcome in contexts("dev\nprod\n", "dev\n") {
        runner.push(outcome);
    }
    server
        .call_tool(session, "list_kube_contexts", &json!({}))
        .await;
    for outcome in contexts("dev\nprod\n", "dev\n") {
        runner.push(outcome);
    }
    let text = server
        .call_tool(session, "select_kube_context", &json!({ "context": ctx }))
        .await;
    assert!(text.starts_with(&format!("Context selected: {ctx}")), "{text}");
}

/// Test: list, reject an unknown context, select a real one, list again
#[tokio::test]
async fn test_context_gate_flow() {
    let (runner, server, mut session) = setup();

    for outcome in contexts("dev\nprod\n", "dev\n") {
        runner.push(outcome);
    }
    let text = server
        .call_tool(&mut session, "list_kube_contexts", &json!({}))
        .await;
    assert_eq!(
        text,
        "Available Kubernetes Contexts:\n\n  -> dev (global current)\n  -> prod\n\n\
         No context selected. Ask the user which context to use, then call select_kube_context."
    );

    for outcome in contexts("dev\nprod\n", "dev\n") {
        runner.push(outcome);
    }
    let text = server
        .call_tool(&mut session, "select_kube_context", &json!({ "context": "staging" }))
        .await;
    assert_eq!(
        text,
        "Error: Context 'staging' not found.\n\nAvailable contexts:\n  - dev (current global)\n  - prod"
    );
    assert_eq!(session.gate.selected(), None);

    for outcome in contexts("dev\nprod\n", "dev\n") {
        runner.push(outcome);
    }
    let text = server
        .call_tool(&mut session, "select_kube_context", &json!({ "context": "prod" }))
        .await;
    assert!(text.contains("via --context flag (no global kubeconfig mutation)"));
    assert_eq!(session.gate.selected(), Some("prod"));

    for outcome in contexts("dev\nprod\n", "dev\n") {
        runner.push(outcome);
    }
    let text = server
        .call_tool(&mut session, "list_kube_contexts", &json!({}))
        .await;
    assert!(text.contains("  -> dev (global current)\n  -> prod <-- selected\n"));
    assert!(text.ends_with("Selected context: prod"));
    assert_eq!(runner.remaining(), 0);
}

/// Test: selecting straight after listing is refused without enumerating
#[tokio::test]
async fn test_select_too_soon_is_refused() {
    let runner = Arc::new(ScriptedRunner::new());
    let server = KubeLintServer::new(runner.clone(), Timeouts::default());
    let mut session = Session::new();

    for outcome in contexts("dev\n", "dev\n") {
        runner.push(outcome);
    }
    server
        .call_tool(&mut session, "list_kube_contexts", &json!({}))
        .await;

    let text = server
        .call_tool(&mut session, "select_kube_context", &json!({ "context": "dev" }))
        .await;
    assert!(text.contains("wait for the user"), "{text}");
    assert_eq!(session.gate.selected(), None);
    assert_eq!(runner.call_count(), 2);
}

/// Test: select before any list names list_kube_contexts
#[tokio::test]
async fn test_select_without_list() {
    let (runner, server, mut session) = setup();
    let text = server
        .call_tool(&mut session, "select_kube_context", &json!({ "context": "dev" }))
        .await;
    assert!(text.contains("Call list_kube_contexts first"));
    assert_eq!(runner.call_count(), 0);

    let text = server
        .call_tool(&mut session, "select_kube_context", &json!({}))
        .await;
    assert_eq!(text, "Error: 'context' parameter is required");
}

/// Test: an empty enumeration still opens the selection window
#[tokio::test]
async fn test_empty_context_list() {
    let (runner, server, mut session) = setup();
    runner.push(RunOutcome::NotFound {
        program: "kubectl".to_string(),
    });
    let text = server
        .call_tool(&mut session, "list_kube_contexts", &json!({}))
        .await;
    assert_eq!(text, "No kubectl contexts found. Is kubectl configured?");
    assert!(session.gate.listed_at().is_some());
}

/// Test: cluster tools refuse to run without a selected context
#[tokio::test]
async fn test_cluster_tools_require_context() {
    let (runner, server, mut session) = setup();
    for tool in [
        "flux_dryrun",
        "flux_check",
        "flux_status",
        "kustomize_dryrun",
        "helm_dryrun",
        "argocd_app_list",
        "argocd_app_get",
        "argocd_app_diff",
    ] {
        let text = server
            .call_tool(&mut session, tool, &json!({ "path": "/tmp" }))
            .await;
        assert_eq!(
            text,
            "Error: No context selected. Call select_kube_context first.\n\nUse list_kube_contexts to see available contexts.",
            "{tool}"
        );
    }
    assert_eq!(runner.call_count(), 0);
}

/// Test: argocd diff exit codes 0, 1 and 2 through the tool surface
#[tokio::test]
async fn test_argocd_diff_tool() {
    let (runner, server, mut session) = setup();
    select(&runner, &server, &mut session, "dev").await;

    runner.push(ok(""));
    runner.push(RunOutcome::exited(1, "-  replicas: 2\n+  replicas: 3\n", ""));
    runner.push(RunOutcome::exited(2, "", "application 'web' not found"));
    let args = json!({ "app_name": "web", "namespace": "argocd" });

    let text = server.call_tool(&mut session, "argocd_app_diff", &args).await;
    assert!(text.starts_with("ArgoCD Application Diff\nContext: dev\nApplication: web\n"));
    assert!(text.contains("Application is IN SYNC"));

    let text = server.call_tool(&mut session, "argocd_app_diff", &args).await;
    assert!(text.contains("Application is OUT OF SYNC - differences detected:\n\n-  replicas: 2\n+  replicas: 3"));

    let text = server.call_tool(&mut session, "argocd_app_diff", &args).await;
    assert_eq!(text, "Error diffing ArgoCD app: application 'web' not found");

    let last = runner.calls().pop().unwrap();
    assert_eq!(
        last.args,
        ["app", "diff", "web", "--core", "--kube-context", "dev", "-n", "argocd"]
    );
}

/// Test: argocd list with namespace auto-detection failing
#[tokio::test]
async fn test_argocd_list_without_namespace() {
    let (runner, server, mut session) = setup();
    select(&runner, &server, &mut session, "prod").await;

    runner.push(RunOutcome::exited(1, "", "No resources found"));
    let text = server
        .call_tool(&mut session, "argocd_app_list", &json!({}))
        .await;
    assert!(text.starts_with("Error listing ArgoCD apps: Could not auto-detect ArgoCD namespace"));
}

/// Test: yaml_validate works without a context
#[tokio::test]
async fn test_yaml_validate_without_context() {
    let (runner, server, mut session) = setup();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.yaml"), "a: 1\n").unwrap();
    fs::write(dir.path().join("b.yaml"), "b: [\n").unwrap();

    let text = server
        .call_tool(
            &mut session,
            "yaml_validate",
            &json!({ "path": dir.path().to_str().unwrap() }),
        )
        .await;

    assert!(text.starts_with("YAML Syntax Validation\n"));
    assert!(text.contains("b.yaml: FAIL\n    Error: line "));
    assert!(text.contains("Summary: 1 valid, 1 invalid (2 files)"));
    assert!(text.ends_with("DO NOT COMMIT - Fix YAML syntax errors first!"));
    assert_eq!(runner.call_count(), 0);
}

/// Test: missing kubeconform binary is reported with its install hint
#[tokio::test]
async fn test_kubeconform_not_installed() {
    let (runner, server, mut session) = setup();
    runner.push(RunOutcome::NotFound {
        program: "kubeconform".to_string(),
    });
    let text = server
        .call_tool(&mut session, "kubeconform_validate", &json!({ "path": "/tmp" }))
        .await;
    assert_eq!(
        text,
        "Error: kubeconform not found. Install: https://github.com/yannh/kubeconform"
    );
}

/// Test: kubeconform failing before it reports any resource blocks the commit
#[tokio::test]
async fn test_kubeconform_failure_without_resources() {
    let (runner, server, mut session) = setup();
    runner.push(RunOutcome::exited(
        1,
        "",
        "failed to download schema: unknown kubernetes version 9.99",
    ));
    let text = server
        .call_tool(
            &mut session,
            "kubeconform_validate",
            &json!({ "path": "/tmp", "kubernetes_version": "9.99" }),
        )
        .await;
    assert!(
        text.contains("Error: kubeconform exited with code 1: failed to download schema"),
        "{text}"
    );
    assert!(!text.contains("Safe to commit"));
    assert!(text.ends_with("DO NOT COMMIT - Fix schema errors first!"));
}

/// Test: path preconditions for kustomize, helm and flux
#[tokio::test]
async fn test_path_preconditions() {
    let (runner, server, mut session) = setup();
    select(&runner, &server, &mut session, "dev").await;
    let calls_after_select = runner.call_count();

    let dir = TempDir::new().unwrap();
    let path = dir.path().canonicalize().unwrap();
    let arg = path.to_str().unwrap();

    let text = server
        .call_tool(&mut session, "kustomize_dryrun", &json!({ "path": arg }))
        .await;
    assert_eq!(
        text,
        format!("Error: Path '{arg}' is not a Kustomize overlay (missing kustomization.yaml)")
    );

    let text = server
        .call_tool(&mut session, "helm_dryrun", &json!({ "chart_path": arg }))
        .await;
    assert_eq!(
        text,
        format!("Error: Path '{arg}' is not a Helm chart (missing Chart.yaml)")
    );

    let text = server
        .call_tool(&mut session, "flux_dryrun", &json!({ "path": arg }))
        .await;
    assert_eq!(text, format!("No YAML files found in: {arg}"));

    assert_eq!(runner.call_count(), calls_after_select);
}

/// Test: flux check passes the selected context through
#[tokio::test]
async fn test_flux_check_uses_selected_context() {
    let (runner, server, mut session) = setup();
    select(&runner, &server, &mut session, "prod").await;

    runner.push(RunOutcome::exited(1, "", "✗ source-controller: not ready\n"));
    let text = server
        .call_tool(&mut session, "flux_check", &json!({}))
        .await;
    assert_eq!(
        text,
        "Context: prod\nFlux Check: UNHEALTHY\n\n✗ source-controller: not ready"
    );
    let last = runner.calls().pop().unwrap();
    assert_eq!(last.program, "flux");
    assert_eq!(last.args, ["--context", "prod", "check"]);
}

/// Test: a full stdio exchange with notifications interleaved
#[tokio::test]
async fn test_serve_over_stream() {
    let runner = Arc::new(ScriptedRunner::new());
    let server = KubeLintServer::new(runner, Timeouts::default());

    let input = [
        json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}),
        json!({"jsonrpc":"2.0","method":"notifications/initialized"}),
        json!({"jsonrpc":"2.0","id":2,"method":"tools/list"}),
        json!({"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope","arguments":{}}}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n")
        + "\n\nnot json\n";

    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "kube-lint-mcp");

    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 12);

    assert_eq!(responses[2]["id"], 3);
    assert_eq!(
        responses[2]["result"],
        json!({ "content": [{ "type": "text", "text": "Unknown tool: nope" }], "isError": false })
    );

    assert_eq!(responses[3]["error"]["code"], -32700);
    assert_eq!(responses[3]["id"], Value::Null);
}
