//! Plain-text reports.
//!
//! Layout is fixed: a title block, a separator, per-stage or per-item lines,
//! then a summary and a commit verdict.

use std::path::Path;

use crate::argocd::{ArgoAppList, ArgoDiff};
use crate::flux::FluxFileResult;
use crate::helm::HelmResult;
use crate::kubeconform::{KubeconformReport, DEFAULT_KUBERNETES_VERSION};
use crate::kustomize::KustomizeResult;
use crate::stage::{Stage, StageOutcome};
use crate::verdict::{
    Summary, DO_NOT_COMMIT_SCHEMA, DO_NOT_COMMIT_YAML, SAFE_TO_COMMIT, YAML_VALID,
};
use crate::yaml::YamlReport;
use kube_lint_core::parse::{ArgoAppDetail, ResourceStatus};

fn separator() -> String {
    "=".repeat(50)
}

/// Lines for one stage: `PASS`, `PASS (with warnings)` or `FAIL`.
pub fn format_step(stage: Stage, outcome: &StageOutcome) -> Vec<String> {
    let label = stage.label();
    match outcome {
        StageOutcome::Passed { warnings } if warnings.is_empty() => {
            vec![format!("{label}: PASS")]
        }
        StageOutcome::Passed { warnings } => std::iter::once(format!("{label}: PASS (with warnings)"))
            .chain(warnings.iter().map(|w| format!("  Warning: {w}")))
            .collect(),
        StageOutcome::Failed { error } => std::iter::once(format!("{label}: FAIL"))
            .chain(error.iter().map(|e| format!("  Error: {e}")))
            .collect(),
        StageOutcome::NotRun => vec![format!("{label}: FAIL")],
    }
}

/// A render stage reports how many resources it produced when it passes.
fn format_render_step(stage: Stage, outcome: &StageOutcome, resource_count: usize) -> Vec<String> {
    if outcome.is_passed() {
        vec![format!("{}: PASS ({resource_count} resources)", stage.label())]
    } else {
        format_step(stage, outcome)
    }
}

fn summary_footer(summary: &Summary) -> Vec<String> {
    vec![
        separator(),
        format!("Summary: {} passed, {} failed", summary.passed, summary.failed),
        String::new(),
        summary.verdict().to_string(),
    ]
}

fn title_block(title: &str, context: &str, target: (&str, &Path)) -> Vec<String> {
    vec![
        title.to_string(),
        format!("Context: {context}"),
        format!("{}: {}", target.0, target.1.display()),
    ]
}

/// Per-file client/server dry-run report.
///
/// A file whose client dry-run fails counts once as failed and its server
/// step is not shown.
pub fn format_flux_report(results: &[FluxFileResult], context: &str, path: &Path) -> String {
    let mut lines = title_block("FluxCD Dry-Run Validation", context, ("Path", path));
    lines.extend([separator(), String::new()]);

    let mut summary = Summary::default();
    for result in results {
        lines.push(format!("File: {}", result.file.display()));
        let dry_run = &result.dry_run;

        if !dry_run.client.is_passed() {
            lines.extend(
                format_step(Stage::ClientDryRun, &dry_run.client)
                    .into_iter()
                    .map(|l| format!("  {l}")),
            );
            summary.record(false);
            lines.push(String::new());
            continue;
        }

        lines.push("  Client dry-run: PASS".to_string());
        lines.extend(
            format_step(Stage::ServerDryRun, &dry_run.server)
                .into_iter()
                .map(|l| format!("  {l}")),
        );
        summary.record(dry_run.server.is_passed());
        lines.push(String::new());
    }

    lines.extend(summary_footer(&summary));
    lines.join("\n")
}

pub fn format_kustomize_report(result: &KustomizeResult, context: &str) -> String {
    let mut lines = title_block(
        "Kustomize Dry-Run Validation",
        context,
        ("Path", result.path.as_path()),
    );
    lines.extend([separator(), String::new()]);

    lines.extend(format_render_step(
        Stage::KustomizeBuild,
        &result.build,
        result.resource_count,
    ));
    lines.push(String::new());
    lines.extend(format_step(Stage::ClientDryRun, &result.dry_run.client));
    lines.push(String::new());
    lines.extend(format_step(Stage::ServerDryRun, &result.dry_run.server));
    lines.push(String::new());

    lines.extend(summary_footer(&result.summary()));
    lines.join("\n")
}

pub fn format_helm_report(
    result: &HelmResult,
    context: &str,
    values_file: Option<&Path>,
    namespace: Option<&str>,
) -> String {
    let mut lines = title_block(
        "Helm Chart Dry-Run Validation",
        context,
        ("Chart", result.chart_path.as_path()),
    );
    if let Some(values) = values_file {
        lines.push(format!("Values: {}", values.display()));
    }
    if let Some(ns) = namespace {
        lines.push(format!("Namespace: {ns}"));
    }
    lines.extend([separator(), String::new()]);

    lines.extend(format_step(Stage::HelmLint, &result.lint));
    lines.push(String::new());
    lines.extend(format_render_step(
        Stage::HelmTemplate,
        &result.render,
        result.resource_count,
    ));
    lines.push(String::new());
    lines.extend(format_step(Stage::ClientDryRun, &result.dry_run.client));
    lines.push(String::new());
    lines.extend(format_step(Stage::ServerDryRun, &result.dry_run.server));
    lines.push(String::new());

    lines.push(separator());
    lines.push(result.summary().verdict().to_string());
    lines.join("\n")
}

pub fn format_kubeconform_report(
    report: &KubeconformReport,
    kubernetes_version: &str,
    strict: bool,
) -> String {
    let mut lines = vec![
        "Kubeconform Schema Validation".to_string(),
        format!("Path: {}", report.path.display()),
    ];
    if kubernetes_version != DEFAULT_KUBERNETES_VERSION {
        lines.push(format!("Kubernetes version: {kubernetes_version}"));
    }
    if strict {
        lines.push("Strict mode: enabled".to_string());
    }
    lines.extend([separator(), String::new()]);

    if let Some(failure) = &report.failure {
        lines.push(format!("Error: {failure}"));
    } else if report.resources.is_empty() {
        lines.push("No resources found to validate.".to_string());
    }
    for r in &report.resources {
        let label = if r.name.is_empty() {
            r.kind.clone()
        } else {
            format!("{}/{}", r.kind, r.name)
        };
        let api = if r.version.is_empty() {
            String::new()
        } else {
            format!(" ({})", r.version)
        };

        let verdict = match r.status {
            ResourceStatus::Valid => "PASS",
            ResourceStatus::Invalid => "INVALID",
            ResourceStatus::Error => "ERROR",
            ResourceStatus::Skipped => "SKIPPED",
            ResourceStatus::Unknown => continue,
        };
        lines.push(format!("  {label}{api}: {verdict}"));
        if r.status.is_failure() {
            lines.extend(r.msg.lines().map(|m| format!("    {m}")));
        }
    }

    lines.push(String::new());
    lines.push(separator());
    lines.push(format!(
        "Summary: {} valid, {} invalid, {} errors, {} skipped",
        report.valid, report.invalid, report.errors, report.skipped
    ));
    lines.push(String::new());
    lines.push(
        if report.passed() {
            SAFE_TO_COMMIT
        } else {
            DO_NOT_COMMIT_SCHEMA
        }
        .to_string(),
    );
    lines.join("\n")
}

pub fn format_yaml_report(report: &YamlReport) -> String {
    let mut lines = vec![
        "YAML Syntax Validation".to_string(),
        format!("Path: {}", report.path.display()),
        separator(),
        String::new(),
    ];

    if report.files.is_empty() {
        lines.push("No YAML files found.".to_string());
    }
    for f in &report.files {
        let file = f.file.display();
        match (f.valid(), f.warnings.is_empty()) {
            (true, true) => lines.push(format!("  {file}: PASS ({} documents)", f.document_count)),
            (true, false) => lines.push(format!(
                "  {file}: PASS with warnings ({} documents)",
                f.document_count
            )),
            (false, _) => {
                lines.push(format!("  {file}: FAIL"));
                lines.extend(f.errors.iter().map(|e| format!("    Error: {e}")));
            }
        }
        lines.extend(f.warnings.iter().map(|w| format!("    Warning: {w}")));
        lines.push(String::new());
    }

    lines.push(separator());
    lines.push(format!(
        "Summary: {} valid, {} invalid ({} files)",
        report.valid_files(),
        report.invalid_files(),
        report.total_files()
    ));
    lines.push(String::new());
    lines.push(
        if report.passed() {
            YAML_VALID
        } else {
            DO_NOT_COMMIT_YAML
        }
        .to_string(),
    );
    lines.join("\n")
}

pub fn format_argocd_list(list: &ArgoAppList, context: &str) -> String {
    let mut lines = vec![
        "ArgoCD Application List".to_string(),
        format!("Context: {context}"),
    ];
    if !list.namespace.is_empty() {
        lines.push(format!("Namespace: {}", list.namespace));
    }
    lines.extend([separator(), String::new()]);

    if list.apps.is_empty() {
        lines.push("No ArgoCD applications found.".to_string());
    }
    for app in &list.apps {
        lines.push(format!("  {}", app.name));
        lines.push(format!("    Project: {}", app.project));
        lines.push(format!(
            "    Sync: {}  Health: {}",
            app.sync_status, app.health_status
        ));
        lines.push(format!("    Repo: {}", app.source.repo_url));
        if !app.source.path.is_empty() {
            lines.push(format!("    Path: {}", app.source.path));
        }
        if !app.source.target_revision.is_empty() {
            lines.push(format!("    Revision: {}", app.source.target_revision));
        }
        lines.push(String::new());
    }

    lines.push(separator());
    lines.push(format!("Total: {} application(s)", list.apps.len()));
    lines.join("\n")
}

pub fn format_argocd_detail(app: &ArgoAppDetail, context: &str) -> String {
    let mut lines = vec![
        "ArgoCD Application Detail".to_string(),
        format!("Context: {context}"),
        format!("Application: {}", app.name),
        separator(),
        String::new(),
        format!("  Project: {}", app.project),
        format!("  Namespace: {}", app.namespace),
        format!("  Sync Status: {}", app.sync_status),
        format!("  Health Status: {}", app.health_status),
    ];
    if !app.sync_revision.is_empty() {
        lines.push(format!("  Sync Revision: {}", app.sync_revision));
    }
    if !app.health_message.is_empty() {
        lines.push(format!("  Health Message: {}", app.health_message));
    }
    lines.extend([
        format!("  Repo: {}", app.source.repo_url),
        format!("  Path: {}", app.source.path),
        format!("  Revision: {}", app.source.target_revision),
        String::new(),
    ]);

    if !app.conditions.is_empty() {
        lines.push("Conditions:".to_string());
        lines.extend(app.conditions.iter().map(|c| format!("  - {c}")));
        lines.push(String::new());
    }

    if !app.resources.is_empty() {
        lines.push("Resources:".to_string());
        for r in &app.resources {
            let mut label = format!("{}/{}", r.kind, r.name);
            if !r.namespace.is_empty() {
                label = format!("{label} ({})", r.namespace);
            }
            lines.push(format!("  {label}: sync={} health={}", r.status, r.health));
        }
        lines.push(String::new());
    }

    lines.push(separator());
    lines.join("\n")
}

pub fn format_argocd_diff(diff: &ArgoDiff, context: &str, app_name: &str) -> String {
    let mut lines = vec![
        "ArgoCD Application Diff".to_string(),
        format!("Context: {context}"),
        format!("Application: {app_name}"),
        separator(),
        String::new(),
    ];
    match diff {
        ArgoDiff::InSync => lines.push(
            "Application is IN SYNC - no differences between live and desired state.".to_string(),
        ),
        ArgoDiff::OutOfSync { diff } => {
            lines.push("Application is OUT OF SYNC - differences detected:".to_string());
            lines.push(String::new());
            lines.push(diff.clone());
        }
    }
    lines.push(String::new());
    lines.push(separator());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dryrun::DryRunResult;
    use crate::yaml::YamlFileResult;
    use kube_lint_core::parse::{ArgoAppSummary, ArgoResourceStatus, ArgoSource, KubeconformResource};
    use std::path::PathBuf;

    fn dry_run(client: StageOutcome, server: StageOutcome) -> DryRunResult {
        DryRunResult { client, server }
    }

    #[test]
    fn test_format_step_variants() {
        assert_eq!(
            format_step(Stage::ClientDryRun, &StageOutcome::passed()),
            ["Client dry-run: PASS"]
        );
        assert_eq!(
            format_step(
                Stage::ServerDryRun,
                &StageOutcome::Passed {
                    warnings: vec!["Warning: old api".to_string()]
                }
            ),
            ["Server dry-run: PASS (with warnings)", "  Warning: Warning: old api"]
        );
        assert_eq!(
            format_step(Stage::HelmLint, &StageOutcome::failed("bad chart")),
            ["Helm lint: FAIL", "  Error: bad chart"]
        );
        assert_eq!(
            format_step(Stage::HelmTemplate, &StageOutcome::NotRun),
            ["Helm template: FAIL"]
        );
    }

    #[test]
    fn test_flux_report_counts_files() {
        let results = vec![
            FluxFileResult {
                file: PathBuf::from("/repo/a.yaml"),
                dry_run: dry_run(StageOutcome::passed(), StageOutcome::passed()),
            },
            FluxFileResult {
                file: PathBuf::from("/repo/b.yaml"),
                dry_run: dry_run(StageOutcome::failed("invalid"), StageOutcome::NotRun),
            },
        ];

        let text = format_flux_report(&results, "dev", Path::new("/repo"));
        let sep = "=".repeat(50);
        let expected = [
            "FluxCD Dry-Run Validation",
            "Context: dev",
            "Path: /repo",
            sep.as_str(),
            "",
            "File: /repo/a.yaml",
            "  Client dry-run: PASS",
            "  Server dry-run: PASS",
            "",
            "File: /repo/b.yaml",
            "  Client dry-run: FAIL",
            "    Error: invalid",
            "",
            sep.as_str(),
            "Summary: 1 passed, 1 failed",
            "",
            "DO NOT COMMIT - Fix errors first!",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_kustomize_report_build_failure() {
        let result = KustomizeResult {
            path: PathBuf::from("/overlays/prod"),
            build: StageOutcome::failed("accumulating resources"),
            resource_count: 0,
            dry_run: DryRunResult::not_run(),
        };
        let text = format_kustomize_report(&result, "prod");
        assert!(text.contains("Kustomize build: FAIL\n  Error: accumulating resources\n\nClient dry-run: FAIL\n\nServer dry-run: FAIL\n"));
        assert!(text.contains("Summary: 0 passed, 3 failed"));
        assert!(text.ends_with("DO NOT COMMIT - Fix errors first!"));
    }

    #[test]
    fn test_kustomize_report_pass_shows_resource_count() {
        let result = KustomizeResult {
            path: PathBuf::from("/overlays/dev"),
            build: StageOutcome::passed(),
            resource_count: 4,
            dry_run: dry_run(StageOutcome::passed(), StageOutcome::passed()),
        };
        let text = format_kustomize_report(&result, "dev");
        assert!(text.contains("Kustomize build: PASS (4 resources)"));
        assert!(text.ends_with("Summary: 3 passed, 0 failed\n\nAll validations passed. Safe to commit."));
    }

    #[test]
    fn test_helm_report_has_no_summary_line() {
        let result = HelmResult {
            chart_path: PathBuf::from("/charts/web"),
            lint: StageOutcome::passed(),
            render: StageOutcome::passed(),
            resource_count: 3,
            dry_run: dry_run(
                StageOutcome::passed(),
                StageOutcome::Passed {
                    warnings: vec!["Warning: deprecated".to_string()],
                },
            ),
        };
        let text = format_helm_report(
            &result,
            "dev",
            Some(Path::new("/charts/web/values.yaml")),
            Some("web"),
        );
        assert!(text.starts_with(
            "Helm Chart Dry-Run Validation\nContext: dev\nChart: /charts/web\nValues: /charts/web/values.yaml\nNamespace: web\n"
        ));
        assert!(text.contains("Helm template: PASS (3 resources)"));
        assert!(text.contains("Server dry-run: PASS (with warnings)\n  Warning: Warning: deprecated"));
        assert!(!text.contains("Summary:"));
        assert!(text.ends_with(&format!("{}\n{SAFE_TO_COMMIT}", "=".repeat(50))));
    }

    #[test]
    fn test_kubeconform_report() {
        let report = KubeconformReport::new(
            "/m",
            vec![
                KubeconformResource {
                    kind: "Deployment".into(),
                    name: "web".into(),
                    version: "apps/v1".into(),
                    status: ResourceStatus::Invalid,
                    msg: "spec.replicas: want integer\nspec.selector: required".into(),
                    ..Default::default()
                },
                KubeconformResource {
                    kind: "List".into(),
                    status: ResourceStatus::Skipped,
                    ..Default::default()
                },
            ],
        );
        let text = format_kubeconform_report(&report, "1.29.0", true);
        assert!(text.starts_with(
            "Kubeconform Schema Validation\nPath: /m\nKubernetes version: 1.29.0\nStrict mode: enabled\n"
        ));
        assert!(text.contains(
            "  Deployment/web (apps/v1): INVALID\n    spec.replicas: want integer\n    spec.selector: required\n"
        ));
        assert!(text.contains("  List: SKIPPED\n"));
        assert!(text.contains("Summary: 0 valid, 1 invalid, 0 errors, 1 skipped"));
        assert!(text.ends_with(DO_NOT_COMMIT_SCHEMA));
    }

    #[test]
    fn test_kubeconform_report_empty() {
        let text = format_kubeconform_report(&KubeconformReport::new("/m", vec![]), "master", false);
        assert!(!text.contains("Kubernetes version"));
        assert!(text.contains("No resources found to validate."));
        assert!(text.ends_with(SAFE_TO_COMMIT));
    }

    #[test]
    fn test_kubeconform_report_tool_failure() {
        let mut report = KubeconformReport::new("/m", vec![]);
        report.failure = Some("kubeconform exited with code 1: unknown kubernetes version".into());
        let text = format_kubeconform_report(&report, "9.99", false);
        assert!(text.contains("Error: kubeconform exited with code 1: unknown kubernetes version\n"));
        assert!(!text.contains("No resources found"));
        assert!(text.ends_with(DO_NOT_COMMIT_SCHEMA));
    }

    #[test]
    fn test_yaml_report_lines() {
        let report = YamlReport {
            path: PathBuf::from("/y"),
            files: vec![
                YamlFileResult {
                    file: PathBuf::from("/y/a.yaml"),
                    errors: vec![],
                    warnings: vec![],
                    document_count: 1,
                },
                YamlFileResult {
                    file: PathBuf::from("/y/b.yaml"),
                    errors: vec!["line 2, column 1: bad".into()],
                    warnings: vec!["line 1: tab character used for indentation".into()],
                    document_count: 0,
                },
                YamlFileResult {
                    file: PathBuf::from("/y/c.yaml"),
                    errors: vec![],
                    warnings: vec!["line 3: tab character used for indentation".into()],
                    document_count: 2,
                },
            ],
        };
        let text = format_yaml_report(&report);
        assert!(text.contains("  /y/a.yaml: PASS (1 documents)\n\n"));
        assert!(text.contains(
            "  /y/b.yaml: FAIL\n    Error: line 2, column 1: bad\n    Warning: line 1: tab character used for indentation\n\n"
        ));
        assert!(text.contains("  /y/c.yaml: PASS with warnings (2 documents)\n    Warning: line 3"));
        assert!(text.contains("Summary: 2 valid, 1 invalid (3 files)"));
        assert!(text.ends_with(DO_NOT_COMMIT_YAML));
    }

    #[test]
    fn test_argocd_list_report() {
        let list = ArgoAppList {
            namespace: "argocd".into(),
            apps: vec![ArgoAppSummary {
                name: "web".into(),
                namespace: "argocd".into(),
                project: "default".into(),
                sync_status: "Synced".into(),
                health_status: "Healthy".into(),
                source: ArgoSource {
                    repo_url: "https://git.example/apps".into(),
                    path: String::new(),
                    target_revision: "main".into(),
                },
            }],
        };
        let text = format_argocd_list(&list, "dev");
        assert!(text.contains("Namespace: argocd\n"));
        assert!(text.contains(
            "  web\n    Project: default\n    Sync: Synced  Health: Healthy\n    Repo: https://git.example/apps\n    Revision: main\n\n"
        ));
        assert!(!text.contains("    Path:"));
        assert!(text.ends_with("Total: 1 application(s)"));

        let empty = ArgoAppList {
            namespace: "argocd".into(),
            apps: vec![],
        };
        assert!(format_argocd_list(&empty, "dev").contains("No ArgoCD applications found."));
    }

    #[test]
    fn test_argocd_detail_report() {
        let app = ArgoAppDetail {
            name: "web".into(),
            namespace: "argocd".into(),
            project: "team".into(),
            sync_status: "OutOfSync".into(),
            health_status: "Degraded".into(),
            sync_revision: "abc123".into(),
            health_message: String::new(),
            source: ArgoSource::default(),
            resources: vec![
                ArgoResourceStatus {
                    kind: "Deployment".into(),
                    namespace: "web".into(),
                    name: "web".into(),
                    status: "OutOfSync".into(),
                    health: "Degraded".into(),
                },
                ArgoResourceStatus {
                    kind: "ClusterRole".into(),
                    name: "reader".into(),
                    status: "Synced".into(),
                    ..Default::default()
                },
            ],
            conditions: vec!["SyncError: failed".into()],
        };
        let text = format_argocd_detail(&app, "dev");
        assert!(text.contains("  Sync Revision: abc123\n"));
        assert!(!text.contains("Health Message"));
        assert!(text.contains("Conditions:\n  - SyncError: failed\n\n"));
        assert!(text.contains("  Deployment/web (web): sync=OutOfSync health=Degraded\n"));
        assert!(text.contains("  ClusterRole/reader: sync=Synced health=\n"));
    }

    #[test]
    fn test_argocd_diff_report() {
        let in_sync = format_argocd_diff(&ArgoDiff::InSync, "dev", "web");
        assert!(in_sync.contains("IN SYNC"));

        let out = format_argocd_diff(
            &ArgoDiff::OutOfSync {
                diff: "-a\n+b".into(),
            },
            "dev",
            "web",
        );
        assert!(out.contains("OUT OF SYNC - differences detected:\n\n-a\n+b\n\n"));
    }
}
