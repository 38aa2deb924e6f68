//! Pipeline stage definitions and outcomes.

use kube_lint_core::RunOutcome;
use serde::Serialize;

/// Named steps of the rendering and dry-run pipelines.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// helm lint <chart>
    HelmLint,

    /// helm template <release> <chart>
    HelmTemplate,

    /// kubectl kustomize <dir>
    KustomizeBuild,

    /// kubectl apply --dry-run=client
    ClientDryRun,

    /// kubectl apply --dry-run=server
    ServerDryRun,
}

impl Stage {
    /// Label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::HelmLint => "Helm lint",
            Stage::HelmTemplate => "Helm template",
            Stage::KustomizeBuild => "Kustomize build",
            Stage::ClientDryRun => "Client dry-run",
            Stage::ServerDryRun => "Server dry-run",
        }
    }
}

/// How a stage ended.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Passed { warnings: Vec<String> },

    /// `error` is absent when the collaborator said nothing.
    Failed { error: Option<String> },

    /// Skipped because an earlier stage failed.
    NotRun,
}

impl StageOutcome {
    pub fn passed() -> Self {
        Self::Passed {
            warnings: Vec::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::Failed {
            error: Some(error).filter(|e| !e.is_empty()),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Passed { warnings } => warnings,
            _ => &[],
        }
    }
}

/// Stage outcome for a collaborator run where any non-zero exit fails.
///
/// `tool` names the executable in the not-found message.
pub(crate) fn outcome_from_run(run: &RunOutcome, tool: &str) -> StageOutcome {
    match run {
        RunOutcome::Exited(out) if out.success() => StageOutcome::passed(),
        RunOutcome::Exited(out) => StageOutcome::failed(out.error_text()),
        RunOutcome::TimedOut { .. } => StageOutcome::failed("Timeout during validation"),
        RunOutcome::NotFound { .. } => StageOutcome::failed(format!("{tool} not found")),
    }
}
