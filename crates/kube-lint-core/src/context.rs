//! Kube context selection gate.
//!
//! Cluster-targeting tools only run against a context that a human picked
//! from a freshly presented list:
//!
//! - `list` records when the list was shown;
//! - `select` is refused before any list, or sooner than [`MIN_SELECT_DELAY`]
//!   after the latest one, or for a name the cluster config does not know;
//! - `require` hands the selected context to tools, or refuses.
//!
//! The selection lives only in memory. Commands receive it as an explicit
//! `--context` flag; kubeconfig is never written.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::Timeouts;
use crate::process::{CommandRunner, CommandSpec, RunOutcome};

/// Minimum pause between listing contexts and selecting one.
pub const MIN_SELECT_DELAY: Duration = Duration::from_secs(2);

/// Contexts known to kubectl plus the kubeconfig's current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextListing {
    pub contexts: Vec<String>,
    pub current: Option<String>,
}

impl ContextListing {
    pub fn contains(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c == name)
    }
}

/// Reasons the gate refuses a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error(
        "Error: No contexts have been listed in this session. \
         Call list_kube_contexts first, present the list to the user, \
         and ask which context to use."
    )]
    NotListedYet,

    #[error(
        "Error: select_kube_context was called {elapsed_ms}ms after list_kube_contexts. \
         Present the context list and wait for the user to choose before selecting."
    )]
    TooSoon { elapsed_ms: u64 },

    #[error("{}", render_not_found(.requested, .available, .current.as_deref()))]
    NotFound {
        requested: String,
        available: Vec<String>,
        current: Option<String>,
    },

    #[error(
        "Error: No context selected. Call select_kube_context first.\n\n\
         Use list_kube_contexts to see available contexts."
    )]
    NoContextSelected,
}

fn render_not_found(requested: &str, available: &[String], current: Option<&str>) -> String {
    let mut lines = vec![
        format!("Error: Context '{requested}' not found."),
        String::new(),
        "Available contexts:".to_string(),
    ];
    for ctx in available {
        let marker = if Some(ctx.as_str()) == current {
            " (current global)"
        } else {
            ""
        };
        lines.push(format!("  - {ctx}{marker}"));
    }
    lines.join("\n")
}

/// Per-session selection state.
#[derive(Debug, Clone)]
pub struct ContextGate {
    selected: Option<String>,
    listed_at: Option<Instant>,
    min_delay: Duration,
}

impl Default for ContextGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextGate {
    pub fn new() -> Self {
        Self::with_min_delay(MIN_SELECT_DELAY)
    }

    pub fn with_min_delay(min_delay: Duration) -> Self {
        Self {
            selected: None,
            listed_at: None,
            min_delay,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn listed_at(&self) -> Option<Instant> {
        self.listed_at
    }

    /// Note that the context list was presented at `now`.
    ///
    /// Keeps any existing selection but restarts the wait window.
    pub fn record_listing(&mut self, now: Instant) {
        self.listed_at = Some(now);
    }

    /// Timing checks that must pass before the cluster config is consulted.
    pub fn check_select(&self, now: Instant) -> Result<(), GateError> {
        let listed_at = self.listed_at.ok_or(GateError::NotListedYet)?;
        let elapsed = now.saturating_duration_since(listed_at);
        if elapsed < self.min_delay {
            return Err(GateError::TooSoon {
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }
        Ok(())
    }

    /// Commit `name` if it is one of the listed contexts.
    pub fn commit(&mut self, name: &str, listing: &ContextListing) -> Result<(), GateError> {
        if !listing.contains(name) {
            return Err(GateError::NotFound {
                requested: name.to_string(),
                available: listing.contexts.clone(),
                current: listing.current.clone(),
            });
        }
        info!(context = %name, "Context selected");
        self.selected = Some(name.to_string());
        Ok(())
    }

    /// `check_select` followed by `commit`.
    pub fn select(
        &mut self,
        name: &str,
        listing: &ContextListing,
        now: Instant,
    ) -> Result<(), GateError> {
        self.check_select(now)?;
        self.commit(name, listing)
    }

    /// The selected context, for tools that touch a cluster.
    pub fn require(&self) -> Result<&str, GateError> {
        self.selected.as_deref().ok_or(GateError::NoContextSelected)
    }
}

/// Enumerate kubectl contexts.
///
/// Never fails: if kubectl is missing, times out or errors, the listing is
/// empty and there is no current context.
pub async fn list_contexts(runner: &dyn CommandRunner, timeouts: &Timeouts) -> ContextListing {
    let names = CommandSpec::new(
        "kubectl",
        ["config", "get-contexts", "-o", "name"],
        timeouts.contexts,
    );
    let contexts = match runner.run(&names).await {
        RunOutcome::Exited(out) => out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        RunOutcome::TimedOut { .. } | RunOutcome::NotFound { .. } => {
            debug!("Context enumeration unavailable");
            return ContextListing::default();
        }
    };

    let current_spec = CommandSpec::new("kubectl", ["config", "current-context"], timeouts.contexts);
    let current = match runner.run(&current_spec).await {
        RunOutcome::Exited(out) if out.success() => {
            Some(out.stdout.trim().to_string()).filter(|c| !c.is_empty())
        }
        RunOutcome::Exited(_) => None,
        RunOutcome::TimedOut { .. } | RunOutcome::NotFound { .. } => {
            return ContextListing::default();
        }
    };

    ContextListing { contexts, current }
}
