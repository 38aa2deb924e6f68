//! Collaborator timeouts.
//!
//! Timeouts are fixed per collaborator and only configurable through the
//! environment at process start.

use std::time::Duration;

use tracing::warn;

pub const KUBECTL_TIMEOUT_ENV: &str = "KUBE_LINT_KUBECTL_TIMEOUT";
pub const FLUX_TIMEOUT_ENV: &str = "KUBE_LINT_FLUX_TIMEOUT";
pub const HELM_TIMEOUT_ENV: &str = "KUBE_LINT_HELM_TIMEOUT";
pub const KUBECONFORM_TIMEOUT_ENV: &str = "KUBE_LINT_KUBECONFORM_TIMEOUT";
pub const ARGOCD_TIMEOUT_ENV: &str = "KUBE_LINT_ARGOCD_TIMEOUT";

/// Per-collaborator subprocess timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub kubectl: Duration,
    pub flux: Duration,
    pub helm: Duration,
    pub kubeconform: Duration,
    pub argocd: Duration,
    /// `kubectl config` context enumeration.
    pub contexts: Duration,
    /// ArgoCD namespace auto-detection lookup.
    pub argocd_detect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            kubectl: Duration::from_secs(60),
            flux: Duration::from_secs(60),
            helm: Duration::from_secs(60),
            kubeconform: Duration::from_secs(120),
            argocd: Duration::from_secs(60),
            contexts: Duration::from_secs(10),
            argocd_detect: Duration::from_secs(30),
        }
    }
}

impl Timeouts {
    /// Read overrides from `KUBE_LINT_*_TIMEOUT` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Timeouts::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: Duration| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        variable = key,
                        value = %raw,
                        default_secs = default.as_secs(),
                        "Ignoring invalid timeout override"
                    );
                    default
                }
            },
        };

        Self {
            kubectl: read(KUBECTL_TIMEOUT_ENV, defaults.kubectl),
            flux: read(FLUX_TIMEOUT_ENV, defaults.flux),
            helm: read(HELM_TIMEOUT_ENV, defaults.helm),
            kubeconform: read(KUBECONFORM_TIMEOUT_ENV, defaults.kubeconform),
            argocd: read(ARGOCD_TIMEOUT_ENV, defaults.argocd),
            ..defaults
        }
    }
}
