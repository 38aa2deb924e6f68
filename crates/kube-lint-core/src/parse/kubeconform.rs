//! kubeconform `-output json` parsing.
//!
//! kubeconform prints either one wrapped object (`{"resources": [...]}`) or
//! one JSON object per line. Both are accepted; malformed lines are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validation status reported for a single resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceStatus {
    #[serde(rename = "statusValid")]
    Valid,
    #[serde(rename = "statusInvalid")]
    Invalid,
    #[serde(rename = "statusError")]
    Error,
    #[serde(rename = "statusSkipped")]
    Skipped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResourceStatus {
    fn from_wire(s: &str) -> Self {
        match s {
            "statusValid" => Self::Valid,
            "statusInvalid" => Self::Invalid,
            "statusError" => Self::Error,
            "statusSkipped" => Self::Skipped,
            _ => Self::Unknown,
        }
    }

    /// Whether this status blocks a commit.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Invalid | Self::Error)
    }
}

/// One resource record from kubeconform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeconformResource {
    pub filename: String,
    pub kind: String,
    pub name: String,
    pub version: String,
    pub status: ResourceStatus,
    pub msg: String,
}

impl KubeconformResource {
    fn from_value(v: &Value) -> Self {
        let field = |k: &str| v.get(k).and_then(Value::as_str).unwrap_or_default().to_string();
        Self {
            filename: field("filename"),
            kind: field("kind"),
            name: field("name"),
            version: field("version"),
            status: ResourceStatus::from_wire(&field("status")),
            msg: field("msg"),
        }
    }
}

/// Parse kubeconform stdout into resource records.
pub fn parse_kubeconform_output(stdout: &str) -> Vec<KubeconformResource> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Vec::new();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stdout) {
        if let Some(resources) = map.get("resources") {
            return resources
                .as_array()
                .map(|items| items.iter().map(KubeconformResource::from_value).collect())
                .unwrap_or_default();
        }
    }

    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|v| v.as_object().is_some_and(|o| o.contains_key("filename")))
        .map(|v| KubeconformResource::from_value(&v))
        .collect()
}
