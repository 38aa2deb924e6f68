//! Parsers for collaborator output.

pub mod argocd;
pub mod kubeconform;
pub mod warnings;
pub mod yaml;

pub use argocd::{
    extract_source, parse_app_detail, parse_app_list, ArgoAppDetail, ArgoAppSummary,
    ArgoResourceStatus, ArgoSource,
};
pub use kubeconform::{parse_kubeconform_output, KubeconformResource, ResourceStatus};
pub use warnings::parse_warnings;
pub use yaml::{check_tabs, count_resources, validate_content, YamlCheck, YamlSyntaxError};
