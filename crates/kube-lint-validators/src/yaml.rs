//! YAML syntax validation (no collaborators involved).

use std::path::{Path, PathBuf};

use kube_lint_core::parse::validate_content;
use kube_lint_core::paths::find_yaml_files_shallow;
use serde::Serialize;
use tracing::debug;

/// Syntax check result for one file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct YamlFileResult {
    pub file: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub document_count: usize,
}

impl YamlFileResult {
    /// Tab warnings alone do not invalidate a file.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Results for every YAML file at a path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct YamlReport {
    pub path: PathBuf,
    pub files: Vec<YamlFileResult>,
}

impl YamlReport {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn valid_files(&self) -> usize {
        self.files.iter().filter(|f| f.valid()).count()
    }

    pub fn invalid_files(&self) -> usize {
        self.total_files() - self.valid_files()
    }

    pub fn passed(&self) -> bool {
        self.invalid_files() == 0
    }
}

/// Check one file for syntax errors, duplicate keys and tab indentation.
pub fn validate_file(file: &Path) -> YamlFileResult {
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            return YamlFileResult {
                file: file.to_path_buf(),
                errors: vec![format!("Cannot read file: {e}")],
                warnings: Vec::new(),
                document_count: 0,
            }
        }
    };

    let check = validate_content(&content);
    YamlFileResult {
        file: file.to_path_buf(),
        errors: check.errors,
        warnings: check.warnings,
        document_count: check.document_count,
    }
}

/// Validate a YAML file, or the YAML files directly inside a directory.
pub fn validate_yaml(path: &Path) -> YamlReport {
    let files: Vec<YamlFileResult> = find_yaml_files_shallow(path)
        .iter()
        .map(|f| validate_file(f))
        .collect();
    debug!(path = %path.display(), files = files.len(), "YAML validation finished");
    YamlReport {
        path: path.to_path_buf(),
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_mixed_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "a: 1").unwrap();
        fs::write(dir.path().join("b.yaml"), "key: [\n").unwrap();
        fs::write(dir.path().join("c.yml"), "x: 1\nx: 2\n").unwrap();

        let report = validate_yaml(dir.path());

        assert_eq!(report.total_files(), 3);
        assert_eq!(report.valid_files(), 1);
        assert_eq!(report.invalid_files(), 2);
        assert!(!report.passed());
        assert!(report.files[0].valid());
        assert_eq!(report.files[0].document_count, 1);
        assert!(report.files[1].errors[0].starts_with("line "));
    }

    #[test]
    fn test_tab_after_content_is_not_an_indentation_warning() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("list.yaml");
        fs::write(&file, "items:\n- a\n- b # \ttrailing tab\n").unwrap();

        let result = validate_file(&file);
        assert!(result.valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let result = validate_file(&dir.path().join("missing.yaml"));
        assert!(!result.valid());
        assert!(result.errors[0].starts_with("Cannot read file: "));
    }

    #[test]
    fn test_empty_directory_passes() {
        let dir = TempDir::new().unwrap();
        let report = validate_yaml(dir.path());
        assert_eq!(report.total_files(), 0);
        assert!(report.passed());
    }
}
