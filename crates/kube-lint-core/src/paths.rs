//! Path normalization and manifest discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File names that mark a directory as a Kustomize overlay (case-sensitive).
pub const KUSTOMIZATION_FILENAMES: [&str; 3] =
    ["kustomization.yaml", "kustomization.yml", "Kustomization"];

/// File names that mark a directory as a Helm chart.
pub const CHART_FILENAMES: [&str; 2] = ["Chart.yaml", "chart.yaml"];

const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Expand `~`, make absolute and drop `.` segments.
///
/// Existing paths are canonicalized (symlinks resolved); missing ones are
/// made absolute lexically.
pub fn normalize_path(raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if let Ok(canonical) = std::fs::canonicalize(&expanded) {
        return canonical;
    }
    std::path::absolute(&expanded).unwrap_or(expanded)
}

pub fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| YAML_EXTENSIONS.contains(&e))
}

/// YAML files under `path`, searched recursively, sorted.
///
/// A file path yields itself when it has a YAML extension.
pub fn find_yaml_files_recursive(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return if has_yaml_extension(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        };
    }
    if !path.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_yaml_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// YAML files directly inside `path` (no recursion), sorted.
pub fn find_yaml_files_shallow(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return if has_yaml_extension(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && has_yaml_extension(p))
        .collect();
    files.sort();
    files
}

/// Directory a marker check applies to: the path itself, or a file's parent.
fn marker_dir(path: &Path) -> Option<&Path> {
    if path.is_dir() {
        Some(path)
    } else if path.is_file() {
        path.parent()
    } else {
        None
    }
}

/// Whether `path` is a Helm chart directory or a file inside one.
pub fn is_helm_chart(path: &Path) -> bool {
    marker_dir(path).is_some_and(|dir| CHART_FILENAMES.iter().any(|n| dir.join(n).exists()))
}

/// Whether `path` is a Kustomize overlay directory or its kustomization file.
pub fn is_kustomization(path: &Path) -> bool {
    if path.is_file() {
        return path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| KUSTOMIZATION_FILENAMES.contains(&n));
    }
    path.is_dir()
        && KUSTOMIZATION_FILENAMES
            .iter()
            .any(|n| path.join(n).exists())
}

/// The overlay directory for a kustomization path.
pub fn kustomize_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn normalize_expands_home_and_is_absolute() {
        let p = normalize_path("~/some/manifests");
        assert!(p.is_absolute());
        assert!(!p.to_string_lossy().contains('~'));
    }

    #[test]
    fn normalize_drops_dot_segments() {
        let p = normalize_path(".");
        assert!(p.is_absolute());
        assert!(!p.to_string_lossy().contains("/."));
    }

    #[test]
    fn recursive_discovery_is_sorted_and_filters_extensions() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.yml"), "a: 1").unwrap();
        fs::write(dir.path().join("a.yaml"), "a: 1").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("nested/c.yaml"), "a: 1").unwrap();

        let files = find_yaml_files_recursive(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.yaml", "b.yml", "nested/c.yaml"]);
    }

    #[test]
    fn shallow_discovery_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.yaml"), "a: 1").unwrap();
        fs::write(dir.path().join("nested/c.yaml"), "a: 1").unwrap();

        assert_eq!(find_yaml_files_shallow(dir.path()), vec![dir.path().join("a.yaml")]);
    }

    #[test]
    fn non_yaml_file_and_missing_path_yield_nothing() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("readme.md");
        fs::write(&txt, "# hi").unwrap();
        assert!(find_yaml_files_recursive(&txt).is_empty());
        assert!(find_yaml_files_shallow(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn helm_chart_detection_accepts_dir_or_file_inside() {
        let dir = TempDir::new().unwrap();
        assert!(!is_helm_chart(dir.path()));
        fs::write(dir.path().join("chart.yaml"), "name: x").unwrap();
        fs::write(dir.path().join("values.yaml"), "a: 1").unwrap();
        assert!(is_helm_chart(dir.path()));
        assert!(is_helm_chart(&dir.path().join("values.yaml")));
    }

    #[test]
    fn kustomization_detection() {
        let dir = TempDir::new().unwrap();
        assert!(!is_kustomization(dir.path()));
        fs::write(dir.path().join("Kustomization"), "resources: []").unwrap();
        assert!(is_kustomization(dir.path()));
        assert!(is_kustomization(&dir.path().join("Kustomization")));
        assert_eq!(kustomize_dir(&dir.path().join("Kustomization")), dir.path());

        fs::write(dir.path().join("deploy.yaml"), "a: 1").unwrap();
        assert!(!is_kustomization(&dir.path().join("deploy.yaml")));
    }
}
