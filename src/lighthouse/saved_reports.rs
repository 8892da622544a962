//! Loading of saved Lighthouse runs.
//!
//! Lighthouse CI writes every collected run as `lhr-<timestamp>.json`
//! into its working directory (`.lighthouseci` by default).

use crate::models::LighthouseReport;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Default directory Lighthouse CI saves its runs to.
pub const DEFAULT_REPORTS_DIR: &str = ".lighthouseci";

/// Errors raised while loading saved runs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Lighthouse reports directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to parse Lighthouse report {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Whether a file name looks like a saved run (`lhr-<digits>.json`).
pub fn is_saved_report_name(name: &str) -> bool {
    name.strip_prefix("lhr-")
        .and_then(|rest| rest.strip_suffix(".json"))
        .map(|stamp| !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Load all saved runs from `dir`, in file name order.
pub fn load_saved_reports(dir: &Path) -> Result<Vec<LighthouseReport>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDir(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_saved_report_name(&name) {
            paths.push(entry.path().to_path_buf());
        } else {
            debug!("Skipping non-report file: {}", name);
        }
    }
    paths.sort();

    paths.iter().map(|p| load_report(p)).collect()
}

fn load_report(path: &Path) -> Result<LighthouseReport, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str::<serde_json::Value>(&content)
        .and_then(LighthouseReport::from_value)
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_report_name_matching() {
        assert!(is_saved_report_name("lhr-1612345678901.json"));
        assert!(!is_saved_report_name("lhr-.json"));
        assert!(!is_saved_report_name("lhr-123.html"));
        assert!(!is_saved_report_name("lhr-abc.json"));
        assert!(!is_saved_report_name("assertion-results.json"));
    }

    #[test]
    fn test_loads_matching_files_in_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "lhr-200.json", r#"{"finalUrl": "https://b.example/"}"#);
        write(&dir, "lhr-100.json", r#"{"finalUrl": "https://a.example/"}"#);
        write(&dir, "lhr-100.html", "<html></html>");
        write(&dir, "manifest.json", "[]");

        let reports = load_saved_reports(dir.path()).unwrap();
        let urls: Vec<&str> = reports.iter().map(|r| r.final_url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/", "https://b.example/"]);
    }

    #[test]
    fn test_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = load_saved_reports(&missing).unwrap_err();
        assert!(matches!(err, LoadError::MissingDir(_)));
    }

    #[test]
    fn test_invalid_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "lhr-1.json", "{ not json");

        let err = load_saved_reports(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("lhr-1.json"));
    }

    #[test]
    fn test_empty_dir_yields_no_reports() {
        let dir = TempDir::new().unwrap();
        assert!(load_saved_reports(dir.path()).unwrap().is_empty());
    }
}
