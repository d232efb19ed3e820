//! Serializing provider files and syncing them with a repository checkout.

use crate::generate::ProviderFile;
use provider_ci_core::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Header prepended to every generated file.
pub const GENERATED_HEADER: &str =
    "# Generated by provider-ci - do not edit manually\n# Regenerate with: provider-ci generate\n\n";

/// Serialize a provider file to its on-disk text.
pub fn render(file: &ProviderFile) -> Result<String> {
    let yaml = serde_yaml::to_string(&file.document)
        .map_err(|e| Error::Serialization(format!("{}: {e}", file.path.display())))?;
    Ok(format!("{GENERATED_HEADER}{yaml}"))
}

/// Write every file under `root`, creating parent directories as needed.
pub fn write_files(root: &Path, files: &[ProviderFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let content = render(file)?;
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(path = %path.display(), "Wrote generated file");
        written.push(path);
    }
    Ok(written)
}

/// How a file on disk differs from what would be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    /// The file does not exist.
    Missing,
    /// The file exists with different content.
    Differs,
}

/// A generated file that is out of date on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    /// Path of the stale file, joined onto the checked root.
    pub path: PathBuf,
    /// What is wrong with it.
    pub kind: DriftKind,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            DriftKind::Missing => "missing",
            DriftKind::Differs => "out of date",
        };
        write!(f, "{}: {label}", self.path.display())
    }
}

/// Compare the files under `root` with what would be written, without writing.
///
/// Returns one [`Drift`] per stale file; an empty result means `root` is up to date.
pub fn check_files(root: &Path, files: &[ProviderFile]) -> Result<Vec<Drift>> {
    let mut drift = Vec::new();
    for file in files {
        let expected = render(file)?;
        let path = root.join(&file.path);
        let kind = match std::fs::read_to_string(&path) {
            Ok(actual) if actual == expected => continue,
            Ok(_) => DriftKind::Differs,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DriftKind::Missing,
            Err(e) => return Err(Error::io(&path, e)),
        };
        tracing::debug!(path = %path.display(), ?kind, "Generated file drifted");
        drift.push(Drift { path, kind });
    }
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::provider_files;
    use provider_ci_core::Options;
    use tempfile::TempDir;

    #[test]
    fn test_render_has_header() {
        let files = provider_files(&Options::new("widget"));
        let text = render(&files[0]).unwrap();
        assert!(text.starts_with("# Generated by provider-ci"));
        assert!(text.contains("name: cleanup"));
    }

    #[test]
    fn test_write_then_check_is_clean() {
        let temp = TempDir::new().unwrap();
        let files = provider_files(&Options::new("widget"));

        let written = write_files(temp.path(), &files).unwrap();
        assert_eq!(written.len(), files.len());
        assert!(temp.path().join(".github/workflows/build.yml").is_file());
        assert!(temp.path().join(".goreleaser.yml").is_file());

        assert!(check_files(temp.path(), &files).unwrap().is_empty());
    }

    #[test]
    fn test_check_reports_missing_and_differs() {
        let temp = TempDir::new().unwrap();
        let files = provider_files(&Options::new("widget"));
        write_files(temp.path(), &files).unwrap();

        std::fs::remove_file(temp.path().join(".goreleaser.yml")).unwrap();
        std::fs::write(temp.path().join(".github/workflows/build.yml"), "name: old\n").unwrap();

        let drift = check_files(temp.path(), &files).unwrap();
        assert_eq!(
            drift,
            vec![
                Drift {
                    path: temp.path().join(".github/workflows/build.yml"),
                    kind: DriftKind::Differs,
                },
                Drift {
                    path: temp.path().join(".goreleaser.yml"),
                    kind: DriftKind::Missing,
                },
            ]
        );
    }

    #[test]
    fn test_option_change_is_drift() {
        let temp = TempDir::new().unwrap();
        write_files(temp.path(), &provider_files(&Options::new("widget"))).unwrap();

        let changed = provider_files(&Options::new("widget").with_lint(false));
        let drift = check_files(temp.path(), &changed).unwrap();
        let stale: Vec<_> = drift.iter().map(|d| d.path.clone()).collect();
        assert_eq!(
            stale,
            vec![
                temp.path().join(".github/workflows/run-acceptance-tests.yml"),
                temp.path().join(".github/workflows/build.yml"),
            ]
        );
    }

    #[test]
    fn test_drift_display() {
        let drift = Drift {
            path: PathBuf::from("build.yml"),
            kind: DriftKind::Missing,
        };
        assert_eq!(drift.to_string(), "build.yml: missing");
    }
}
