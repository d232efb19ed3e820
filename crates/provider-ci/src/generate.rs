//! The per-provider file set.
//!
//! Pure construction: nothing here serializes or touches the filesystem
//! apart from loading the provider's options through a [`ConfigLoader`].

use provider_ci_core::{ConfigLoader, Options, Result, load_options};
use provider_ci_github::{Workflow, workflows};
use provider_ci_release::GoreleaserConfig;
use serde::Serialize;
use std::path::PathBuf;

const WORKFLOWS_DIR: &str = ".github/workflows";

/// A document destined for one file of a provider repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// A GitHub Actions workflow.
    Workflow(Workflow),
    /// A GoReleaser configuration.
    Goreleaser(GoreleaserConfig),
}

/// A document and the repository-relative path it is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFile {
    /// Path relative to the provider repository root.
    pub path: PathBuf,
    /// Document to serialize at `path`.
    pub document: Document,
}

impl ProviderFile {
    fn workflow(file_name: &str, workflow: Workflow) -> Self {
        Self {
            path: PathBuf::from(WORKFLOWS_DIR).join(file_name),
            document: Document::Workflow(workflow),
        }
    }

    fn goreleaser(file_name: &str, config: GoreleaserConfig) -> Self {
        Self {
            path: PathBuf::from(file_name),
            document: Document::Goreleaser(config),
        }
    }
}

/// Every file generated for a provider, in a fixed order.
#[must_use]
pub fn provider_files(opts: &Options) -> Vec<ProviderFile> {
    vec![
        ProviderFile::workflow(
            "artifact-cleanup.yml",
            workflows::artifact_cleanup("cleanup", opts),
        ),
        ProviderFile::workflow(
            "command-dispatch.yml",
            workflows::command_dispatch("command-dispatch", opts),
        ),
        ProviderFile::workflow(
            "pull-request.yml",
            workflows::pull_request("pull-request", opts),
        ),
        ProviderFile::workflow(
            "run-acceptance-tests.yml",
            workflows::run_acceptance_tests("run-acceptance-tests", opts),
        ),
        ProviderFile::workflow(
            "weekly-pulumi-update.yml",
            workflows::weekly_pulumi_update("weekly-pulumi-update", opts),
        ),
        ProviderFile::workflow("build.yml", workflows::build("build", opts)),
        ProviderFile::workflow(
            "prerelease.yml",
            workflows::prerelease("prerelease", opts),
        ),
        ProviderFile::workflow("release.yml", workflows::release("release", opts)),
        ProviderFile::goreleaser(
            ".goreleaser.prerelease.yml",
            GoreleaserConfig::prerelease(opts),
        ),
        ProviderFile::goreleaser(".goreleaser.yml", GoreleaserConfig::release(opts)),
    ]
}

/// Load `provider`'s options and build its files.
///
/// Dependencies that do not resolve within their workflow are logged, not
/// rejected.
pub fn build_provider_files(loader: &dyn ConfigLoader, provider: &str) -> Result<Vec<ProviderFile>> {
    let opts = load_options(loader, provider)?;
    let files = provider_files(&opts);

    for file in &files {
        if let Document::Workflow(workflow) = &file.document {
            for (job, dependency) in workflow.unresolved_needs() {
                tracing::warn!(
                    provider,
                    workflow = %workflow.name,
                    job = %job,
                    dependency = %dependency,
                    "Job depends on a job that is not part of the workflow"
                );
            }
        }
        tracing::debug!(provider, path = %file.path.display(), "Built document");
    }

    tracing::info!(provider, files = files.len(), "Built provider files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_ci_core::Error;

    struct StaticLoader(&'static str);

    impl ConfigLoader for StaticLoader {
        fn load_document(&self, provider: &str) -> Result<serde_yaml::Value> {
            if provider == "widget" {
                serde_yaml::from_str(self.0).map_err(|e| Error::Parse {
                    path: None,
                    message: e.to_string(),
                })
            } else {
                Err(Error::UnknownProvider {
                    provider: provider.to_string(),
                    config_path: PathBuf::from(provider).join("config.yaml"),
                })
            }
        }

        fn providers(&self) -> Result<Vec<String>> {
            Ok(vec!["widget".to_string()])
        }
    }

    #[test]
    fn test_fixed_paths_in_order() {
        let files = provider_files(&Options::new("widget"));
        let paths: Vec<_> = files
            .iter()
            .map(|f| f.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            [
                ".github/workflows/artifact-cleanup.yml",
                ".github/workflows/command-dispatch.yml",
                ".github/workflows/pull-request.yml",
                ".github/workflows/run-acceptance-tests.yml",
                ".github/workflows/weekly-pulumi-update.yml",
                ".github/workflows/build.yml",
                ".github/workflows/prerelease.yml",
                ".github/workflows/release.yml",
                ".goreleaser.prerelease.yml",
                ".goreleaser.yml",
            ]
        );
    }

    #[test]
    fn test_document_kinds() {
        let files = provider_files(&Options::new("widget"));
        assert!(files[..8]
            .iter()
            .all(|f| matches!(f.document, Document::Workflow(_))));
        assert!(files[8..]
            .iter()
            .all(|f| matches!(f.document, Document::Goreleaser(_))));
    }

    #[test]
    fn test_build_provider_files() {
        let loader = StaticLoader("provider: widget\nlint: false\n");
        let files = build_provider_files(&loader, "widget").unwrap();
        assert_eq!(files, provider_files(&Options::new("widget").with_lint(false)));
    }

    #[test]
    fn test_unknown_provider() {
        let loader = StaticLoader("provider: widget\n");
        let err = build_provider_files(&loader, "gadget").unwrap_err();
        assert!(err.is_unknown_provider());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let loader = StaticLoader("provider: widget\nparallel: 0\n");
        let err = build_provider_files(&loader, "widget").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "parallel"));
    }

    #[test]
    fn test_untagged_serialization() {
        let files = provider_files(&Options::new("widget"));
        let yaml = serde_yaml::to_string(&files[9].document).unwrap();
        assert!(yaml.starts_with("archives:"));
        let yaml = serde_yaml::to_string(&files[0].document).unwrap();
        assert!(yaml.starts_with("name: cleanup"));
    }
}
