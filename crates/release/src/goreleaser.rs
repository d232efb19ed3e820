//! Builders for the pre-release and full-release GoReleaser documents.

use crate::config::{
    Archive, Before, Blob, Build, Changelog, GoreleaserConfig, Platform, PrereleaseMode, Release,
    Snapshot,
};
use provider_ci_core::Options;

const ARCHIVE_ID: &str = "archive";
const GOOS: [&str; 3] = ["darwin", "windows", "linux"];
const GOARCH: [&str; 2] = ["amd64", "arm64"];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Linker flags stamping the release tag into the provider binary.
///
/// An explicit `providerVersion` variable wins; otherwise the conventional
/// `pkg/version.Version` of the provider module is used, with the `/vN`
/// suffix Go requires for major versions above one.
#[must_use]
pub fn ldflags(opts: &Options) -> Vec<String> {
    let version_var = if !opts.provider_version.is_empty() {
        opts.provider_version.clone()
    } else if opts.major_version > 1 {
        format!(
            "github.com/pulumi/pulumi-{}/provider/v{}/pkg/version.Version",
            opts.provider, opts.major_version
        )
    } else {
        format!(
            "github.com/pulumi/pulumi-{}/provider/pkg/version.Version",
            opts.provider
        )
    };

    let mut flags = vec![format!("-X {version_var}={{{{.Tag}}}}")];
    if !opts.custom_ld_flag.is_empty() {
        flags.push(opts.custom_ld_flag.clone());
    }
    flags
}

fn provider_build(opts: &Options) -> Build {
    let ignore = if opts.skip_windows_arm_build {
        vec![Platform {
            goos: "windows".to_string(),
            goarch: "arm64".to_string(),
        }]
    } else {
        Vec::new()
    };

    Build {
        binary: format!("pulumi-resource-{}", opts.provider),
        dir: "provider".to_string(),
        env: strings(&["CGO_ENABLED=0"]),
        goarch: strings(&GOARCH),
        goos: strings(&GOOS),
        ignore,
        ldflags: ldflags(opts),
        main: format!("./cmd/pulumi-resource-{}/", opts.provider),
    }
}

impl GoreleaserConfig {
    fn common(opts: &Options, release: Release, snapshot: Option<Snapshot>) -> Self {
        Self {
            archives: vec![Archive {
                name_template: "{{ .Binary }}-{{ .Tag }}-{{ .Os }}-{{ .Arch }}".to_string(),
                id: ARCHIVE_ID.to_string(),
            }],
            before: Before {
                hooks: strings(&["make codegen"]),
            },
            builds: vec![provider_build(opts)],
            changelog: Changelog { skip: true },
            release,
            snapshot,
            blobs: vec![Blob {
                provider: "s3".to_string(),
                region: "us-west-2".to_string(),
                bucket: "get.pulumi.com".to_string(),
                folder: "releases/plugins/".to_string(),
                ids: vec![ARCHIVE_ID.to_string()],
            }],
        }
    }

    /// Snapshot builds uploaded to blob storage without a GitHub release.
    #[must_use]
    pub fn prerelease(opts: &Options) -> Self {
        tracing::debug!(provider = %opts.provider, "Building pre-release GoReleaser config");
        Self::common(
            opts,
            Release {
                disable: true,
                prerelease: None,
            },
            Some(Snapshot {
                name_template: "{{ .Tag }}-SNAPSHOT".to_string(),
            }),
        )
    }

    /// Tagged builds with a GitHub release.
    #[must_use]
    pub fn release(opts: &Options) -> Self {
        tracing::debug!(provider = %opts.provider, "Building release GoReleaser config");
        Self::common(
            opts,
            Release {
                disable: false,
                prerelease: Some(PrereleaseMode::Auto),
            },
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ldflags() {
        assert_eq!(
            ldflags(&Options::new("widget")),
            vec!["-X github.com/pulumi/pulumi-widget/provider/pkg/version.Version={{.Tag}}"]
        );
    }

    #[test]
    fn test_major_version_ldflags() {
        assert_eq!(
            ldflags(&Options::new("widget").with_major_version(1)),
            ldflags(&Options::new("widget"))
        );
        assert_eq!(
            ldflags(&Options::new("widget").with_major_version(3)),
            vec!["-X github.com/pulumi/pulumi-widget/provider/v3/pkg/version.Version={{.Tag}}"]
        );
    }

    #[test]
    fn test_explicit_version_and_custom_flag() {
        let mut opts = Options::new("widget").with_major_version(3);
        opts.provider_version = "github.com/acme/widget/version.Version".to_string();
        opts.custom_ld_flag = "-s -w".to_string();
        assert_eq!(
            ldflags(&opts),
            vec![
                "-X github.com/acme/widget/version.Version={{.Tag}}",
                "-s -w"
            ]
        );
    }

    #[test]
    fn test_windows_arm_ignore() {
        let config = GoreleaserConfig::release(&Options::new("widget"));
        assert!(config.builds[0].ignore.is_empty());

        let mut opts = Options::new("widget");
        opts.skip_windows_arm_build = true;
        let config = GoreleaserConfig::release(&opts);
        assert_eq!(
            config.builds[0].ignore,
            vec![Platform {
                goos: "windows".to_string(),
                goarch: "arm64".to_string()
            }]
        );
    }

    #[test]
    fn test_prerelease_vs_release() {
        let opts = Options::new("widget");
        let pre = GoreleaserConfig::prerelease(&opts);
        let full = GoreleaserConfig::release(&opts);

        assert!(pre.release.disable);
        assert_eq!(
            pre.snapshot.as_ref().map(|s| s.name_template.as_str()),
            Some("{{ .Tag }}-SNAPSHOT")
        );
        assert!(!full.release.disable);
        assert_eq!(full.release.prerelease, Some(PrereleaseMode::Auto));
        assert!(full.snapshot.is_none());

        assert!(pre.changelog.skip && full.changelog.skip);
        assert_eq!(pre.builds, full.builds);
        assert_eq!(pre.blobs, full.blobs);
        assert_eq!(pre.archives, full.archives);
    }

    #[test]
    fn test_build_targets() {
        let build = provider_build(&Options::new("widget"));
        assert_eq!(build.binary, "pulumi-resource-widget");
        assert_eq!(build.main, "./cmd/pulumi-resource-widget/");
        assert_eq!(build.goos, ["darwin", "windows", "linux"]);
        assert_eq!(build.goarch, ["amd64", "arm64"]);
        assert_eq!(build.env, ["CGO_ENABLED=0"]);
    }

    #[test]
    fn test_serialization() {
        let yaml = serde_yaml::to_string(&GoreleaserConfig::release(&Options::new("widget")))
            .unwrap();
        assert!(yaml.starts_with("archives:\n"));
        assert!(yaml.contains("prerelease: auto"));
        assert!(yaml.contains("bucket: get.pulumi.com"));
        assert!(!yaml.contains("snapshot"));
        assert!(!yaml.contains("ignore"));

        let yaml = serde_yaml::to_string(&GoreleaserConfig::prerelease(&Options::new("widget")))
            .unwrap();
        assert!(yaml.contains("disable: true"));
        assert!(!yaml.contains("prerelease:"));
        assert!(yaml.contains("snapshot:"));
    }
}
