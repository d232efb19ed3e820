//! Per-provider options schema.
//!
//! Each provider ships a `config.yaml` next to its sources. The document is
//! deserialized into [`Options`] with a default for every field except
//! `provider`, then checked by [`Options::validate`]. Unknown keys are
//! tolerated so that config files can carry settings for other tools.

use crate::env::EnvMap;
use crate::error::{Error, Result};
use serde::Deserialize;

/// Validated options for a single provider.
///
/// Construct with [`Options::from_yaml_str`] / [`Options::from_value`] when
/// reading a config file, or [`Options::new`] plus the `with_*` helpers when
/// building one in code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Options {
    /// Provider identifier (e.g. `aws`, `widget`)
    #[serde(default)]
    pub provider: String,

    /// Base branch for automated update pull requests
    #[serde(rename = "provider-default-branch", default = "default_branch")]
    pub default_branch: String,

    /// Timeout passed to golangci-lint
    #[serde(rename = "golangci-timeout", default = "default_golangci_timeout")]
    pub golangci_timeout: String,

    /// Go module major version of the provider
    #[serde(rename = "major-version", default)]
    pub major_version: u32,

    /// Extra linker flags appended to the release build
    #[serde(rename = "customLdFlag", default)]
    pub custom_ld_flag: String,

    /// Skip the windows/arm64 release build
    #[serde(rename = "skipWindowsArmBuild", default)]
    pub skip_windows_arm_build: bool,

    /// Workflow environment overrides, merged over the base environment
    #[serde(default)]
    pub env: EnvMap,

    /// Start docker-compose services before running tests
    #[serde(default)]
    pub docker: bool,

    /// Configure AWS credentials for tests
    #[serde(default)]
    pub aws: bool,

    /// Authenticate to Google Cloud for tests
    #[serde(default)]
    pub gcp: bool,

    /// Initialize git submodules before building
    #[serde(default)]
    pub submodules: bool,

    /// Add a lint job and gate the pipeline on it
    #[serde(default = "default_true")]
    pub lint: bool,

    /// Script run before the test suite
    #[serde(rename = "setup-script", default)]
    pub setup_script: Option<String>,

    /// GoReleaser build parallelism
    #[serde(default = "default_parallel")]
    pub parallel: u32,

    /// GoReleaser timeout in minutes
    #[serde(default = "default_timeout")]
    pub timeout: u32,

    /// Go import path of the version variable set through ldflags
    #[serde(rename = "providerVersion", default)]
    pub provider_version: String,

    /// Skip codegen while building SDKs
    #[serde(rename = "skipCodegen", default)]
    pub skip_codegen: bool,

    /// Pin for the Pulumi CLI install step
    #[serde(rename = "pulumiCLIVersion", default)]
    pub pulumi_cli_version: Option<String>,

    /// The provider provisions a dedicated test cluster
    #[serde(rename = "test-infrastructure", default)]
    pub test_infrastructure: bool,

    /// Runner for SDK build and test jobs
    #[serde(rename = "sdk-runner", default = "default_sdk_runner")]
    pub sdk_runner: String,

    /// Runner for binary publish jobs
    #[serde(rename = "publish-runner", default = "default_publish_runner")]
    pub publish_runner: String,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_golangci_timeout() -> String {
    "20m".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_parallel() -> u32 {
    3
}

const fn default_timeout() -> u32 {
    60
}

fn default_sdk_runner() -> String {
    "pulumi-ubuntu-8core".to_string()
}

fn default_publish_runner() -> String {
    "ubuntu-latest".to_string()
}

impl Options {
    /// Options for `provider` with every other field at its default.
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            default_branch: default_branch(),
            golangci_timeout: default_golangci_timeout(),
            major_version: 0,
            custom_ld_flag: String::new(),
            skip_windows_arm_build: false,
            env: EnvMap::new(),
            docker: false,
            aws: false,
            gcp: false,
            submodules: false,
            lint: true,
            setup_script: None,
            parallel: default_parallel(),
            timeout: default_timeout(),
            provider_version: String::new(),
            skip_codegen: false,
            pulumi_cli_version: None,
            test_infrastructure: false,
            sdk_runner: default_sdk_runner(),
            publish_runner: default_publish_runner(),
        }
    }

    /// Parse and validate options from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| Error::Parse {
                path: None,
                message: e.to_string(),
            })?;
        Self::from_value(value)
    }

    /// Deserialize and validate options from an untyped YAML document.
    ///
    /// Type errors name the offending field path.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self> {
        let options: Self = serde_path_to_error::deserialize(value).map_err(|e| {
            let path = e.path().to_string();
            let field = if path.is_empty() || path == "." {
                "config".to_string()
            } else {
                path
            };
            Error::validation(field, e.into_inner().to_string())
        })?;
        options.validate()
    }

    /// Check constraints that the type system does not express.
    ///
    /// Fails on the first violation.
    pub fn validate(self) -> Result<Self> {
        if self.provider.trim().is_empty() {
            return Err(Error::validation(
                "provider",
                "required field is missing or empty",
            ));
        }
        if self.parallel == 0 {
            return Err(Error::validation("parallel", "expected an integer >= 1"));
        }
        if self.timeout == 0 {
            return Err(Error::validation("timeout", "expected an integer >= 1"));
        }
        for (key, value) in &self.env {
            if matches!(
                value,
                serde_yaml::Value::Mapping(_)
                    | serde_yaml::Value::Sequence(_)
                    | serde_yaml::Value::Tagged(_)
            ) {
                return Err(Error::validation(
                    format!("env.{key}"),
                    "expected a string, number or boolean",
                ));
            }
        }
        if let Some(script) = &self.setup_script
            && script.trim().is_empty()
        {
            return Err(Error::validation(
                "setup-script",
                "expected a non-empty command when set",
            ));
        }
        Ok(self)
    }

    /// Toggle the lint job.
    #[must_use]
    pub fn with_lint(mut self, lint: bool) -> Self {
        self.lint = lint;
        self
    }

    /// Toggle docker test services.
    #[must_use]
    pub fn with_docker(mut self, docker: bool) -> Self {
        self.docker = docker;
        self
    }

    /// Toggle AWS test credentials.
    #[must_use]
    pub fn with_aws(mut self, aws: bool) -> Self {
        self.aws = aws;
        self
    }

    /// Toggle Google Cloud test credentials.
    #[must_use]
    pub fn with_gcp(mut self, gcp: bool) -> Self {
        self.gcp = gcp;
        self
    }

    /// Toggle submodule initialization.
    #[must_use]
    pub fn with_submodules(mut self, submodules: bool) -> Self {
        self.submodules = submodules;
        self
    }

    /// Toggle the dedicated test cluster.
    #[must_use]
    pub fn with_test_infrastructure(mut self, enabled: bool) -> Self {
        self.test_infrastructure = enabled;
        self
    }

    /// Set the Go module major version.
    #[must_use]
    pub fn with_major_version(mut self, major: u32) -> Self {
        self.major_version = major;
        self
    }

    /// Pin the Pulumi CLI version.
    #[must_use]
    pub fn with_pulumi_cli_version(mut self, version: impl Into<String>) -> Self {
        self.pulumi_cli_version = Some(version.into());
        self
    }

    /// Set the pre-test setup script.
    #[must_use]
    pub fn with_setup_script(mut self, script: impl Into<String>) -> Self {
        self.setup_script = Some(script.into());
        self
    }

    /// Add a workflow environment override.
    #[must_use]
    pub fn with_env(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_yaml::Value>,
    ) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_applies_defaults() {
        let opts = Options::from_yaml_str("provider: widget\n").unwrap();
        assert_eq!(opts, Options::new("widget"));
        assert_eq!(opts.default_branch, "master");
        assert_eq!(opts.golangci_timeout, "20m");
        assert_eq!(opts.parallel, 3);
        assert_eq!(opts.timeout, 60);
        assert!(opts.lint);
        assert!(!opts.docker);
        assert!(opts.env.is_empty());
        assert!(opts.pulumi_cli_version.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
provider: kubernetes
provider-default-branch: main
golangci-timeout: 30m
major-version: 4
customLdFlag: "-X foo=bar"
skipWindowsArmBuild: true
env:
  FOO: bar
  ANSWER: 42
docker: true
aws: true
gcp: true
submodules: true
lint: false
setup-script: testing/setup.sh
parallel: 2
timeout: 90
providerVersion: github.com/pulumi/pulumi-kubernetes/provider/v4/pkg/version.Version
skipCodegen: true
pulumiCLIVersion: 3.90.0
test-infrastructure: true
sdk-runner: ubuntu-latest
publish-runner: macos-11
"#;
        let opts = Options::from_yaml_str(yaml).unwrap();
        assert_eq!(opts.provider, "kubernetes");
        assert_eq!(opts.default_branch, "main");
        assert_eq!(opts.major_version, 4);
        assert!(opts.skip_windows_arm_build);
        assert_eq!(opts.env.len(), 2);
        assert_eq!(
            opts.env.get("ANSWER"),
            Some(&serde_yaml::Value::Number(42.into()))
        );
        assert!(!opts.lint);
        assert_eq!(opts.setup_script.as_deref(), Some("testing/setup.sh"));
        assert_eq!(opts.parallel, 2);
        assert_eq!(opts.pulumi_cli_version.as_deref(), Some("3.90.0"));
        assert!(opts.test_infrastructure);
        assert_eq!(opts.publish_runner, "macos-11");
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let opts = Options::from_yaml_str("provider: widget\nmakeTemplate: bridged\n").unwrap();
        assert_eq!(opts.provider, "widget");
    }

    #[test]
    fn test_missing_provider() {
        let err = Options::from_yaml_str("lint: true\n").unwrap_err();
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "provider"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_type_error_names_field() {
        let err = Options::from_yaml_str("provider: widget\nparallel: three\n").unwrap_err();
        match err {
            Error::Validation { field, reason } => {
                assert_eq!(field, "parallel");
                assert!(reason.contains("invalid type"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bool_type_error() {
        let err = Options::from_yaml_str("provider: widget\nlint: sometimes\n").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "lint"));
    }

    #[test]
    fn test_zero_parallel_rejected() {
        let err = Options::from_yaml_str("provider: widget\nparallel: 0\n").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "parallel"));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let err = Options::from_yaml_str("provider: widget\ntimeout: -5\n").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "timeout"));
    }

    #[test]
    fn test_nested_env_value_rejected() {
        let err =
            Options::from_yaml_str("provider: widget\nenv:\n  FOO:\n    nested: true\n").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "env.FOO"));
    }

    #[test]
    fn test_non_mapping_document() {
        let err = Options::from_yaml_str("just a string\n").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "config"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Options::from_yaml_str("provider: [unclosed\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_derivation_helpers() {
        let opts = Options::new("widget")
            .with_lint(false)
            .with_test_infrastructure(true)
            .with_env("FOO", "bar");
        assert!(!opts.lint);
        assert!(opts.test_infrastructure);
        assert_eq!(opts.env.len(), 1);
    }
}
