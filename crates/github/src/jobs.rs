//! Job builders.
//!
//! One builder per pipeline role. Each selects an ordered subset of the
//! [step catalog](crate::steps) for its role, sets the runner, dependencies
//! and guard, and returns a [`Job`] that callers refine with the `with_*`
//! methods before handing it to a workflow.

use crate::steps::{self, CHECKOUT_REPO};
use crate::workflow::{Job, PermissionLevel, Permissions, Step, Strategy};
use provider_ci_core::Options;

/// Job key of the provider build.
pub const PREREQUISITES: &str = "prerequisites";
/// Job key of the per-language SDK build.
pub const BUILD_SDKS: &str = "build_sdks";
/// Job key of the per-language test run.
pub const TEST: &str = "test";
/// Job key of golangci-lint.
pub const LINT: &str = "lint";
/// Job key of the test cluster provisioning job.
pub const PROVISION_CLUSTER: &str = "provision-cluster";
/// Job key of the test cluster teardown job.
pub const TEARDOWN_CLUSTER: &str = "teardown-cluster";
/// Job key of the binary publishing job.
pub const PUBLISH: &str = "publish";
/// Job key of the npm/PyPI/NuGet publishing job.
pub const PUBLISH_SDK: &str = "publish_sdk";
/// Job key of the Java SDK publishing job.
pub const PUBLISH_JAVA_SDK: &str = "publish_java_sdk";
/// Job key of the SDK tagging job.
pub const TAG_SDK: &str = "tag_sdk";
/// Job key of the docs build dispatch job.
pub const DISPATCH_DOCS_BUILD: &str = "dispatch_docs_build";
/// Job key of the gate job.
pub const SENTINEL: &str = "sentinel";
/// Job key of the run-URL comment job.
pub const COMMENT_NOTIFICATION: &str = "comment-notification";
/// Job key of the slash-command dispatcher.
pub const COMMAND_DISPATCH_FOR_TESTING: &str = "command-dispatch-for-testing";
/// Job key of the fork pull request notice.
pub const COMMENT_ON_PR: &str = "comment-on-pr";
/// Job key of the scheduled CLI upgrade.
pub const WEEKLY_PULUMI_UPDATE: &str = "weekly-pulumi-update";
/// Job key of the artifact cleanup.
pub const REMOVE_OLD_ARTIFACTS: &str = "remove-old-artifacts";

/// Guard restricting a job to dispatch events and same-repository pull requests.
pub const DISPATCH_GUARD: &str = "github.event_name == 'repository_dispatch' || \
                                  github.event.pull_request.head.repo.full_name == github.repository";

const TEARDOWN_GUARD: &str =
    "${{ always() }} && github.event.pull_request.head.repo.full_name == github.repository";

/// SDK languages fanned out by the build and test matrices.
pub const LANGUAGES: [&str; 5] = ["nodejs", "python", "dotnet", "go", "java"];

const DEFAULT_RUNNER: &str = "ubuntu-latest";
const GRADLE_VERSION: &str = "7.6";

fn language_matrix() -> Strategy {
    Strategy::single_dimension("language", LANGUAGES)
}

fn oidc_permissions() -> Permissions {
    Permissions {
        contents: Some(PermissionLevel::Read),
        id_token: Some(PermissionLevel::Write),
    }
}

fn pulumi_cli(opts: &Options) -> Step {
    steps::install_pulumi_cli(opts.pulumi_cli_version.as_deref())
}

impl Job {
    /// Replace the generic checkout with a checkout of the pull request head.
    ///
    /// The replacement always lands first, so applying this twice yields the
    /// same steps as applying it once.
    #[must_use]
    pub fn with_pr_checkout(mut self) -> Self {
        self.steps
            .retain(|step| step.name.as_deref() != Some(CHECKOUT_REPO));
        self.steps.insert(0, steps::checkout_repo_at_pr());
        self
    }

    /// Restrict the job to dispatch context and check out the pull request head.
    #[must_use]
    pub fn with_dispatch_guard(self) -> Self {
        self.with_if(DISPATCH_GUARD).with_pr_checkout()
    }
}

/// Builds the provider binary, checks the schema and uploads the binaries.
#[must_use]
pub fn prerequisites(opts: &Options) -> Job {
    Job::new(DEFAULT_RUNNER).with_name(PREREQUISITES).with_steps([
        steps::checkout_repo(),
        steps::checkout_scripts_repo(),
        steps::checkout_tags(),
        steps::install_go(),
        steps::install_pulumictl(),
        pulumi_cli(opts),
        steps::install_schema_checker(),
        steps::init_submodules(opts.submodules),
        steps::build_codegen_binaries(opts.skip_codegen),
        steps::build_schema(),
        steps::check_schema_changes(),
        steps::comment_schema_changes_on_pr(),
        steps::label_if_no_breaking_changes(),
        steps::build_provider(),
        steps::check_clean_worktree(),
        steps::porcelain(),
        steps::tar_provider_binaries(),
        steps::upload_provider_binaries(),
        steps::test_provider_library(),
        steps::codecov(),
        steps::notify_slack("Failure in building provider prerequisites"),
    ])
}

/// Generates, builds and uploads one SDK per language.
///
/// `tag` marks tag-triggered workflows, whose SDK artifacts keep the default
/// retention.
#[must_use]
pub fn build_sdks(opts: &Options, tag: bool) -> Job {
    Job::new(opts.sdk_runner.clone())
        .with_name(BUILD_SDKS)
        .with_need(PREREQUISITES)
        .with_strategy(language_matrix())
        .with_steps([
            steps::checkout_repo(),
            steps::checkout_scripts_repo(),
            steps::checkout_tags(),
            steps::install_go(),
            steps::install_pulumictl(),
            pulumi_cli(opts),
            steps::install_nodejs(),
            steps::install_dotnet(),
            steps::install_python(),
            steps::install_java(),
            steps::install_gradle(GRADLE_VERSION),
            steps::download_provider_binaries(),
            steps::untar_provider_binaries(),
            steps::restore_binary_perms(),
            steps::codegen_during_sdk_build(opts.skip_codegen),
            steps::init_submodules(opts.submodules),
            steps::generate_sdks(),
            steps::build_sdks(),
            steps::check_clean_worktree(),
            steps::porcelain(),
            steps::zip_sdks(),
            steps::upload_sdks(tag),
            steps::notify_slack("Failure while building SDKs"),
        ])
}

/// Runs the example tests against each built SDK.
#[must_use]
pub fn test(opts: &Options) -> Job {
    let infra = opts.test_infrastructure;
    Job::new(opts.sdk_runner.clone())
        .with_name(TEST)
        .with_need(BUILD_SDKS)
        .with_permissions(oidc_permissions())
        .with_strategy(language_matrix())
        .with_steps([
            steps::checkout_repo(),
            steps::checkout_scripts_repo(),
            steps::checkout_tags(),
            steps::install_go(),
            steps::install_pulumictl(),
            pulumi_cli(opts),
            steps::install_nodejs(),
            steps::install_dotnet(),
            steps::install_python(),
            steps::install_java(),
            steps::install_gradle(GRADLE_VERSION),
            steps::download_provider_binaries(),
            steps::untar_provider_binaries(),
            steps::restore_binary_perms(),
            steps::download_sdks(),
            steps::unzip_sdks(),
            steps::update_path(),
            steps::install_node_deps(),
            steps::set_nuget_source(),
            steps::install_python_deps(),
            steps::install_sdk_deps(),
            steps::make_kube_dir(infra),
            steps::download_kubeconfig(infra),
            steps::start_docker_services(opts.docker),
            steps::run_setup_script(opts.setup_script.as_deref()),
            steps::configure_aws_credentials_for_tests(opts.aws),
            steps::google_auth(opts.gcp),
            steps::setup_gcloud(opts.gcp),
            steps::install_kubectl(infra),
            steps::install_helm(infra),
            steps::setup_gotestfmt(),
            steps::run_tests(),
            steps::notify_slack("Failure in SDK tests"),
        ])
}

/// Provisions the shared test cluster and publishes its kubeconfig.
#[must_use]
pub fn provision_cluster(opts: &Options) -> Job {
    let infra = opts.test_infrastructure;
    Job::new(DEFAULT_RUNNER)
        .with_name(PROVISION_CLUSTER)
        .with_output("stack-name", "${{ steps.stackname.outputs.stack-name }}")
        .with_permissions(oidc_permissions())
        .with_steps([
            steps::checkout_repo(),
            steps::install_go(),
            pulumi_cli(opts),
            steps::install_nodejs(),
            steps::google_auth(opts.gcp),
            steps::setup_gcloud(opts.gcp),
            steps::install_kubectl(infra),
            steps::login_google_cloud_registry(infra),
            steps::set_stack_name(infra),
            steps::create_test_cluster(infra),
            steps::upload_kubernetes_artifacts(infra),
        ])
}

/// Destroys the test cluster once tests finished, whatever their outcome.
#[must_use]
pub fn teardown_cluster(opts: &Options) -> Job {
    let infra = opts.test_infrastructure;
    Job::new(DEFAULT_RUNNER)
        .with_name(TEARDOWN_CLUSTER)
        .with_needs([PROVISION_CLUSTER, TEST])
        .with_if(TEARDOWN_GUARD)
        .with_permissions(oidc_permissions())
        .with_steps([
            steps::checkout_repo(),
            steps::install_go(),
            pulumi_cli(opts),
            steps::install_nodejs(),
            steps::google_auth(opts.gcp),
            steps::setup_gcloud(opts.gcp),
            steps::install_kubectl(infra),
            steps::login_google_cloud_registry(infra),
            steps::destroy_test_cluster(infra, PROVISION_CLUSTER),
            steps::delete_kubeconfig_artifact(infra),
        ])
}

/// Runs golangci-lint over the provider package.
#[must_use]
pub fn lint(opts: &Options) -> Job {
    Job::new(DEFAULT_RUNNER).with_name(LINT).with_steps([
        steps::checkout_repo(),
        steps::install_go(),
        steps::golangci_lint(&opts.golangci_timeout),
    ])
}

fn publish_binaries(opts: &Options, goreleaser_args: &str) -> Job {
    Job::new(opts.publish_runner.clone())
        .with_name(PUBLISH)
        .with_need(TEST)
        .with_steps([
            steps::checkout_repo(),
            steps::checkout_tags(),
            steps::install_go(),
            steps::install_pulumictl(),
            pulumi_cli(opts),
            steps::configure_aws_credentials_for_publish(),
            steps::set_prerelease_version(),
            steps::run_goreleaser(goreleaser_args),
            steps::notify_slack("Failure in publishing binaries"),
        ])
}

/// Publishes snapshot binaries with the pre-release GoReleaser config.
#[must_use]
pub fn publish_prerelease(opts: &Options) -> Job {
    publish_binaries(
        opts,
        &format!(
            "-p {} -f .goreleaser.prerelease.yml --rm-dist --skip-validate --timeout {}m0s",
            opts.parallel, opts.timeout
        ),
    )
}

/// Publishes release binaries with the default GoReleaser config.
#[must_use]
pub fn publish(opts: &Options) -> Job {
    publish_binaries(
        opts,
        &format!(
            "-p {} release --rm-dist --timeout {}m0s",
            opts.parallel, opts.timeout
        ),
    )
}

/// Publishes the Python, .NET and Node.js SDKs.
#[must_use]
pub fn publish_sdk(opts: &Options) -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(PUBLISH_SDK)
        .with_need(PUBLISH)
        .with_steps([
            steps::checkout_repo(),
            steps::checkout_scripts_repo(),
            steps::checkout_tags(),
            steps::install_go(),
            steps::install_pulumictl(),
            pulumi_cli(opts),
            steps::install_nodejs(),
            steps::install_dotnet(),
            steps::install_python(),
        ])
        .with_steps(
            ["python", "dotnet", "nodejs"]
                .into_iter()
                .flat_map(|language| {
                    [
                        steps::download_specific_sdk(language),
                        steps::unzip_specific_sdk(language),
                    ]
                }),
        )
        .with_steps([
            steps::install_twine(),
            steps::run_publish_sdk(),
            steps::notify_slack("Failure in publishing SDK"),
        ])
}

/// Publishes the Java SDK; its failure does not fail the workflow.
#[must_use]
pub fn publish_java_sdk(opts: &Options) -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(PUBLISH_JAVA_SDK)
        .with_need(PUBLISH)
        .with_continue_on_error(true)
        .with_steps([
            steps::checkout_repo(),
            steps::checkout_scripts_repo(),
            steps::checkout_tags(),
            steps::install_go(),
            steps::install_pulumictl(),
            pulumi_cli(opts),
            steps::install_java(),
            steps::install_gradle(GRADLE_VERSION),
            steps::download_specific_sdk("java"),
            steps::unzip_specific_sdk("java"),
            steps::set_package_version_to_env(),
            steps::run_publish_java_sdk(GRADLE_VERSION),
        ])
}

/// Tags the published SDK version.
#[must_use]
pub fn tag_sdk() -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(TAG_SDK)
        .with_need(PUBLISH_SDK)
        .with_steps([
            steps::checkout_repo(),
            steps::install_pulumictl(),
            steps::tag_sdk(),
        ])
}

/// Triggers the docs build for the release.
#[must_use]
pub fn dispatch_docs_build() -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(DISPATCH_DOCS_BUILD)
        .with_need(TAG_SDK)
        .with_steps([
            steps::install_pulumictl(),
            steps::dispatch_docs_build_event(),
        ])
}

/// Upgrades pulumi/pulumi and opens a pull request when anything changed.
#[must_use]
pub fn weekly_pulumi_update(opts: &Options) -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(WEEKLY_PULUMI_UPDATE)
        .with_steps([
            steps::checkout_repo(),
            steps::checkout_tags(),
            steps::install_go(),
            steps::install_pulumictl(),
            pulumi_cli(opts),
            steps::install_dotnet(),
            steps::install_nodejs(),
            steps::install_python(),
            steps::update_pulumi(),
            steps::init_submodules(opts.submodules),
            steps::provider_with_pulumi_upgrade(),
            steps::create_update_pulumi_pr(&opts.default_branch),
        ])
}

/// Dispatches slash commands posted on pull requests.
#[must_use]
pub fn command_dispatch(opts: &Options) -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(COMMAND_DISPATCH_FOR_TESTING)
        .with_if("${{ github.event.issue.pull_request }}")
        .with_steps([
            steps::checkout_repo(),
            steps::command_dispatch(&opts.provider),
        ])
}

/// Explains to fork contributors how acceptance tests get run.
#[must_use]
pub fn comment_on_pr() -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(COMMENT_ON_PR)
        .with_if("github.event.pull_request.head.repo.full_name != github.repository")
        .with_steps([
            steps::checkout_repo(),
            steps::comment_pr_with_slash_command(),
        ])
}

/// Links a dispatched run back on the pull request that asked for it.
#[must_use]
pub fn comment_notification() -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(COMMENT_NOTIFICATION)
        .with_if("github.event_name == 'repository_dispatch'")
        .with_steps([
            steps::create_comments_url(),
            steps::update_pr_with_results(),
        ])
}

/// Gate job that succeeds only once every job in `needs` has.
#[must_use]
pub fn sentinel(needs: &[&str]) -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(SENTINEL)
        .with_if(DISPATCH_GUARD)
        .with_needs(needs.iter().copied())
        .with_step(steps::echo_success())
}

/// Deletes stale workflow artifacts.
#[must_use]
pub fn remove_old_artifacts() -> Job {
    Job::new(DEFAULT_RUNNER)
        .with_name(REMOVE_OLD_ARTIFACTS)
        .with_step(steps::remove_old_artifacts())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout_count(job: &Job) -> usize {
        job.steps
            .iter()
            .filter(|s| s.name.as_deref() == Some(CHECKOUT_REPO))
            .count()
    }

    #[test]
    fn test_dispatch_guard_replaces_checkout() {
        let job = prerequisites(&Options::new("widget")).with_dispatch_guard();

        assert_eq!(job.if_condition.as_deref(), Some(DISPATCH_GUARD));
        assert_eq!(checkout_count(&job), 1);
        assert_eq!(job.steps[0], steps::checkout_repo_at_pr());
    }

    #[test]
    fn test_pr_checkout_is_idempotent() {
        let once = test(&Options::new("widget")).with_pr_checkout();
        let twice = once.clone().with_pr_checkout();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_pr_checkout_keeps_guard() {
        let job = teardown_cluster(&Options::new("widget").with_test_infrastructure(true))
            .with_pr_checkout();
        assert_eq!(job.if_condition.as_deref(), Some(TEARDOWN_GUARD));
        assert_eq!(job.steps[0], steps::checkout_repo_at_pr());
    }

    #[test]
    fn test_dependencies() {
        let opts = Options::new("widget");
        assert_eq!(build_sdks(&opts, false).needs, vec![PREREQUISITES]);
        assert_eq!(test(&opts).needs, vec![BUILD_SDKS]);
        assert_eq!(publish(&opts).needs, vec![TEST]);
        assert_eq!(publish_sdk(&opts).needs, vec![PUBLISH]);
        assert_eq!(publish_java_sdk(&opts).needs, vec![PUBLISH]);
        assert_eq!(tag_sdk().needs, vec![PUBLISH_SDK]);
        assert_eq!(dispatch_docs_build().needs, vec![TAG_SDK]);
        assert!(prerequisites(&opts).needs.is_empty());
    }

    #[test]
    fn test_feature_flags_select_steps() {
        let plain = test(&Options::new("widget"));
        let names = plain.step_names();
        assert!(!names.contains(&"Configure AWS Credentials"));
        assert!(!names.contains(&"Run docker compose"));
        assert!(!names.contains(&"Install Kubectl"));

        let full = test(
            &Options::new("widget")
                .with_aws(true)
                .with_docker(true)
                .with_gcp(true)
                .with_test_infrastructure(true)
                .with_setup_script("./scripts/setup.sh"),
        );
        let names = full.step_names();
        for expected in [
            "Configure AWS Credentials",
            "Run docker compose",
            "Run setup script",
            "Authenticate to Google Cloud",
            "Install Kubectl",
            "Download Kubeconfig",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert!(full.steps.len() > plain.steps.len());
    }

    #[test]
    fn test_goreleaser_args() {
        let opts = Options::new("widget");
        let prerelease = publish_prerelease(&opts);
        let args = prerelease
            .steps
            .iter()
            .find_map(|s| s.with_inputs.get("args"))
            .and_then(serde_yaml::Value::as_str)
            .unwrap();
        assert_eq!(
            args,
            "-p 3 -f .goreleaser.prerelease.yml --rm-dist --skip-validate --timeout 60m0s"
        );

        let release = publish(&opts);
        let args = release
            .steps
            .iter()
            .find_map(|s| s.with_inputs.get("args"))
            .and_then(serde_yaml::Value::as_str)
            .unwrap();
        assert_eq!(args, "-p 3 release --rm-dist --timeout 60m0s");
    }

    #[test]
    fn test_runners() {
        let opts = Options::new("widget");
        assert_eq!(build_sdks(&opts, true).runs_on, "pulumi-ubuntu-8core");
        assert_eq!(publish(&opts).runs_on, "ubuntu-latest");
        assert_eq!(
            prerequisites(&opts).with_runs_on("macos-11").runs_on,
            "macos-11"
        );
    }

    #[test]
    fn test_sentinel() {
        let job = sentinel(&[TEST, LINT]);
        assert_eq!(job.needs, vec![TEST, LINT]);
        assert_eq!(job.if_condition.as_deref(), Some(DISPATCH_GUARD));
        assert_eq!(job.steps.len(), 1);
    }

    #[test]
    fn test_publish_java_sdk_continues_on_error() {
        assert_eq!(
            publish_java_sdk(&Options::new("widget")).continue_on_error,
            Some(true)
        );
    }

    #[test]
    fn test_publish_sdk_downloads_each_language() {
        let job = publish_sdk(&Options::new("widget"));
        let names = job.step_names();
        for language in ["python", "dotnet", "nodejs"] {
            assert!(names.contains(&format!("Download {language} SDK").as_str()));
            assert!(names.contains(&format!("Uncompress {language} SDK").as_str()));
        }
    }
}
