//! Step catalog.
//!
//! Every function here is a pure factory returning a [`Step`]. Factories
//! gated on a feature flag return [`Step::inert`] when the flag is off;
//! [`Job::with_step`](crate::Job::with_step) drops those before emission.

use crate::workflow::Step;

/// Name shared by both checkout variants; dispatch context swaps one for the other.
pub const CHECKOUT_REPO: &str = "Checkout Repo";

const WORKSPACE: &str = "${{ github.workspace }}";
const MATRIX_LANGUAGE: &str = "${{ matrix.language }}";
const BOT_TOKEN: &str = "${{ secrets.PULUMI_BOT_TOKEN }}";
const STACK_NAME_OUTPUT: &str = "${{ steps.stackname.outputs.stack-name }}";

const CHECKOUT_ACTION: &str = "actions/checkout@v4";
const UPLOAD_ARTIFACT_ACTION: &str = "actions/upload-artifact@v3";
const DOWNLOAD_ARTIFACT_ACTION: &str = "actions/download-artifact@v3";
const INSTALL_GH_RELEASE_ACTION: &str = "jaxxstorm/action-install-gh-release@v1.10.0";
const AWS_CREDENTIALS_ACTION: &str = "aws-actions/configure-aws-credentials@v2";
const COMMENT_PR_ACTION: &str = "thollander/actions-comment-pull-request@v2";

/// Returns `step` when `enabled`, otherwise an inert step.
fn when(enabled: bool, step: impl FnOnce() -> Step) -> Step {
    if enabled { step() } else { Step::inert() }
}

// Checkouts

/// Plain checkout of the repository.
#[must_use]
pub fn checkout_repo() -> Step {
    Step::uses(CHECKOUT_ACTION).with_name(CHECKOUT_REPO)
}

/// Checkout of the pull request head commit carried by a dispatch payload.
#[must_use]
pub fn checkout_repo_at_pr() -> Step {
    Step::uses(CHECKOUT_ACTION)
        .with_name(CHECKOUT_REPO)
        .with_input("ref", "${{ env.PR_COMMIT_SHA }}")
}

/// Checkout of the shared CI scripts into `ci-scripts/`.
#[must_use]
pub fn checkout_scripts_repo() -> Step {
    Step::uses(CHECKOUT_ACTION)
        .with_name("Checkout Scripts Repo")
        .with_input("path", "ci-scripts")
        .with_input("repository", "pulumi/scripts")
}

/// Fetch full history and tags so version calculation works.
#[must_use]
pub fn checkout_tags() -> Step {
    Step::run("git fetch --prune --unshallow --tags").with_name("Unshallow clone for tags")
}

// Toolchains

/// Install the Go toolchain pinned by `GOVERSION`.
#[must_use]
pub fn install_go() -> Step {
    Step::uses("actions/setup-go@v4")
        .with_name("Install Go")
        .with_input("go-version", "${{ env.GOVERSION }}")
        .with_input("cache-dependency-path", "**/*.sum")
}

/// Install `pulumictl`.
#[must_use]
pub fn install_pulumictl() -> Step {
    Step::uses(INSTALL_GH_RELEASE_ACTION)
        .with_name("Install pulumictl")
        .with_input("repo", "pulumi/pulumictl")
}

/// Install the Pulumi CLI, optionally pinned to `version`.
#[must_use]
pub fn install_pulumi_cli(version: Option<&str>) -> Step {
    let step = Step::uses("pulumi/actions@v4").with_name("Install Pulumi CLI");
    match version {
        Some(version) => step.with_input("pulumi-version", version),
        None => step,
    }
}

/// Install Node.js pinned by `NODEVERSION`.
#[must_use]
pub fn install_nodejs() -> Step {
    Step::uses("actions/setup-node@v3")
        .with_name("Setup Node")
        .with_input("node-version", "${{ env.NODEVERSION }}")
        .with_input("registry-url", "https://registry.npmjs.org")
}

/// Install the .NET SDKs listed in `DOTNETVERSION`.
#[must_use]
pub fn install_dotnet() -> Step {
    Step::uses("actions/setup-dotnet@v3")
        .with_name("Setup DotNet")
        .with_input("dotnet-version", "${{ env.DOTNETVERSION }}")
}

/// Install Python pinned by `PYTHONVERSION`.
#[must_use]
pub fn install_python() -> Step {
    Step::uses("actions/setup-python@v4")
        .with_name("Setup Python")
        .with_input("python-version", "${{ env.PYTHONVERSION }}")
}

/// Install a Temurin JDK pinned by `JAVAVERSION`.
#[must_use]
pub fn install_java() -> Step {
    Step::uses("actions/setup-java@v3")
        .with_name("Setup Java")
        .with_input("cache", "gradle")
        .with_input("distribution", "temurin")
        .with_input("java-version", "${{ env.JAVAVERSION }}")
}

/// Install Gradle at `version`.
#[must_use]
pub fn install_gradle(version: &str) -> Step {
    Step::uses("gradle/gradle-build-action@v2")
        .with_name("Setup Gradle")
        .with_input("gradle-version", version)
}

/// Install twine for PyPI uploads.
#[must_use]
pub fn install_twine() -> Step {
    Step::run("python -m pip install pip twine").with_name("Install Twine")
}

/// Install `schema-tools`, used to diff the provider schema against the base branch.
#[must_use]
pub fn install_schema_checker() -> Step {
    Step::uses(INSTALL_GH_RELEASE_ACTION)
        .with_name("Install Schema Tools")
        .with_input("repo", "pulumi/schema-tools")
}

/// Install kubectl.
#[must_use]
pub fn install_kubectl(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses("azure/setup-kubectl@v3")
            .with_name("Install Kubectl")
            .with_input("version", "v1.26.0")
    })
}

/// Install Helm.
#[must_use]
pub fn install_helm(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses("azure/setup-helm@v3")
            .with_name("Install and configure Helm")
            .with_input("version", "v3.8.0")
    })
}

/// Install gotestfmt for readable test logs.
#[must_use]
pub fn setup_gotestfmt() -> Step {
    Step::uses("GoTestTools/gotestfmt-action@v2")
        .with_name("Install gotestfmt")
        .with_input("version", "v2.5.0")
        .with_input("token", "${{ secrets.GITHUB_TOKEN }}")
}

// Provider build

/// Initialize git submodules.
#[must_use]
pub fn init_submodules(enabled: bool) -> Step {
    when(enabled, || {
        Step::run("make init_submodules").with_name("Initialize submodules")
    })
}

/// Build the codegen binaries ahead of schema generation.
///
/// Inert when codegen is deferred to the SDK build.
#[must_use]
pub fn build_codegen_binaries(skip_codegen: bool) -> Step {
    when(!skip_codegen, || {
        Step::run("make codegen").with_name("Build codegen binaries")
    })
}

/// Build the codegen binaries inside each SDK build instead of in prerequisites.
#[must_use]
pub fn codegen_during_sdk_build(skip_codegen: bool) -> Step {
    when(skip_codegen, || {
        Step::run("make codegen").with_name("Build codegen binaries")
    })
}

/// Generate the provider schema.
#[must_use]
pub fn build_schema() -> Step {
    Step::run("make generate_schema").with_name("Build Schema")
}

/// Build the provider binary.
#[must_use]
pub fn build_provider() -> Step {
    Step::run("make provider").with_name("Build Provider")
}

/// Diff the generated schema against the base branch into `SCHEMA_CHANGES`.
#[must_use]
pub fn check_schema_changes() -> Step {
    Step::run(
        "echo 'SCHEMA_CHANGES<<EOF' >> $GITHUB_ENV\n\
         schema-tools compare -p ${{ env.PROVIDER }} -o ${{ github.event.repository.default_branch }} -n \
         --local-path=provider/cmd/pulumi-resource-${{ env.PROVIDER }}/schema.json >> $GITHUB_ENV\n\
         echo 'EOF' >> $GITHUB_ENV",
    )
    .with_name("Check Schema is Valid")
    .with_if("github.event_name == 'pull_request'")
}

/// Post the schema diff on the pull request.
#[must_use]
pub fn comment_schema_changes_on_pr() -> Step {
    Step::uses(COMMENT_PR_ACTION)
        .with_name("Comment on PR with Details of Schema Check")
        .with_if("github.event_name == 'pull_request'")
        .with_input(
            "message",
            "### Does the PR have any schema changes?\n\n${{ env.SCHEMA_CHANGES }}\n",
        )
        .with_input("comment_tag", "schemaCheck")
        .with_input("GITHUB_TOKEN", BOT_TOKEN)
}

/// Label bot pull requests that carry no breaking schema change.
#[must_use]
pub fn label_if_no_breaking_changes() -> Step {
    Step::uses("actions-ecosystem/action-add-labels@v1.1.0")
        .with_name("Add label if no breaking changes")
        .with_if(
            "github.event_name == 'pull_request' && \
             contains(env.SCHEMA_CHANGES, 'Looking good! No breaking changes found.') && \
             github.actor == 'pulumi-bot'",
        )
        .with_input("labels", "impact/no-changelog-required")
        .with_input("number", "${{ github.event.pull_request.number }}")
        .with_input("github_token", "${{ secrets.GITHUB_TOKEN }}")
}

/// Fail when the build left the work tree dirty.
#[must_use]
pub fn check_clean_worktree() -> Step {
    Step::run("./ci-scripts/ci/check-worktree-is-clean").with_name("Check worktree clean")
}

/// Print the work tree status for debugging.
#[must_use]
pub fn porcelain() -> Step {
    Step::run("git status --porcelain").with_name("Git status")
}

/// Pack the provider and codegen binaries.
#[must_use]
pub fn tar_provider_binaries() -> Step {
    Step::run(format!(
        "tar -zcf {WORKSPACE}/bin/provider.tar.gz -C {WORKSPACE}/bin/ \
         pulumi-resource-${{{{ env.PROVIDER }}}} pulumi-gen-${{{{ env.PROVIDER }}}}"
    ))
    .with_name("Tar provider binaries")
}

/// Upload the packed provider binaries.
#[must_use]
pub fn upload_provider_binaries() -> Step {
    Step::uses(UPLOAD_ARTIFACT_ACTION)
        .with_name("Upload artifacts")
        .with_input("name", "${{ env.PROVIDER }}-provider.tar.gz")
        .with_input("path", format!("{WORKSPACE}/bin/provider.tar.gz"))
}

/// Download the packed provider binaries.
#[must_use]
pub fn download_provider_binaries() -> Step {
    Step::uses(DOWNLOAD_ARTIFACT_ACTION)
        .with_name("Download provider + tfgen binaries")
        .with_input("name", "${{ env.PROVIDER }}-provider.tar.gz")
        .with_input("path", format!("{WORKSPACE}/bin"))
}

/// Unpack the provider binaries.
#[must_use]
pub fn untar_provider_binaries() -> Step {
    Step::run(format!(
        "tar -zxf {WORKSPACE}/bin/provider.tar.gz -C {WORKSPACE}/bin"
    ))
    .with_name("Untar provider binaries")
}

/// Artifacts lose the executable bit; restore it.
#[must_use]
pub fn restore_binary_perms() -> Step {
    Step::run(format!(
        "find {WORKSPACE} -name \"pulumi-*-${{{{ env.PROVIDER }}}}\" -print -exec chmod +x {{}} \\;"
    ))
    .with_name("Restore Binary Permissions")
}

/// Run the provider's Go unit tests.
#[must_use]
pub fn test_provider_library() -> Step {
    Step::run("make test_provider").with_name("Test Provider Library")
}

/// Upload coverage to Codecov.
#[must_use]
pub fn codecov() -> Step {
    Step::uses("codecov/codecov-action@v3")
        .with_name("Upload coverage reports to Codecov")
        .with_env("CODECOV_TOKEN", "${{ secrets.CODECOV_TOKEN }}")
}

// SDKs

/// Generate the SDK for the current matrix language.
#[must_use]
pub fn generate_sdks() -> Step {
    Step::run(format!("make generate_{MATRIX_LANGUAGE}")).with_name("Generate SDK")
}

/// Build the SDK for the current matrix language.
#[must_use]
pub fn build_sdks() -> Step {
    Step::run(format!("make build_{MATRIX_LANGUAGE}")).with_name("Build SDK")
}

/// Compress the SDK for the current matrix language.
#[must_use]
pub fn zip_sdks() -> Step {
    Step::run(format!(
        "tar -zcf sdk/{MATRIX_LANGUAGE}.tar.gz -C sdk/{MATRIX_LANGUAGE} ."
    ))
    .with_name("Compress SDK folder")
}

/// Upload the compressed SDK.
///
/// Tag builds keep the artifact for the default retention period; branch
/// builds keep it for 30 days.
#[must_use]
pub fn upload_sdks(tag: bool) -> Step {
    let step = Step::uses(UPLOAD_ARTIFACT_ACTION)
        .with_name("Upload artifacts")
        .with_input("name", format!("{MATRIX_LANGUAGE}-sdk.tar.gz"))
        .with_input("path", format!("{WORKSPACE}/sdk/{MATRIX_LANGUAGE}.tar.gz"));
    if tag {
        step
    } else {
        step.with_input("retention-days", 30)
    }
}

/// Download the compressed SDK for the current matrix language.
#[must_use]
pub fn download_sdks() -> Step {
    Step::uses(DOWNLOAD_ARTIFACT_ACTION)
        .with_name("Download SDK")
        .with_input("name", format!("{MATRIX_LANGUAGE}-sdk.tar.gz"))
        .with_input("path", format!("{WORKSPACE}/sdk/"))
}

/// Uncompress the SDK for the current matrix language.
#[must_use]
pub fn unzip_sdks() -> Step {
    Step::run(format!(
        "tar -zxf {WORKSPACE}/sdk/{MATRIX_LANGUAGE}.tar.gz -C {WORKSPACE}/sdk/{MATRIX_LANGUAGE}"
    ))
    .with_name("Uncompress SDK folder")
}

/// Download the compressed SDK for one `language`.
#[must_use]
pub fn download_specific_sdk(language: &str) -> Step {
    Step::uses(DOWNLOAD_ARTIFACT_ACTION)
        .with_name(format!("Download {language} SDK"))
        .with_input("name", format!("{language}-sdk.tar.gz"))
        .with_input("path", format!("{WORKSPACE}/sdk/"))
}

/// Uncompress the SDK for one `language`.
#[must_use]
pub fn unzip_specific_sdk(language: &str) -> Step {
    Step::run(format!(
        "tar -zxf {WORKSPACE}/sdk/{language}.tar.gz -C {WORKSPACE}/sdk/{language}"
    ))
    .with_name(format!("Uncompress {language} SDK"))
}

// Test environment

/// Put the provider binaries on `PATH`.
#[must_use]
pub fn update_path() -> Step {
    Step::run(format!("echo \"{WORKSPACE}/bin\" >> $GITHUB_PATH")).with_name("Update path")
}

/// Install global Node.js tooling.
#[must_use]
pub fn install_node_deps() -> Step {
    Step::run("yarn global add typescript").with_name("Install Node dependencies")
}

/// Register the locally built NuGet packages as a source.
#[must_use]
pub fn set_nuget_source() -> Step {
    Step::run("dotnet nuget add source ${{ github.workspace }}/nuget").with_name("Add NuGet source")
}

/// Install Python packaging tools.
#[must_use]
pub fn install_python_deps() -> Step {
    Step::run("pip3 install virtualenv==20.0.23\npip3 install pipenv").with_name("Install Python deps")
}

/// Install the SDK for the current matrix language.
#[must_use]
pub fn install_sdk_deps() -> Step {
    Step::run(format!("make install_{MATRIX_LANGUAGE}_sdk")).with_name("Install dependencies")
}

/// Create the kubeconfig directory.
#[must_use]
pub fn make_kube_dir(enabled: bool) -> Step {
    when(enabled, || {
        Step::run("mkdir -p \"~/.kube/\"").with_name("Make Kube Directory")
    })
}

/// Download the kubeconfig published by the cluster provisioning job.
#[must_use]
pub fn download_kubeconfig(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses(DOWNLOAD_ARTIFACT_ACTION)
            .with_name("Download Kubeconfig")
            .with_input("name", "config")
            .with_input("path", "~/.kube/")
    })
}

/// Start docker-compose backed test services.
#[must_use]
pub fn start_docker_services(enabled: bool) -> Step {
    when(enabled, || {
        Step::run("docker-compose -f testing/docker-compose.yml up --build -d")
            .with_name("Run docker compose")
    })
}

/// Run the provider's setup script before tests.
#[must_use]
pub fn run_setup_script(script: Option<&str>) -> Step {
    match script {
        Some(script) => Step::run(script.to_string()).with_name("Run setup script"),
        None => Step::inert(),
    }
}

/// Assume the CI role for tests.
#[must_use]
pub fn configure_aws_credentials_for_tests(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses(AWS_CREDENTIALS_ACTION)
            .with_name("Configure AWS Credentials")
            .with_input("aws-access-key-id", "${{ secrets.AWS_ACCESS_KEY_ID }}")
            .with_input("aws-region", "${{ env.AWS_REGION }}")
            .with_input("aws-secret-access-key", "${{ secrets.AWS_SECRET_ACCESS_KEY }}")
            .with_input("role-duration-seconds", 3600)
            .with_input("role-session-name", "${{ env.PROVIDER }}@githubActions")
            .with_input("role-to-assume", "${{ secrets.AWS_CI_ROLE_ARN }}")
    })
}

/// Federated Google Cloud authentication.
#[must_use]
pub fn google_auth(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses("google-github-actions/auth@v0")
            .with_name("Authenticate to Google Cloud")
            .with_input(
                "workload_identity_provider",
                "projects/${{ env.GOOGLE_PROJECT_NUMBER }}/locations/global/\
                 workloadIdentityPools/${{ env.GOOGLE_CI_WORKLOAD_IDENTITY_POOL }}/\
                 providers/${{ env.GOOGLE_CI_WORKLOAD_IDENTITY_PROVIDER }}",
            )
            .with_input("service_account", "${{ env.GOOGLE_CI_SERVICE_ACCOUNT_EMAIL }}")
    })
}

/// Install gcloud with the GKE auth plugin.
#[must_use]
pub fn setup_gcloud(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses("google-github-actions/setup-gcloud@v0")
            .with_name("Setup gcloud auth")
            .with_input("install_components", "gke-gcloud-auth-plugin")
    })
}

/// Run the example tests for the current matrix language.
#[must_use]
pub fn run_tests() -> Step {
    Step::run(format!(
        "set -euo pipefail\n\
         cd examples && go test -v -json -count=1 -cover -timeout 2h -tags={MATRIX_LANGUAGE} -parallel 4 . 2>&1 | tee /tmp/gotest.log | gotestfmt"
    ))
    .with_name("Run tests")
}

// Test infrastructure

/// Let docker pull from the Google container registry.
#[must_use]
pub fn login_google_cloud_registry(enabled: bool) -> Step {
    when(enabled, || {
        Step::run("gcloud --quiet auth configure-docker").with_name("Login to Google Cloud Registry")
    })
}

/// Expose a unique stack name as the `stack-name` step output.
#[must_use]
pub fn set_stack_name(enabled: bool) -> Step {
    when(enabled, || {
        Step::run(
            "echo \"stack-name=${{ env.PULUMI_TEST_OWNER }}/${{ github.sha }}-${{ github.run_id }}-${{ github.run_attempt }}\" >> \"$GITHUB_OUTPUT\"",
        )
        .with_name("Set stack name in output")
        .with_id("stackname")
    })
}

/// Provision the test cluster.
#[must_use]
pub fn create_test_cluster(enabled: bool) -> Step {
    when(enabled, || {
        Step::run(format!("./scripts/ci-cluster-create.sh {STACK_NAME_OUTPUT}"))
            .with_name("Create test infrastructure")
    })
}

/// Publish the test cluster's kubeconfig.
#[must_use]
pub fn upload_kubernetes_artifacts(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses(UPLOAD_ARTIFACT_ACTION)
            .with_name("Upload Kubernetes Artifacts")
            .with_input("name", "config")
            .with_input("path", "~/.kube/config")
    })
}

/// Destroy the stack created by the job `provision_job`.
#[must_use]
pub fn destroy_test_cluster(enabled: bool, provision_job: &str) -> Step {
    when(enabled, || {
        Step::run(format!(
            "./scripts/ci-cluster-destroy.sh ${{{{ needs.{provision_job}.outputs.stack-name }}}}"
        ))
        .with_name("Destroy test infra")
    })
}

/// Delete the kubeconfig artifact.
#[must_use]
pub fn delete_kubeconfig_artifact(enabled: bool) -> Step {
    when(enabled, || {
        Step::uses("geekyeggo/delete-artifact@v2")
            .with_name("Delete kubeconfig artifact")
            .with_input("name", "config")
    })
}

// Lint

/// Run golangci-lint over the provider package.
#[must_use]
pub fn golangci_lint(timeout: &str) -> Step {
    Step::uses("golangci/golangci-lint-action@v3")
        .with_name("golangci-lint provider pkg")
        .with_input("version", "${{ env.GOLANGCI_LINT_VERSION }}")
        .with_input("args", format!("-c ../.golangci.yml --timeout {timeout}"))
        .with_input("working-directory", "provider")
}

// Publishing

/// Assume the release upload role.
#[must_use]
pub fn configure_aws_credentials_for_publish() -> Step {
    Step::uses(AWS_CREDENTIALS_ACTION)
        .with_name("Configure AWS Credentials")
        .with_input("aws-access-key-id", "${{ secrets.AWS_ACCESS_KEY_ID }}")
        .with_input("aws-region", "us-east-2")
        .with_input("aws-secret-access-key", "${{ secrets.AWS_SECRET_ACCESS_KEY }}")
        .with_input("role-duration-seconds", 3600)
        .with_input("role-external-id", "upload-pulumi-release")
        .with_input("role-session-name", "${{ env.PROVIDER }}@githubActions")
        .with_input("role-to-assume", "${{ secrets.AWS_UPLOAD_ROLE_ARN }}")
}

/// Export the computed version as `GORELEASER_CURRENT_TAG`.
#[must_use]
pub fn set_prerelease_version() -> Step {
    Step::run(
        "echo \"GORELEASER_CURRENT_TAG=v$(pulumictl get version --language generic)\" >> $GITHUB_ENV",
    )
    .with_name("Set PreRelease Version")
}

/// Run GoReleaser with `args`.
#[must_use]
pub fn run_goreleaser(args: &str) -> Step {
    Step::uses("goreleaser/goreleaser-action@v2")
        .with_name("Run GoReleaser")
        .with_input("args", args)
        .with_input("version", "latest")
}

/// Publish the npm, PyPI and NuGet packages.
#[must_use]
pub fn run_publish_sdk() -> Step {
    Step::run(format!("./ci-scripts/ci/publish-tfgen-package {WORKSPACE}"))
        .with_name("Publish SDKs")
        .with_env("NODE_AUTH_TOKEN", "${{ secrets.NPM_TOKEN }}")
}

/// Export the computed version as `PACKAGE_VERSION`.
#[must_use]
pub fn set_package_version_to_env() -> Step {
    Step::run(
        "echo \"PACKAGE_VERSION=$(pulumictl get version --language generic)\" >> $GITHUB_ENV",
    )
    .with_name("Set PACKAGE_VERSION to Env")
}

/// Publish the Java SDK to Sonatype.
#[must_use]
pub fn run_publish_java_sdk(gradle_version: &str) -> Step {
    Step::uses("gradle/gradle-build-action@v2")
        .with_name("Publish Java SDK")
        .with_input(
            "arguments",
            "publishToSonatype closeAndReleaseSonatypeStagingRepository",
        )
        .with_input("build-root-directory", "./sdk/java")
        .with_input("gradle-version", gradle_version)
}

/// Push the `sdk/v<version>` tag.
#[must_use]
pub fn tag_sdk() -> Step {
    Step::run(
        "git tag sdk/v$(pulumictl get version --language generic) && \
         git push origin sdk/v$(pulumictl get version --language generic)",
    )
    .with_name("Add SDK version tag")
}

/// Ask the docs repository to rebuild for the pushed tag.
#[must_use]
pub fn dispatch_docs_build_event() -> Step {
    Step::run("pulumictl create docs-build pulumi-${{ env.PROVIDER }} ${GITHUB_REF#refs/tags/}")
        .with_name("Dispatch Event")
        .with_env("GITHUB_TOKEN", BOT_TOKEN)
}

// Pull request interaction

/// Turn `/run-acceptance-tests` comments into repository dispatch events.
#[must_use]
pub fn command_dispatch(provider: &str) -> Step {
    Step::uses("peter-evans/slash-command-dispatch@v2")
        .with_input("commands", "run-acceptance-tests\nrelease")
        .with_input("issue-type", "pull-request")
        .with_input("permission", "write")
        .with_input("reaction-token", "${{ secrets.GITHUB_TOKEN }}")
        .with_input("repository", format!("pulumi/pulumi-{provider}"))
        .with_input("token", BOT_TOKEN)
}

/// Tell fork contributors how acceptance tests get run.
#[must_use]
pub fn comment_pr_with_slash_command() -> Step {
    Step::uses(COMMENT_PR_ACTION)
        .with_name("Comment PR")
        .with_input(
            "message",
            "PR is now waiting for a maintainer to run the acceptance tests.\n\n\
             **Note for the maintainer:** To run the acceptance tests, please comment */run-acceptance-tests* on the PR\n",
        )
        .with_input("GITHUB_TOKEN", "${{ secrets.GITHUB_TOKEN }}")
}

/// Expose the URL of the current run as the `run-url` output of step `vars`.
#[must_use]
pub fn create_comments_url() -> Step {
    Step::run(
        "echo \"run-url=https://github.com/$GITHUB_REPOSITORY/actions/runs/$GITHUB_RUN_ID\" >> \"$GITHUB_OUTPUT\"",
    )
    .with_name("Create URL to the run output")
    .with_id("vars")
}

/// Comment the run URL back on the dispatching pull request.
#[must_use]
pub fn update_pr_with_results() -> Step {
    Step::uses("peter-evans/create-or-update-comment@v1")
        .with_name("Update with Result")
        .with_input("body", "Please view the PR build: ${{ steps.vars.outputs.run-url }}")
        .with_input(
            "issue-number",
            "${{ github.event.client_payload.github.payload.issue.number }}",
        )
        .with_input(
            "repository",
            "${{ github.event.client_payload.github.payload.repository.full_name }}",
        )
        .with_input("token", BOT_TOKEN)
}

/// Trivial success marker for gate jobs.
#[must_use]
pub fn echo_success() -> Step {
    Step::run("echo yes").with_name("Is workflow a success")
}

// Scheduled upgrade

/// Bump pulumi/pulumi in every Go module on a fresh branch.
///
/// Sets output `changes` on step `gomod` when anything moved.
#[must_use]
pub fn update_pulumi() -> Step {
    Step::run(
        "git config --local user.email 'bot@pulumi.com'\n\
         git config --local user.name 'pulumi-bot'\n\
         git checkout -b update-pulumi/${{ github.run_id }}-${{ github.run_number }}\n\
         for MODFILE in $(find . -name go.mod); do pushd $(dirname $MODFILE); \
         go get github.com/pulumi/pulumi/pkg/v3 github.com/pulumi/pulumi/sdk/v3; go mod tidy; popd; done\n\
         git update-index -q --refresh\n\
         if ! git diff-files --quiet; then echo changes=1 >> \"$GITHUB_OUTPUT\"; fi",
    )
    .with_name("Update Pulumi/Pulumi")
    .with_id("gomod")
}

/// Regenerate SDKs against the upgraded modules and push the branch.
#[must_use]
pub fn provider_with_pulumi_upgrade() -> Step {
    Step::run(
        "make codegen && make local_generate\n\
         git add sdk\n\
         git commit -m \"Regenerating SDKs based on updated modules\" || echo \"ignore commit failure, may be empty\"\n\
         git add .\n\
         git commit -m \"Updated modules\"\n\
         git push origin update-pulumi/${{ github.run_id }}-${{ github.run_number }}",
    )
    .with_name("Provider with Pulumi Upgrade")
    .with_if("steps.gomod.outputs.changes != 0")
}

/// Open the upgrade pull request against `base_branch`.
#[must_use]
pub fn create_update_pulumi_pr(base_branch: &str) -> Step {
    Step::run(format!(
        "ver=$(go list -m all | grep pulumi/pulumi/pkg/v3 | cut -d' ' -f2)\n\
         msg=\"Automated upgrade: bump pulumi/pulumi to ${{ver}}\"\n\
         gh pr create -t \"$msg\" -b \"$msg\" -B {base_branch}"
    ))
    .with_name("Create PR")
    .with_id("create-pr")
    .with_if("steps.gomod.outputs.changes != 0")
    .with_env("GITHUB_TOKEN", BOT_TOKEN)
}

// Notifications and housekeeping

/// Slack notification on push-triggered failures.
#[must_use]
pub fn notify_slack(title: &str) -> Step {
    Step::uses("8398a7/action-slack@v3")
        .with_name("Notify Slack")
        .with_if("failure() && github.event_name == 'push'")
        .with_input("author_name", title)
        .with_input("fields", "repo,commit,author,action")
        .with_input("status", "${{ job.status }}")
}

/// Delete workflow artifacts older than a month.
#[must_use]
pub fn remove_old_artifacts() -> Step {
    Step::uses("c-hive/gha-remove-artifacts@v1")
        .with_name("Remove old artifacts")
        .with_input("age", "1 month")
        .with_input("skip-tags", true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_gated_factories_are_inert_when_off() {
        let gated = [
            install_kubectl(false),
            install_helm(false),
            init_submodules(false),
            make_kube_dir(false),
            download_kubeconfig(false),
            start_docker_services(false),
            run_setup_script(None),
            configure_aws_credentials_for_tests(false),
            google_auth(false),
            setup_gcloud(false),
            login_google_cloud_registry(false),
            set_stack_name(false),
            create_test_cluster(false),
            upload_kubernetes_artifacts(false),
            destroy_test_cluster(false, "provision-cluster"),
            delete_kubeconfig_artifact(false),
        ];
        assert!(gated.iter().all(Step::is_inert));

        let enabled = [
            install_kubectl(true),
            init_submodules(true),
            start_docker_services(true),
            run_setup_script(Some("./setup.sh")),
            configure_aws_credentials_for_tests(true),
            google_auth(true),
            set_stack_name(true),
            destroy_test_cluster(true, "provision-cluster"),
        ];
        assert!(enabled.iter().all(|s| !s.is_inert()));
    }

    #[test]
    fn test_codegen_placement_is_exclusive() {
        for skip in [false, true] {
            let prerequisites = build_codegen_binaries(skip);
            let during_sdk = codegen_during_sdk_build(skip);
            assert_ne!(prerequisites.is_inert(), during_sdk.is_inert());
        }
        assert!(codegen_during_sdk_build(false).is_inert());
    }

    #[test]
    fn test_checkout_variants_share_a_name() {
        let plain = checkout_repo();
        let at_pr = checkout_repo_at_pr();
        assert_eq!(plain.name.as_deref(), Some(CHECKOUT_REPO));
        assert_eq!(at_pr.name.as_deref(), Some(CHECKOUT_REPO));
        assert!(plain.with_inputs.get("ref").is_none());
        assert_eq!(
            at_pr.with_inputs.get("ref"),
            Some(&serde_yaml::Value::from("${{ env.PR_COMMIT_SHA }}"))
        );
    }

    #[test]
    fn test_pulumi_cli_pin() {
        assert!(install_pulumi_cli(None).with_inputs.is_empty());
        let pinned = install_pulumi_cli(Some("v3.91.1"));
        assert_eq!(
            pinned.with_inputs.get("pulumi-version"),
            Some(&serde_yaml::Value::from("v3.91.1"))
        );
    }

    #[test]
    fn test_expression_escaping() {
        let run = tar_provider_binaries().run.unwrap();
        assert_eq!(
            run,
            "tar -zcf ${{ github.workspace }}/bin/provider.tar.gz -C ${{ github.workspace }}/bin/ \
             pulumi-resource-${{ env.PROVIDER }} pulumi-gen-${{ env.PROVIDER }}"
        );

        let restore = restore_binary_perms().run.unwrap();
        assert!(restore.ends_with("-print -exec chmod +x {} \\;"));
        assert!(restore.contains("\"pulumi-*-${{ env.PROVIDER }}\""));

        let destroy = destroy_test_cluster(true, "provision-cluster").run.unwrap();
        assert_eq!(
            destroy,
            "./scripts/ci-cluster-destroy.sh ${{ needs.provision-cluster.outputs.stack-name }}"
        );
    }

    #[test]
    fn test_upload_sdks_retention() {
        assert!(upload_sdks(true).with_inputs.get("retention-days").is_none());
        assert_eq!(
            upload_sdks(false).with_inputs.get("retention-days"),
            Some(&serde_yaml::Value::from(30))
        );
    }

    #[test]
    fn test_update_pr_targets_base_branch() {
        let run = create_update_pulumi_pr("main").run.unwrap();
        assert!(run.ends_with("-B main"));
        assert!(run.contains("${ver}"));
    }

    #[test]
    fn test_command_dispatch_repository() {
        let step = command_dispatch("widget");
        assert_eq!(
            step.with_inputs.get("repository"),
            Some(&serde_yaml::Value::from("pulumi/pulumi-widget"))
        );
    }
}
