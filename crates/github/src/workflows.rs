//! Workflow assemblers.
//!
//! One function per workflow file. Each takes the workflow name and the
//! provider's options and returns a complete [`Workflow`].

use crate::jobs::{
    self, BUILD_SDKS, COMMAND_DISPATCH_FOR_TESTING, COMMENT_NOTIFICATION, COMMENT_ON_PR,
    DISPATCH_DOCS_BUILD, LINT, PREREQUISITES, PROVISION_CLUSTER, PUBLISH, PUBLISH_JAVA_SDK,
    PUBLISH_SDK, REMOVE_OLD_ARTIFACTS, SENTINEL, TAG_SDK, TEARDOWN_CLUSTER, TEST,
    WEEKLY_PULUMI_UPDATE,
};
use crate::workflow::{
    ActivityTrigger, Job, PullRequestTrigger, PushTrigger, ScheduleTrigger, Workflow,
    WorkflowDispatchTrigger, WorkflowTriggers,
};
use indexmap::IndexMap;
use provider_ci_core::{EnvMap, Options, env_from_pairs, merge_env};

const GO_VERSION: &str = "1.21.x";
const NODE_VERSION: &str = "16.x";
const PYTHON_VERSION: &str = "3.7";
const DOTNET_VERSION: &str = "6.0.x\n3.1.301\n";
const JAVA_VERSION: &str = "11";

const MAIN_BRANCHES: [&str; 2] = ["master", "main"];
const CHANGELOG: &str = "CHANGELOG.md";

/// Environment shared by every provider workflow, with `opts.env` merged on top.
#[must_use]
pub fn base_env(opts: &Options) -> EnvMap {
    let base = env_from_pairs([
        ("GITHUB_TOKEN", "${{ secrets.PULUMI_BOT_TOKEN }}"),
        ("PROVIDER", opts.provider.as_str()),
        ("PULUMI_ACCESS_TOKEN", "${{ secrets.PULUMI_ACCESS_TOKEN }}"),
        ("PULUMI_LOCAL_NUGET", "${{ github.workspace }}/nuget"),
        ("NPM_TOKEN", "${{ secrets.NPM_TOKEN }}"),
        ("NODE_AUTH_TOKEN", "${{ secrets.NPM_TOKEN }}"),
        ("NUGET_PUBLISH_KEY", "${{ secrets.NUGET_PUBLISH_KEY }}"),
        ("PYPI_USERNAME", "__token__"),
        ("PYPI_PASSWORD", "${{ secrets.PYPI_API_TOKEN }}"),
        ("TRAVIS_OS_NAME", "linux"),
        ("SLACK_WEBHOOK_URL", "${{ secrets.SLACK_WEBHOOK_URL }}"),
        ("PULUMI_GO_DEP_ROOT", "${{ github.workspace }}/.."),
        ("PUBLISH_REPO_USERNAME", "${{ secrets.OSSRH_USERNAME }}"),
        ("PUBLISH_REPO_PASSWORD", "${{ secrets.OSSRH_PASSWORD }}"),
        ("SIGNING_KEY_ID", "${{ secrets.JAVA_SIGNING_KEY_ID }}"),
        ("SIGNING_KEY", "${{ secrets.JAVA_SIGNING_KEY }}"),
        ("SIGNING_PASSWORD", "${{ secrets.JAVA_SIGNING_PASSWORD }}"),
        ("GOVERSION", GO_VERSION),
        ("NODEVERSION", NODE_VERSION),
        ("PYTHONVERSION", PYTHON_VERSION),
        ("DOTNETVERSION", DOTNET_VERSION),
        ("JAVAVERSION", JAVA_VERSION),
    ]);
    merge_env(base, &opts.env)
}

/// Dependencies of the gate job, in a stable order.
#[must_use]
pub fn sentinel_needs(lint: bool, test_infrastructure: bool) -> Vec<&'static str> {
    let mut needs = vec![TEST];
    if lint {
        needs.push(LINT);
    }
    if test_infrastructure {
        needs.push(TEARDOWN_CLUSTER);
    }
    needs
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn jobs_from<const N: usize>(entries: [(&str, Job); N]) -> IndexMap<String, Job> {
    entries
        .into_iter()
        .map(|(key, job)| (key.to_string(), job))
        .collect()
}

fn push_tags(tags: &[&str]) -> WorkflowTriggers {
    WorkflowTriggers {
        push: Some(PushTrigger {
            tags: strings(tags),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Where a test-infrastructure provider's cluster jobs are being added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterContext {
    /// Acceptance tests: cluster jobs follow the dispatch rules of the other jobs.
    Dispatch,
    /// Push-triggered workflows.
    Push,
}

/// Adds cluster provisioning and teardown and makes `test` wait for the cluster.
///
/// No-op unless the provider opts into test infrastructure.
fn with_test_infrastructure(
    mut workflow: Workflow,
    opts: &Options,
    context: ClusterContext,
) -> Workflow {
    if !opts.test_infrastructure {
        return workflow;
    }

    let provision = jobs::provision_cluster(opts);
    let teardown = jobs::teardown_cluster(opts);
    let (provision, teardown) = match context {
        ClusterContext::Dispatch => (provision.with_dispatch_guard(), teardown.with_pr_checkout()),
        ClusterContext::Push => (provision, teardown),
    };

    if let Some(test) = workflow.jobs.get_mut(TEST)
        && !test.needs.iter().any(|need| need == PROVISION_CLUSTER)
    {
        test.needs.push(PROVISION_CLUSTER.to_string());
    }
    workflow
        .jobs
        .insert(PROVISION_CLUSTER.to_string(), provision);
    workflow.jobs.insert(TEARDOWN_CLUSTER.to_string(), teardown);

    tracing::trace!(workflow = %workflow.name, "Added test infrastructure jobs");
    workflow
}

/// Daily removal of stale artifacts. Independent of provider options.
#[must_use]
pub fn artifact_cleanup(name: &str, _opts: &Options) -> Workflow {
    Workflow {
        name: name.to_string(),
        on: WorkflowTriggers {
            schedule: Some(vec![ScheduleTrigger {
                cron: "0 1 * * *".to_string(),
            }]),
            ..Default::default()
        },
        env: EnvMap::new(),
        jobs: jobs_from([(REMOVE_OLD_ARTIFACTS, jobs::remove_old_artifacts())]),
    }
}

/// Turns pull request comments into repository dispatch events.
#[must_use]
pub fn command_dispatch(name: &str, opts: &Options) -> Workflow {
    Workflow {
        name: name.to_string(),
        on: WorkflowTriggers {
            issue_comment: Some(ActivityTrigger::types(["created", "edited"])),
            ..Default::default()
        },
        env: base_env(opts),
        jobs: jobs_from([(COMMAND_DISPATCH_FOR_TESTING, jobs::command_dispatch(opts))]),
    }
}

/// Comments on fork pull requests, which cannot run acceptance tests directly.
#[must_use]
pub fn pull_request(name: &str, opts: &Options) -> Workflow {
    Workflow {
        name: name.to_string(),
        on: WorkflowTriggers {
            pull_request_target: Some(PullRequestTrigger::default()),
            ..Default::default()
        },
        env: base_env(opts),
        jobs: jobs_from([(COMMENT_ON_PR, jobs::comment_on_pr())]),
    }
}

/// Acceptance tests for same-repository pull requests and dispatched runs.
#[must_use]
pub fn run_acceptance_tests(name: &str, opts: &Options) -> Workflow {
    let mut branches = strings(&MAIN_BRANCHES);
    if opts.test_infrastructure && opts.major_version > 0 {
        branches.push(format!("v{}", opts.major_version));
    }

    let mut env = base_env(opts);
    env.insert(
        "PR_COMMIT_SHA".to_string(),
        "${{ github.event.client_payload.pull_request.head.sha }}".into(),
    );

    let mut jobs = jobs_from([
        (COMMENT_NOTIFICATION, jobs::comment_notification()),
        (PREREQUISITES, jobs::prerequisites(opts).with_dispatch_guard()),
        (BUILD_SDKS, jobs::build_sdks(opts, false).with_dispatch_guard()),
        (TEST, jobs::test(opts).with_dispatch_guard()),
    ]);
    if opts.lint {
        jobs.insert(LINT.to_string(), jobs::lint(opts).with_dispatch_guard());
    }
    jobs.insert(
        SENTINEL.to_string(),
        jobs::sentinel(&sentinel_needs(opts.lint, opts.test_infrastructure)),
    );

    let workflow = Workflow {
        name: name.to_string(),
        on: WorkflowTriggers {
            repository_dispatch: Some(ActivityTrigger::types(["run-acceptance-tests-command"])),
            pull_request: Some(PullRequestTrigger {
                branches,
                paths_ignore: strings(&[CHANGELOG]),
                ..Default::default()
            }),
            workflow_dispatch: Some(WorkflowDispatchTrigger::default()),
            ..Default::default()
        },
        env,
        jobs,
    };
    with_test_infrastructure(workflow, opts, ClusterContext::Dispatch)
}

/// Weekly upgrade of the Pulumi dependency.
#[must_use]
pub fn weekly_pulumi_update(name: &str, opts: &Options) -> Workflow {
    Workflow {
        name: name.to_string(),
        on: WorkflowTriggers {
            schedule: Some(vec![ScheduleTrigger {
                cron: "35 12 * * 4".to_string(),
            }]),
            workflow_dispatch: Some(WorkflowDispatchTrigger::default()),
            ..Default::default()
        },
        env: base_env(opts),
        jobs: jobs_from([(WEEKLY_PULUMI_UPDATE, jobs::weekly_pulumi_update(opts))]),
    }
}

/// Branch builds: test, then publish snapshot binaries and SDKs.
#[must_use]
pub fn build(name: &str, opts: &Options) -> Workflow {
    let mut jobs = jobs_from([
        (PREREQUISITES, jobs::prerequisites(opts)),
        (BUILD_SDKS, jobs::build_sdks(opts, false)),
        (TEST, jobs::test(opts)),
        (PUBLISH, jobs::publish_prerelease(opts)),
        (PUBLISH_SDK, jobs::publish_sdk(opts)),
        (PUBLISH_JAVA_SDK, jobs::publish_java_sdk(opts)),
    ]);
    if opts.lint {
        jobs.insert(LINT.to_string(), jobs::lint(opts));
    }

    let workflow = Workflow {
        name: name.to_string(),
        on: WorkflowTriggers {
            push: Some(PushTrigger {
                branches: strings(&["master", "main", "feature-**"]),
                paths_ignore: strings(&[CHANGELOG]),
                tags_ignore: strings(&["v*", "sdk/*", "**"]),
                ..Default::default()
            }),
            workflow_dispatch: Some(WorkflowDispatchTrigger::default()),
            ..Default::default()
        },
        env: base_env(opts),
        jobs,
    };
    with_test_infrastructure(workflow, opts, ClusterContext::Push)
}

/// Pre-release tags: snapshot binaries and SDK packages.
#[must_use]
pub fn prerelease(name: &str, opts: &Options) -> Workflow {
    let mut env = base_env(opts);
    env.insert("IS_PRERELEASE".to_string(), true.into());

    let workflow = Workflow {
        name: name.to_string(),
        on: push_tags(&["v*.*.*-**"]),
        env,
        jobs: jobs_from([
            (PREREQUISITES, jobs::prerequisites(opts)),
            (BUILD_SDKS, jobs::build_sdks(opts, true)),
            (TEST, jobs::test(opts)),
            (PUBLISH, jobs::publish_prerelease(opts)),
            (PUBLISH_SDK, jobs::publish_sdk(opts)),
            (PUBLISH_JAVA_SDK, jobs::publish_java_sdk(opts)),
        ]),
    };
    with_test_infrastructure(workflow, opts, ClusterContext::Push)
}

/// Release tags: publish binaries and SDKs, tag the SDK, rebuild docs.
#[must_use]
pub fn release(name: &str, opts: &Options) -> Workflow {
    let workflow = Workflow {
        name: name.to_string(),
        on: push_tags(&["v*.*.*", "!v*.*.*-**"]),
        env: base_env(opts),
        jobs: jobs_from([
            (PREREQUISITES, jobs::prerequisites(opts)),
            (BUILD_SDKS, jobs::build_sdks(opts, true)),
            (TEST, jobs::test(opts)),
            (PUBLISH, jobs::publish(opts)),
            (PUBLISH_SDK, jobs::publish_sdk(opts)),
            (PUBLISH_JAVA_SDK, jobs::publish_java_sdk(opts)),
            (TAG_SDK, jobs::tag_sdk()),
            (DISPATCH_DOCS_BUILD, jobs::dispatch_docs_build()),
        ]),
    };
    with_test_infrastructure(workflow, opts, ClusterContext::Push)
}
