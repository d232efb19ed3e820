//! GitHub Actions Workflow Schema Types
//!
//! Defines the data structures for GitHub Actions workflow YAML generation.
//! See: <https://docs.github.com/en/actions/using-workflows/workflow-syntax-for-github-actions>

use indexmap::IndexMap;
use provider_ci_core::EnvMap;
use serde::Serialize;

/// A GitHub Actions workflow definition.
///
/// Represents the complete structure of a workflow file that can be committed
/// to `.github/workflows/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    /// Workflow name displayed in GitHub UI
    pub name: String,

    /// Trigger configuration
    #[serde(rename = "on")]
    pub on: WorkflowTriggers,

    /// Environment variables available to all jobs
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: EnvMap,

    /// Job definitions (order preserved via `IndexMap`)
    pub jobs: IndexMap<String, Job>,
}

impl Workflow {
    /// Look up a job by key.
    #[must_use]
    pub fn job(&self, key: &str) -> Option<&Job> {
        self.jobs.get(key)
    }

    /// `(job, dependency)` pairs whose dependency is not a job of this workflow.
    ///
    /// Construction does not reject these; callers decide how to treat them.
    #[must_use]
    pub fn unresolved_needs(&self) -> Vec<(String, String)> {
        self.jobs
            .iter()
            .flat_map(|(key, job)| {
                job.needs
                    .iter()
                    .filter(|dep| !self.jobs.contains_key(dep.as_str()))
                    .map(move |dep| (key.clone(), dep.clone()))
            })
            .collect()
    }
}

/// Workflow trigger configuration.
///
/// Defines when the workflow should run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowTriggers {
    /// Trigger on issue and pull request comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_comment: Option<ActivityTrigger>,

    /// Trigger on `repository_dispatch` events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_dispatch: Option<ActivityTrigger>,

    /// Trigger on push events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,

    /// Trigger on pull request events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestTrigger>,

    /// Trigger on pull requests in the context of the base repository
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_target: Option<PullRequestTrigger>,

    /// Scheduled trigger (cron expressions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleTrigger>>,

    /// Manual trigger with optional inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<WorkflowDispatchTrigger>,
}

/// Trigger filtered by activity type (e.g. `issue_comment`, `repository_dispatch`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityTrigger {
    /// Activity types to trigger on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl ActivityTrigger {
    /// Trigger on the given activity types.
    pub fn types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

/// Push event trigger configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PushTrigger {
    /// Branch patterns to trigger on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,

    /// Tag patterns to trigger on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Tag patterns to ignore
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags_ignore: Vec<String>,

    /// Path patterns to ignore
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths_ignore: Vec<String>,
}

/// Pull request event trigger configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PullRequestTrigger {
    /// Branch patterns to trigger on (target branches)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,

    /// Path patterns to ignore
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths_ignore: Vec<String>,
}

/// Manual `workflow_dispatch` trigger; always emitted as an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowDispatchTrigger {}

/// Schedule trigger using cron expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleTrigger {
    /// Cron expression (e.g., "0 0 * * *" for daily at midnight)
    pub cron: String,
}

/// `GITHUB_TOKEN` permissions configuration.
///
/// Controls what the workflow can access using the automatic `GITHUB_TOKEN`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Permissions {
    /// Repository contents permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<PermissionLevel>,

    /// OIDC token permission (for cloud authentication)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<PermissionLevel>,
}

/// Permission level for `GITHUB_TOKEN` scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read-only access
    Read,
    /// Read and write access
    Write,
}

/// A job in a GitHub Actions workflow.
///
/// Jobs run in parallel by default unless `needs` dependencies are specified.
/// Build one with [`Job::new`] and refine it with the `with_*` methods; each
/// consumes the job and returns the refined copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Job display name (shown in GitHub UI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Runner label
    pub runs_on: String,

    /// Job dependencies (these jobs must complete first)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    /// Conditional execution expression
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<String>,

    /// Job-level `GITHUB_TOKEN` permissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    /// Outputs exposed to dependent jobs
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, String>,

    /// Matrix execution strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Continue workflow if this job fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,

    /// Job steps (executed sequentially)
    pub steps: Vec<Step>,
}

impl Job {
    /// Create an empty job running on `runner`.
    pub fn new(runner: impl Into<String>) -> Self {
        Self {
            name: None,
            runs_on: runner.into(),
            needs: Vec::new(),
            if_condition: None,
            permissions: None,
            outputs: IndexMap::new(),
            strategy: None,
            continue_on_error: None,
            steps: Vec::new(),
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the runner
    #[must_use]
    pub fn with_runs_on(mut self, runner: impl Into<String>) -> Self {
        self.runs_on = runner.into();
        self
    }

    /// Set a condition
    #[must_use]
    pub fn with_if(mut self, condition: impl Into<String>) -> Self {
        self.if_condition = Some(condition.into());
        self
    }

    /// Append a dependency (ignored if already present)
    #[must_use]
    pub fn with_need(mut self, job: impl Into<String>) -> Self {
        let job = job.into();
        if !self.needs.contains(&job) {
            self.needs.push(job);
        }
        self
    }

    /// Append several dependencies, in order
    #[must_use]
    pub fn with_needs<I, S>(self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        jobs.into_iter().fold(self, Self::with_need)
    }

    /// Append a step; inert steps are dropped
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        if !step.is_inert() {
            self.steps.push(step);
        }
        self
    }

    /// Append steps in order; inert steps are dropped
    #[must_use]
    pub fn with_steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        steps.into_iter().fold(self, Self::with_step)
    }

    /// Set the matrix strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Add an output binding
    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    /// Set job permissions
    #[must_use]
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Let the workflow continue when this job fails
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = Some(continue_on_error);
        self
    }

    /// Names of this job's steps, in order (unnamed steps are skipped).
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().filter_map(|s| s.name.as_deref()).collect()
    }
}

/// Matrix execution strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Strategy {
    /// Cancel all matrix jobs when one fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,

    /// Matrix dimensions
    pub matrix: Matrix,
}

impl Strategy {
    /// Fail-fast strategy fanning out over a single dimension.
    pub fn single_dimension<I, S>(dimension: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dimensions = IndexMap::new();
        dimensions.insert(
            dimension.into(),
            values.into_iter().map(Into::into).collect(),
        );
        Self {
            fail_fast: Some(true),
            matrix: Matrix { dimensions },
        }
    }
}

/// Matrix configuration: named dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
    /// Dimension name to values (e.g. `language: [nodejs, python]`)
    #[serde(flatten)]
    pub dimensions: IndexMap<String, Vec<String>>,
}

/// A step in a job.
///
/// Steps can either `uses` an action or `run` a shell command. A step with
/// neither is inert and is dropped by [`Job::with_step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    /// Step display name (shown in GitHub UI); also identifies the step for replacement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unique identifier for referencing step outputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Conditional execution expression
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<String>,

    /// Action to use (e.g., "actions/checkout@v3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    /// Shell command(s) to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Action inputs (for `uses` steps)
    #[serde(rename = "with", skip_serializing_if = "IndexMap::is_empty")]
    pub with_inputs: IndexMap<String, serde_yaml::Value>,

    /// Step environment variables
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

impl Step {
    /// Create a step that uses an action
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    /// Create a step that runs a shell command
    pub fn run(command: impl Into<String>) -> Self {
        Self {
            run: Some(command.into()),
            ..Default::default()
        }
    }

    /// A step that does nothing; filtered out before emission
    #[must_use]
    pub fn inert() -> Self {
        Self::default()
    }

    /// Whether the step has neither an action nor a command
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.uses.is_none() && self.run.is_none()
    }

    /// Set the step name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the step ID
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a with input
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.with_inputs.insert(key.into(), value.into());
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set a condition
    #[must_use]
    pub fn with_if(mut self, condition: impl Into<String>) -> Self {
        self.if_condition = Some(condition.into());
        self
    }
}
