//! GitHub Actions workflows for provider repositories.
//!
//! This crate provides:
//! - [`workflow`]: typed workflow documents that serialize to Actions YAML
//! - [`steps`]: the catalog of parameterized steps
//! - [`jobs`]: one builder per pipeline role, plus the dispatch-context
//!   derivations on [`Job`]
//! - [`workflows`]: the assemblers producing each workflow file
//!
//! ```
//! use provider_ci_core::Options;
//! use provider_ci_github::workflows;
//!
//! let opts = Options::new("widget");
//! let release = workflows::release("release", &opts);
//! assert!(release.unresolved_needs().is_empty());
//! ```

#![warn(missing_docs)]

pub mod jobs;
pub mod steps;
pub mod workflow;
pub mod workflows;

pub use workflow::{Job, Step, Workflow};
pub use workflows::{base_env, sentinel_needs};
