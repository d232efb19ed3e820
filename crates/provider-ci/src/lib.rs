//! provider-ci: CI/CD configuration generator for provider repositories.
//!
//! Ties the option loader, the workflow assemblers and the GoReleaser
//! builders together into the fixed set of files each provider repository
//! carries, and writes or checks them on disk.
//!
//! ```no_run
//! use provider_ci::{build_provider_files, write_files};
//! use provider_ci_core::FsConfigLoader;
//! use std::path::Path;
//!
//! let loader = FsConfigLoader::new("providers");
//! let files = build_provider_files(&loader, "widget")?;
//! write_files(Path::new("providers/widget/repo"), &files)?;
//! # Ok::<(), provider_ci_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod generate;
pub mod output;
pub mod tracing;

pub use generate::{Document, ProviderFile, build_provider_files, provider_files};
pub use output::{Drift, DriftKind, GENERATED_HEADER, check_files, render, write_files};
