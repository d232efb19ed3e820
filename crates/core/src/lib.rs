//! Core types for provider-ci.
//!
//! This crate provides:
//! - [`Options`], the validated per-provider options schema
//! - [`merge_env`] and [`EnvMap`] for workflow environment handling
//! - [`ConfigLoader`] / [`FsConfigLoader`] for reading provider configs
//! - [`Error`], the error taxonomy shared by every provider-ci crate

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod loader;
pub mod options;

pub use env::{EnvMap, env_from_pairs, merge_env};
pub use error::{Error, Result};
pub use loader::{CONFIG_FILE_NAME, ConfigLoader, FsConfigLoader, load_options};
pub use options::Options;
