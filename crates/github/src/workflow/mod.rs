//! GitHub Actions workflow documents.
//!
//! Typed mirror of the workflow YAML this crate emits. Documents are plain
//! data: build them with the job builders and assemblers, then serialize
//! with `serde_yaml`.

pub mod schema;

pub use schema::*;
