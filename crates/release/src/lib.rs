//! GoReleaser configuration for provider releases.
//!
//! Two documents are produced per provider: [`GoreleaserConfig::prerelease`]
//! for snapshot builds and [`GoreleaserConfig::release`] for tagged releases.
//! Both build `pulumi-resource-<provider>` for every supported platform and
//! upload the archives to the plugin bucket.

#![warn(missing_docs)]

pub mod config;
pub mod goreleaser;

pub use config::{
    Archive, Before, Blob, Build, Changelog, GoreleaserConfig, Platform, PrereleaseMode, Release,
    Snapshot,
};
pub use goreleaser::ldflags;
