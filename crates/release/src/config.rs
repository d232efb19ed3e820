//! GoReleaser configuration types.
//!
//! Only the subset of the GoReleaser schema that provider releases use.
//! Field order here is the key order of the emitted YAML.

use serde::Serialize;

/// A complete `.goreleaser.yml` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoreleaserConfig {
    /// Archive definitions.
    pub archives: Vec<Archive>,
    /// Hooks run before any build.
    pub before: Before,
    /// Binary builds.
    pub builds: Vec<Build>,
    /// Changelog generation.
    pub changelog: Changelog,
    /// GitHub release settings.
    pub release: Release,
    /// Snapshot naming; only present for snapshot releases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    /// Blob storage uploads.
    pub blobs: Vec<Blob>,
}

/// An archive of build outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    /// Archive file name template.
    pub name_template: String,
    /// Identifier referenced by blob uploads.
    pub id: String,
}

/// Global hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Before {
    /// Commands run before building.
    pub hooks: Vec<String>,
}

/// One binary build across a platform matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    /// Output binary name.
    pub binary: String,
    /// Directory the build runs in.
    pub dir: String,
    /// Build environment, as `KEY=value` entries.
    pub env: Vec<String>,
    /// Target architectures.
    pub goarch: Vec<String>,
    /// Target operating systems.
    pub goos: Vec<String>,
    /// Platform combinations to skip.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<Platform>,
    /// Linker flags.
    pub ldflags: Vec<String>,
    /// Main package path, relative to `dir`.
    pub main: String,
}

/// A `goos`/`goarch` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    /// Operating system.
    pub goos: String,
    /// Architecture.
    pub goarch: String,
}

/// Changelog settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Changelog {
    /// Skip changelog generation.
    pub skip: bool,
}

/// Whether a GitHub release is marked as a pre-release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrereleaseMode {
    /// Decide from the tag's semver pre-release suffix.
    Auto,
}

/// GitHub release settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Do not create a GitHub release.
    pub disable: bool,
    /// Pre-release marking, when releases are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<PrereleaseMode>,
}

/// Snapshot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Version template for snapshot builds.
    pub name_template: String,
}

/// Upload of archives to blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    /// Storage provider (`s3`, `gs`, `azblob`).
    pub provider: String,
    /// Bucket region.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Key prefix inside the bucket.
    pub folder: String,
    /// Archive ids to upload.
    pub ids: Vec<String>,
}
