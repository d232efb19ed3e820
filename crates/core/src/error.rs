//! Error types for provider-ci operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for provider-ci operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading options or producing provider files.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A provider option is missing, mistyped or out of range.
    #[error("Invalid provider option `{field}`: {reason}")]
    #[diagnostic(
        code(provider_ci::options::invalid),
        help("Check the provider's config.yaml against the documented option schema")
    )]
    Validation {
        /// Path of the offending field (e.g. `parallel`, `env.FOO`)
        field: String,
        /// What was expected
        reason: String,
    },

    /// No configuration document exists for the requested provider.
    #[error("Unknown provider: {provider}")]
    #[diagnostic(
        code(provider_ci::unknown_provider),
        help(
            "Create {} or pick one of the providers listed by `provider-ci list`",
            config_path.display()
        )
    )]
    UnknownProvider {
        /// The provider identifier that was requested
        provider: String,
        /// Where the configuration document was expected
        config_path: PathBuf,
    },

    /// The provider configuration exists but could not be read.
    #[error("Failed to read provider config {}", path.display())]
    #[diagnostic(code(provider_ci::config_io))]
    ConfigIo {
        /// The configuration file path
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },

    /// The provider configuration is not a YAML document.
    #[error(
        "Failed to parse provider config{}: {message}",
        path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default()
    )]
    #[diagnostic(
        code(provider_ci::config_parse),
        help("Ensure the file is valid YAML with a mapping at the top level")
    )]
    Parse {
        /// The configuration file path, when known
        path: Option<PathBuf>,
        /// The parser's message
        message: String,
    },

    /// A generated document could not be serialized.
    #[error("Serialization failed: {0}")]
    #[diagnostic(code(provider_ci::serialization))]
    Serialization(String),

    /// Reading or writing a generated file failed.
    #[error("I/O error on {}", path.display())]
    #[diagnostic(
        code(provider_ci::io),
        help("Check file permissions and ensure the output directory is writable")
    )]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a validation error for a field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is attributable to a missing provider configuration.
    #[must_use]
    pub const fn is_unknown_provider(&self) -> bool {
        matches!(self, Self::UnknownProvider { .. })
    }
}
