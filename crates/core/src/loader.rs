//! Provider configuration loading.
//!
//! The generator core never touches the filesystem itself. A
//! [`ConfigLoader`] hands it the raw configuration document for a provider;
//! [`load_options`] turns that into validated [`Options`].

use crate::error::{Error, Result};
use crate::options::Options;
use std::path::{Path, PathBuf};

/// Name of the per-provider configuration file.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Source of raw per-provider configuration documents.
pub trait ConfigLoader {
    /// Load the untyped configuration document for `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProvider`] when no document exists for the
    /// provider, or a read/parse error when it exists but is unusable.
    fn load_document(&self, provider: &str) -> Result<serde_yaml::Value>;

    /// List every provider this loader knows about, sorted.
    fn providers(&self) -> Result<Vec<String>>;
}

/// Load and validate the options for `provider`.
pub fn load_options(loader: &dyn ConfigLoader, provider: &str) -> Result<Options> {
    let document = loader.load_document(provider)?;
    let options = Options::from_value(document)?;
    tracing::debug!(provider, "Loaded provider options");
    Ok(options)
}

/// Reads `<providers_dir>/<provider>/config.yaml`.
#[derive(Debug, Clone)]
pub struct FsConfigLoader {
    providers_dir: PathBuf,
}

impl FsConfigLoader {
    /// Create a loader rooted at `providers_dir`.
    pub fn new(providers_dir: impl Into<PathBuf>) -> Self {
        Self {
            providers_dir: providers_dir.into(),
        }
    }

    /// The directory holding one sub-directory per provider.
    #[must_use]
    pub fn providers_dir(&self) -> &Path {
        &self.providers_dir
    }

    /// Path of the configuration file for `provider`.
    #[must_use]
    pub fn config_path(&self, provider: &str) -> PathBuf {
        self.providers_dir.join(provider).join(CONFIG_FILE_NAME)
    }
}

/// Whether `name` can identify a provider directory.
///
/// Path-like and hidden names are rejected so a provider never escapes the
/// providers dir.
fn is_provider_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.')
}

impl ConfigLoader for FsConfigLoader {
    fn load_document(&self, provider: &str) -> Result<serde_yaml::Value> {
        let path = self.config_path(provider);
        if !is_provider_name(provider) {
            return Err(Error::UnknownProvider {
                provider: provider.to_string(),
                config_path: path,
            });
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::UnknownProvider {
                    provider: provider.to_string(),
                    config_path: path,
                });
            }
            Err(source) => return Err(Error::ConfigIo { path, source }),
        };

        tracing::trace!(path = %path.display(), "Read provider config");

        serde_yaml::from_str(&content).map_err(|e| Error::Parse {
            path: Some(path),
            message: e.to_string(),
        })
    }

    fn providers(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.providers_dir)
            .map_err(|e| Error::io(&self.providers_dir, e))?;

        let mut providers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.providers_dir, e))?;
            let path = entry.path();
            if path.join(CONFIG_FILE_NAME).is_file()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
                && is_provider_name(name)
            {
                providers.push(name.to_string());
            }
        }
        providers.sort();
        Ok(providers)
    }
}
