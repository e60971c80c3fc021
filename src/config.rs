//! Resolver configuration loader describing which plugins are served from the CDN.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::cdn::TemplateCdn;

/// File name looked up by [`ResolverConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "assetpath.config.json";

/// Settings consumed when building the CDN oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// CDN URL template with `{id}` and `{version}` placeholders. Empty disables the CDN.
    pub cdn_url_template: String,
    /// Identifiers of plugins whose assets are served from the CDN.
    pub cdn_plugins: Vec<String>,
}

/// Errors that can occur while loading the resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// Failed to parse the JSON configuration file.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
}

impl ResolverConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// When the configuration file cannot be read or parsed the defaults are used, which
    /// serve every plugin locally.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::load_from_path(&candidate).unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default resolver configuration");
            Self::default()
        })
    }

    /// Read configuration from a specific JSON file.
    ///
    /// A missing file yields the defaults; unreadable or invalid files are errors.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Build the CDN oracle described by this configuration.
    pub fn to_cdn(&self) -> TemplateCdn {
        TemplateCdn::new(self.cdn_url_template.clone(), self.cdn_plugins.iter().cloned())
    }
}
