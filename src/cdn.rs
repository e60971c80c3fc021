//! CDN support oracle consulted by the resolver for externally hosted plugins.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};
use url::Url;

use crate::asset_paths::join_asset_path;
use crate::error::{ResolveError, ResolveResult};

/// Path prefix under which CDN-hosted module loader paths are exposed.
pub const SYSTEM_ASSET_PATH_PREFIX: &str = "plugin-cdn";

/// Answers whether a plugin is served from a CDN and builds locations on that origin.
///
/// Implementations only construct paths and URLs; they never fetch anything.
pub trait CdnOracle {
    /// Returns `true` when the plugin's assets are served from the CDN.
    fn is_supported(&self, plugin_id: &str) -> bool;

    /// Build the module-loader path for an asset of the plugin on the CDN.
    fn build_system_asset_path(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String>;

    /// Build the fully-qualified CDN URL for an asset of the plugin.
    fn build_full_url(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String>;
}

impl<T: CdnOracle + ?Sized> CdnOracle for &T {
    fn is_supported(&self, plugin_id: &str) -> bool {
        (**self).is_supported(plugin_id)
    }

    fn build_system_asset_path(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String> {
        (**self).build_system_asset_path(plugin_id, version, relative_path)
    }

    fn build_full_url(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String> {
        (**self).build_full_url(plugin_id, version, relative_path)
    }
}

impl<T: CdnOracle + ?Sized> CdnOracle for Arc<T> {
    fn is_supported(&self, plugin_id: &str) -> bool {
        (**self).is_supported(plugin_id)
    }

    fn build_system_asset_path(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String> {
        (**self).build_system_asset_path(plugin_id, version, relative_path)
    }

    fn build_full_url(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String> {
        (**self).build_full_url(plugin_id, version, relative_path)
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(id|version)\}").expect("invalid placeholder regex"))
}

/// CDN oracle driven by a URL template and an explicit list of CDN-enabled plugins.
///
/// The template may contain `{id}` and `{version}` placeholders, for example
/// `https://cdn.example/{id}/{version}/public/plugins/{id}`. An empty template disables the
/// CDN for every plugin.
#[derive(Debug, Clone, Default)]
pub struct TemplateCdn {
    url_template: String,
    enabled: BTreeSet<String>,
}

impl TemplateCdn {
    /// Create an oracle for the given template and CDN-enabled plugin identifiers.
    pub fn new(url_template: impl Into<String>, plugins: impl IntoIterator<Item = String>) -> Self {
        Self {
            url_template: url_template.into().trim().to_string(),
            enabled: normalise_plugin_ids(plugins),
        }
    }

    /// An oracle that reports every plugin as locally served.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The configured URL template.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Scheme and host of the CDN origin, e.g. `https://cdn.example`.
    pub fn base_url(&self) -> Result<String, url::ParseError> {
        let url = Url::parse(&self.url_template)?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        Ok(match url.port() {
            Some(port) => format!("{}://{host}:{port}", url.scheme()),
            None => format!("{}://{host}", url.scheme()),
        })
    }

    fn asset_url(&self, plugin_id: &str, version: &str, relative_path: &str) -> ResolveResult<Url> {
        let expanded = placeholder_pattern().replace_all(
            self.url_template.trim_end_matches('/'),
            |caps: &Captures| match &caps[1] {
                "id" => plugin_id.to_string(),
                _ => version.to_string(),
            },
        );

        let mut url =
            Url::parse(&expanded).map_err(|err| ResolveError::upstream(plugin_id, err))?;
        if url.cannot_be_a_base() {
            return Err(ResolveError::upstream(
                plugin_id,
                format!("CDN URL template {:?} cannot hold asset paths", self.url_template),
            ));
        }

        let path = join_asset_path(&[url.path(), relative_path]);
        url.set_path(&path);
        Ok(url)
    }
}

impl CdnOracle for TemplateCdn {
    fn is_supported(&self, plugin_id: &str) -> bool {
        !self.url_template.is_empty() && self.enabled.contains(plugin_id)
    }

    fn build_system_asset_path(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String> {
        let url = self.asset_url(plugin_id, version, relative_path)?;
        Ok(join_asset_path(&[SYSTEM_ASSET_PATH_PREFIX, url.path()]))
    }

    fn build_full_url(
        &self,
        plugin_id: &str,
        version: &str,
        relative_path: &str,
    ) -> ResolveResult<String> {
        self.asset_url(plugin_id, version, relative_path)
            .map(String::from)
    }
}

/// Convert a list of raw identifiers into a sorted, de-duplicated set.
///
/// Values are trimmed and empty entries are discarded.
pub(crate) fn normalise_plugin_ids(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
