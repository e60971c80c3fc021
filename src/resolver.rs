//! Computes where a plugin's entry module and auxiliary assets are served from.
//!
//! Core plugins are resolved from their on-disk layout, external plugins either from the
//! local `public/plugins` tree or from the CDN oracle injected at construction.

use std::path::Path;

use tracing::debug;

use crate::asset_paths::{
    AssetReference, is_decoupled_plugin, join_asset_path, parse_asset_reference,
    plugin_base_dir_name, to_slash_path,
};
use crate::cdn::{CdnOracle, TemplateCdn};
use crate::config::ResolverConfig;
use crate::error::ResolveResult;
use crate::models::{
    PluginClass, PluginInstance, PluginManifest, PluginScreenshot, ResolvedManifestAssets,
    ResolvedPlugin,
};

/// Base path for decoupled core plugins and locally installed external plugins.
const PUBLIC_PLUGINS_DIR: &str = "public/plugins";
/// Base path for core plugins using the coupled layout.
const PUBLIC_APP_PLUGINS_DIR: &str = "public/app/plugins";
/// Module path prefix for core plugins.
const APP_PLUGINS_MODULE_DIR: &str = "app/plugins";
/// Module path prefix for locally installed external plugins.
const PLUGINS_MODULE_DIR: &str = "plugins";
/// Name of a plugin's entry module.
const MODULE_NAME: &str = "module";

/// Stateless resolver for plugin asset paths.
///
/// The only collaborator is the CDN oracle, shared read-only for the lifetime of the
/// resolver, so a single instance can serve concurrent callers without locking.
#[derive(Debug, Clone, Default)]
pub struct AssetPathResolver<C = TemplateCdn> {
    cdn: C,
}

impl AssetPathResolver<TemplateCdn> {
    /// Create a resolver backed by the CDN settings in `config`.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.to_cdn())
    }
}

impl<C: CdnOracle> AssetPathResolver<C> {
    /// Create a resolver consulting the given CDN oracle.
    pub fn new(cdn: C) -> Self {
        Self { cdn }
    }

    /// The injected CDN oracle.
    pub fn cdn(&self) -> &C {
        &self.cdn
    }

    /// Base path the plugin's static assets are exposed under.
    pub fn base(
        &self,
        manifest: &PluginManifest,
        class: PluginClass,
        plugin_dir: impl AsRef<Path>,
    ) -> ResolveResult<String> {
        let base = match class {
            PluginClass::Core => {
                let plugin_dir = to_slash_path(plugin_dir.as_ref());
                let base_dir = plugin_base_dir_name(&plugin_dir, true);
                if is_decoupled_plugin(&plugin_dir) {
                    join_asset_path(&[PUBLIC_PLUGINS_DIR, &base_dir])
                } else {
                    join_asset_path(&[PUBLIC_APP_PLUGINS_DIR, &manifest.plugin_type, &base_dir])
                }
            }
            PluginClass::External if self.cdn.is_supported(&manifest.id) => self
                .cdn
                .build_system_asset_path(&manifest.id, manifest.version(), "")?,
            PluginClass::External => join_asset_path(&[PUBLIC_PLUGINS_DIR, &manifest.id]),
        };

        debug!(plugin_id = %manifest.id, %class, %base, "resolved plugin base path");
        Ok(base)
    }

    /// Path to the plugin's loadable entry module.
    pub fn module(
        &self,
        manifest: &PluginManifest,
        class: PluginClass,
        plugin_dir: impl AsRef<Path>,
    ) -> ResolveResult<String> {
        let module = match class {
            PluginClass::Core => {
                let plugin_dir = to_slash_path(plugin_dir.as_ref());
                let base_dir = plugin_base_dir_name(&plugin_dir, false);
                join_asset_path(&[
                    APP_PLUGINS_MODULE_DIR,
                    &manifest.plugin_type,
                    &base_dir,
                    MODULE_NAME,
                ])
            }
            PluginClass::External if self.cdn.is_supported(&manifest.id) => self
                .cdn
                .build_system_asset_path(&manifest.id, manifest.version(), MODULE_NAME)?,
            PluginClass::External => {
                join_asset_path(&[PLUGINS_MODULE_DIR, &manifest.id, MODULE_NAME])
            }
        };

        debug!(plugin_id = %manifest.id, %class, %module, "resolved plugin module path");
        Ok(module)
    }

    /// Resolve an arbitrary manifest asset reference into something a client can load.
    ///
    /// An empty `path` yields `default` untouched. CDN plugins are delegated to the oracle.
    /// Locally served references are returned as-is when they are absolute, equal to the
    /// default or already prefixed with the plugin's base URL; anything else is joined onto
    /// the base URL.
    pub fn relative_url(
        &self,
        plugin: &PluginInstance,
        path: &str,
        default: &str,
    ) -> ResolveResult<String> {
        if path.is_empty() {
            return Ok(default.to_string());
        }

        if self.cdn.is_supported(&plugin.id) {
            let url = self.cdn.build_full_url(&plugin.id, &plugin.version, path)?;
            debug!(plugin_id = %plugin.id, reference = path, %url, "resolved CDN asset url");
            return Ok(url);
        }

        let reference = match parse_asset_reference(path)? {
            AssetReference::Absolute(reference) => return Ok(reference.to_string()),
            AssetReference::Relative(reference) => reference,
        };

        // Repeated resolution must not prefix the base URL twice.
        if reference == default || reference.starts_with(&plugin.base_url) {
            return Ok(reference.to_string());
        }

        let url = join_asset_path(&[plugin.base_url.as_str(), reference]);
        debug!(plugin_id = %plugin.id, reference, %url, "resolved local asset url");
        Ok(url)
    }

    /// Compute the locations assigned to a plugin when it is loaded.
    pub fn instance(
        &self,
        manifest: &PluginManifest,
        class: PluginClass,
        plugin_dir: impl AsRef<Path>,
    ) -> ResolveResult<ResolvedPlugin> {
        let plugin_dir = plugin_dir.as_ref();
        let base_url = self.base(manifest, class, plugin_dir)?;
        let module = self.module(manifest, class, plugin_dir)?;

        Ok(ResolvedPlugin {
            instance: PluginInstance {
                id: manifest.id.clone(),
                version: manifest.version().to_string(),
                base_url,
            },
            module,
        })
    }

    /// Resolve the logo and screenshot references declared in a manifest.
    ///
    /// Missing logos fall back to the generic icon for the plugin type; the first reference
    /// that fails to resolve aborts the whole operation.
    pub fn resolve_manifest_assets(
        &self,
        plugin: &PluginInstance,
        manifest: &PluginManifest,
    ) -> ResolveResult<ResolvedManifestAssets> {
        let default_logo = default_logo_path(&manifest.plugin_type);
        let logos = &manifest.info.logos;

        let screenshots = manifest
            .info
            .screenshots
            .iter()
            .map(|screenshot| -> ResolveResult<PluginScreenshot> {
                Ok(PluginScreenshot {
                    name: screenshot.name.clone(),
                    path: self.relative_url(plugin, &screenshot.path, "")?,
                })
            })
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(ResolvedManifestAssets {
            small_logo: self.relative_url(plugin, &logos.small, &default_logo)?,
            large_logo: self.relative_url(plugin, &logos.large, &default_logo)?,
            screenshots,
        })
    }
}

/// Generic icon shown for plugins that do not ship their own logo.
pub fn default_logo_path(plugin_type: &str) -> String {
    format!("public/img/icn-{plugin_type}.svg")
}
