//! Command-line front end for inspecting plugin asset locations.
//!
//! Usage:
//!   plugin-assetpath paths --manifest plugin.json --class core --dir public/plugins/testdata/dist
//!   plugin-assetpath url --manifest plugin.json --base-url public/plugins/acme-app img/icon.svg

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plugin_assetpath::models::{PluginClass, PluginManifest, ResolvedManifestAssets, ResolvedPlugin};
use plugin_assetpath::{AssetPathResolver, CdnOracle, PluginInstance, ResolverConfig};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plugin-assetpath", version)]
#[command(about = "Resolve plugin base paths, module paths and asset URLs")]
struct Args {
    /// Resolver configuration file (defaults to assetpath.config.json in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the base path, module path and resolved manifest assets of a plugin
    Paths {
        /// Path to the plugin's plugin.json
        #[arg(short, long)]
        manifest: PathBuf,

        /// Plugin class: core or external
        #[arg(long, default_value = "external")]
        class: PluginClass,

        /// Directory the plugin was loaded from (defaults to the manifest's directory)
        ///
        /// The directory must exist; it is canonicalised before its name is inspected.
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Resolve a single asset reference against an already assigned base URL
    Url {
        /// Path to the plugin's plugin.json
        #[arg(short, long)]
        manifest: PathBuf,

        /// Base URL previously assigned to the plugin
        #[arg(long, default_value = "")]
        base_url: String,

        /// Value returned when the reference is empty
        #[arg(long, default_value = "")]
        default: String,

        /// Asset reference to resolve
        reference: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathsReport {
    #[serde(flatten)]
    plugin: ResolvedPlugin,
    assets: ResolvedManifestAssets,
    #[serde(skip_serializing_if = "Option::is_none")]
    cdn_origin: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &args.config {
        Some(path) => ResolverConfig::load_from_path(path)?,
        None => ResolverConfig::discover(
            &std::env::current_dir().context("failed to determine working directory")?,
        ),
    };
    debug!(?config, "loaded resolver configuration");
    let resolver = AssetPathResolver::from_config(&config);

    match args.command {
        Command::Paths {
            manifest,
            class,
            dir,
        } => {
            let plugin_json = read_manifest(&manifest)?;
            let dir = plugin_dir(&manifest, dir.as_deref())?;
            let plugin = resolver
                .instance(&plugin_json, class, &dir)
                .with_context(|| format!("failed to resolve paths for {}", plugin_json.id))?;
            let assets = resolver
                .resolve_manifest_assets(&plugin.instance, &plugin_json)
                .with_context(|| format!("failed to resolve assets for {}", plugin_json.id))?;

            let cdn_origin = if resolver.cdn().is_supported(&plugin_json.id) {
                Some(
                    resolver
                        .cdn()
                        .base_url()
                        .context("failed to determine the CDN origin")?,
                )
            } else {
                None
            };

            println!(
                "{}",
                serde_json::to_string_pretty(&PathsReport {
                    plugin,
                    assets,
                    cdn_origin,
                })?
            );
        }
        Command::Url {
            manifest,
            base_url,
            default,
            reference,
        } => {
            let plugin_json = read_manifest(&manifest)?;
            let plugin = PluginInstance {
                id: plugin_json.id.clone(),
                version: plugin_json.version().to_string(),
                base_url,
            };
            let url = resolver
                .relative_url(&plugin, &reference, &default)
                .with_context(|| format!("failed to resolve {reference:?}"))?;

            println!("{url}");
        }
    }

    Ok(())
}

fn read_manifest(path: &Path) -> Result<PluginManifest> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Directory a plugin is resolved from: `dir` when given, else the manifest's directory.
///
/// Core plugin paths depend on the directory's trailing segments, so relative inputs such as
/// a bare `plugin.json` or `.` are canonicalised first.
fn plugin_dir(manifest: &Path, dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => fs::canonicalize(dir)
            .with_context(|| format!("failed to resolve plugin directory {}", dir.display())),
        None => {
            let manifest = fs::canonicalize(manifest)
                .with_context(|| format!("failed to resolve {}", manifest.display()))?;
            Ok(manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_assetpath::TemplateCdn;
    use tempfile::tempdir;

    fn write_plugin(root: &Path, relative_dir: &str) -> PathBuf {
        let dir = root.join(relative_dir);
        fs::create_dir_all(&dir).expect("failed to create plugin dir");
        let manifest = dir.join("plugin.json");
        fs::write(&manifest, r#"{"id": "alertlist", "type": "panel"}"#)
            .expect("failed to write manifest");
        manifest
    }

    #[test]
    fn defaults_to_the_manifest_directory_by_name() {
        let temp = tempdir().expect("failed to create temp dir");
        write_plugin(temp.path(), "public/app/plugins/panel/alertlist");
        let manifest = temp
            .path()
            .join("public/app/plugins/panel/alertlist/./../alertlist/plugin.json");

        let dir = plugin_dir(&manifest, None).expect("plugin dir should resolve");
        assert!(dir.ends_with("public/app/plugins/panel/alertlist"));

        let resolver = AssetPathResolver::new(TemplateCdn::disabled());
        let plugin_json = read_manifest(&manifest).expect("manifest should load");
        let plugin = resolver
            .instance(&plugin_json, PluginClass::Core, &dir)
            .expect("paths should resolve");
        assert_eq!(plugin.instance.base_url, "public/app/plugins/panel/alertlist");
        assert_eq!(plugin.module, "app/plugins/panel/alertlist/module");
    }

    #[test]
    fn explicit_directory_is_canonicalised() {
        let temp = tempdir().expect("failed to create temp dir");
        let manifest = write_plugin(temp.path(), "public/plugins/testdata/dist");
        let dir = temp.path().join("public/plugins/testdata/dist/.");

        let resolved = plugin_dir(&manifest, Some(&dir)).expect("plugin dir should resolve");
        assert!(resolved.ends_with("public/plugins/testdata/dist"));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let temp = tempdir().expect("failed to create temp dir");
        let err = plugin_dir(&temp.path().join("plugin.json"), None)
            .expect_err("missing manifest must fail");
        assert!(err.to_string().contains("plugin.json"));
    }
}
