//! Plugin metadata consumed and produced by the resolver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Manifest metadata identifying a plugin, as read from its `plugin.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
  /// Globally unique plugin identifier.
  pub id: String,
  /// Type label such as `panel`, `datasource` or `app`.
  #[serde(rename = "type")]
  pub plugin_type: String,
  /// Descriptive metadata including the version and asset references.
  #[serde(default)]
  pub info: PluginInfo,
}

impl PluginManifest {
  /// Build a manifest carrying only the identifying fields.
  pub fn new(id: impl Into<String>, plugin_type: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      plugin_type: plugin_type.into(),
      info: PluginInfo {
        version: version.into(),
        ..PluginInfo::default()
      },
    }
  }

  /// Version string declared in the manifest info block.
  pub fn version(&self) -> &str {
    &self.info.version
  }
}

/// The `info` block of a plugin manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginInfo {
  /// Plugin version, possibly empty for unreleased builds.
  pub version: String,
  /// Logo references shown in plugin listings.
  pub logos: PluginLogos,
  /// Screenshot references shown on the plugin details page.
  pub screenshots: Vec<PluginScreenshot>,
}

/// Small and large logo references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginLogos {
  /// Reference used in compact listings.
  pub small: String,
  /// Reference used on detail pages.
  pub large: String,
}

/// A named screenshot reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginScreenshot {
  /// Caption for the screenshot.
  pub name: String,
  /// Asset reference for the image.
  pub path: String,
}

/// How a plugin reaches the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginClass {
  /// Shipped with the application binary.
  Core,
  /// Installed separately, either on local disk or served from a CDN.
  External,
}

impl fmt::Display for PluginClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Core => f.write_str("core"),
      Self::External => f.write_str("external"),
    }
  }
}

/// Returned when a plugin class name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown plugin class {0:?}, expected \"core\" or \"external\"")]
pub struct UnknownPluginClass(pub String);

impl FromStr for PluginClass {
  type Err = UnknownPluginClass;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "core" => Ok(Self::Core),
      "external" => Ok(Self::External),
      _ => Err(UnknownPluginClass(value.to_string())),
    }
  }
}

/// A plugin that has already been assigned its asset base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInstance {
  /// Plugin identifier.
  pub id: String,
  /// Plugin version.
  pub version: String,
  /// Prefix previously computed for the plugin's assets.
  pub base_url: String,
}

/// Locations computed for a plugin at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlugin {
  /// The plugin with its base URL assigned.
  #[serde(flatten)]
  pub instance: PluginInstance,
  /// Reference to the plugin's entry module.
  pub module: String,
}

/// Manifest asset references after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedManifestAssets {
  /// Resolved small logo.
  pub small_logo: String,
  /// Resolved large logo.
  pub large_logo: String,
  /// Screenshots with their paths resolved.
  pub screenshots: Vec<PluginScreenshot>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn parses_plugin_json() {
    let manifest: PluginManifest = serde_json::from_str(
      r#"{
        "id": "acme-app",
        "type": "app",
        "name": "Acme",
        "info": {
          "version": "2.0.0",
          "logos": { "small": "img/logo.svg", "large": "img/logo_large.svg" },
          "screenshots": [{ "name": "Overview", "path": "img/overview.png" }]
        }
      }"#,
    )
    .expect("manifest should parse");

    assert_eq!(manifest, PluginManifest {
      id: "acme-app".into(),
      plugin_type: "app".into(),
      info: PluginInfo {
        version: "2.0.0".into(),
        logos: PluginLogos {
          small: "img/logo.svg".into(),
          large: "img/logo_large.svg".into(),
        },
        screenshots: vec![PluginScreenshot {
          name: "Overview".into(),
          path: "img/overview.png".into(),
        }],
      },
    });
  }

  #[test]
  fn tolerates_missing_info_block() {
    let manifest: PluginManifest =
      serde_json::from_str(r#"{"id": "alertlist", "type": "panel"}"#).expect("manifest should parse");
    assert_eq!(manifest.version(), "");
    assert!(manifest.info.screenshots.is_empty());
  }

  #[test]
  fn parses_plugin_class_names() {
    assert_eq!("core".parse::<PluginClass>(), Ok(PluginClass::Core));
    assert_eq!(" External ".parse::<PluginClass>(), Ok(PluginClass::External));
    assert!("bundled".parse::<PluginClass>().is_err());
    assert_eq!(PluginClass::External.to_string(), "external");
  }
}
