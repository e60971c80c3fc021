#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod cdn;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;

pub use cdn::{CdnOracle, TemplateCdn};
pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use models::{PluginClass, PluginInstance, PluginManifest};
pub use resolver::AssetPathResolver;
