//! Pure helpers for classifying plugin directories and normalising asset paths.
//!
//! The responsibilities are split into focused submodules so that layout detection, slash
//! path joining and reference parsing can each be tested independently of the resolver that
//! combines them.

mod join;
mod layout;
mod reference;

pub use join::{clean_asset_path, join_asset_path, last_path_segment, to_slash_path};
pub use layout::{DECOUPLED_PLUGIN_MARKER, is_decoupled_plugin, plugin_base_dir_name};
pub use reference::{AssetReference, parse_asset_reference};
