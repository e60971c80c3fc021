use super::join::{join_asset_path, last_path_segment};

/// Path fragment marking a core plugin that lives in the decoupled `public/plugins` tree.
pub const DECOUPLED_PLUGIN_MARKER: &str = "public/plugins";

/// Terminal directory names used by decoupled core plugins: `dist` once built, `src` before.
const BUILD_DIR_NAMES: [&str; 2] = ["dist", "src"];

/// Determine whether a core plugin directory follows the decoupled layout.
///
/// The decision is purely structural: any slash-normalised directory containing the
/// `public/plugins` fragment is decoupled, everything else is treated as the legacy coupled
/// layout rooted under the type-specific application tree.
pub fn is_decoupled_plugin(plugin_dir: &str) -> bool {
    plugin_dir.replace('\\', "/").contains(DECOUPLED_PLUGIN_MARKER)
}

/// Compute the directory name a core plugin's assets are exposed under.
///
/// For decoupled plugins whose terminal segment is `dist` or `src` the parent segment is used
/// instead. With `keep_build_dir` set the `dist`/`src` segment is appended back, producing a
/// two-level name such as `testdata/dist`. Any other shape uses the terminal segment as-is.
pub fn plugin_base_dir_name(plugin_dir: &str, keep_build_dir: bool) -> String {
    let normalised = plugin_dir.replace('\\', "/");
    let trimmed = normalised.trim_end_matches('/');
    let dir_name = last_path_segment(&normalised);

    if !is_decoupled_plugin(trimmed) || !BUILD_DIR_NAMES.contains(&dir_name) {
        return dir_name.to_string();
    }

    let parent = last_path_segment(trimmed.strip_suffix(dir_name).unwrap_or(trimmed));
    if keep_build_dir {
        join_asset_path(&[parent, dir_name])
    } else {
        parent.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{is_decoupled_plugin, plugin_base_dir_name};

    #[test]
    fn detects_decoupled_directories() {
        assert!(is_decoupled_plugin("public/plugins/testdata/dist"));
        assert!(is_decoupled_plugin("/usr/share/grafana/public/plugins/testdata/src"));
        assert!(is_decoupled_plugin("C:\\grafana\\public\\plugins\\testdata\\dist"));
    }

    #[test]
    fn treats_app_tree_as_coupled() {
        assert!(!is_decoupled_plugin("public/app/plugins/panel/alertlist"));
        assert!(!is_decoupled_plugin("/var/lib/grafana/plugins/myorg-custom-panel"));
        assert!(!is_decoupled_plugin(""));
    }

    #[test]
    fn keeps_build_dir_when_requested() {
        assert_eq!(
            plugin_base_dir_name("public/plugins/testdata/dist", true),
            "testdata/dist"
        );
        assert_eq!(
            plugin_base_dir_name("/opt/grafana/public/plugins/testdata/src", true),
            "testdata/src"
        );
    }

    #[test]
    fn collapses_build_dir_to_parent() {
        assert_eq!(plugin_base_dir_name("public/plugins/testdata/dist", false), "testdata");
        assert_eq!(plugin_base_dir_name("public/plugins/testdata/src/", false), "testdata");
    }

    #[test]
    fn uses_terminal_segment_for_other_shapes() {
        assert_eq!(
            plugin_base_dir_name("public/app/plugins/panel/alertlist", true),
            "alertlist"
        );
        assert_eq!(
            plugin_base_dir_name("public/plugins/testdata/build", true),
            "build"
        );
        // `dist` outside the decoupled tree is a plain directory name.
        assert_eq!(plugin_base_dir_name("public/app/plugins/panel/dist", false), "dist");
    }
}
