use std::path::Path;

/// Join slash-separated path elements into a single cleaned path.
///
/// Empty elements are skipped and the result is lexically cleaned, so `.` and `..`
/// segments as well as repeated slashes never reach the caller. Joining nothing but empty
/// elements yields an empty string rather than `.`.
pub fn join_asset_path(elements: &[&str]) -> String {
    let parts: Vec<&str> = elements
        .iter()
        .copied()
        .filter(|element| !element.is_empty())
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    clean_asset_path(&parts.join("/"))
}

/// Lexically clean a slash-separated path.
///
/// A rooted path stays rooted and `..` never climbs above it; an unrooted path keeps any
/// leading `..` segments it cannot resolve. The empty path cleans to `.`.
pub fn clean_asset_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Return the last element of a slash-separated path.
///
/// Trailing slashes are ignored. The empty path yields `.` and a path made only of
/// slashes yields `/`.
pub fn last_path_segment(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }

    match trimmed.rfind('/') {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Render a filesystem path with forward slashes regardless of the host separator.
pub fn to_slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
